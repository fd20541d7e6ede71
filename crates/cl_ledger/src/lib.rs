//! # cl_ledger - CognitiveLedger Engine
//!
//! 账本引擎，实现哈希链事件日志、快照管理以及 `run` 自检周期。

pub mod config;
pub mod journal;
pub mod ledger;
pub mod snapshot;

pub use config::LedgerConfig;
pub use journal::{Journal, JournalEntry};
pub use ledger::CognitiveLedger;
pub use snapshot::{SnapshotManager, SnapshotStrategy};
