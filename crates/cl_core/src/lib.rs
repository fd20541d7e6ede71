//! # cl_core - CognitiveLedger Core Primitives
//!
//! 核心原语层，定义认知事件枚举、UUID、全局错误处理机制。
//! 此 crate 是整个项目的基础依赖，不依赖其他业务 crate。

pub mod error;
pub mod event;

pub use error::{LedgerError, Result};
pub use event::{EventKind, LedgerEvent};
