//! 认知账本
//!
//! `CognitiveLedger` 把认知事件写入哈希链日志。`run` 执行一次自检周期:
//! 记录开始、校验整条链、按策略快照、记录结束，并返回校验结果。

use std::collections::BTreeMap;

use serde_json::json;

use cl_core::event::{EventKind, LedgerEvent};
use cl_core::{LedgerError, Result};

use crate::config::LedgerConfig;
use crate::journal::{Digest32, Journal};
use crate::snapshot::{SnapshotManager, SnapshotStrategy};

/// 认知账本
#[derive(Debug)]
pub struct CognitiveLedger {
    /// 配置
    config: LedgerConfig,
    /// 哈希链日志
    journal: Journal,
    /// 快照
    snapshots: SnapshotManager,
    /// 已完成的 run 次数
    runs: u64,
}

impl CognitiveLedger {
    /// 创建默认配置的账本
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// 使用指定配置创建账本
    pub fn with_config(config: LedgerConfig) -> Self {
        let snapshots = SnapshotManager::new(
            SnapshotStrategy::from_interval(config.snapshot_every),
            config.max_snapshots,
        );
        Self {
            config,
            journal: Journal::new(),
            snapshots,
            runs: 0,
        }
    }

    /// 执行一次自检周期
    ///
    /// 日志只能经由账本自身追加，因此正常情况下总是返回 `true`。
    /// 校验失败时记录错误并返回 `false`，不会 panic。
    pub fn run(&mut self) -> bool {
        self.runs += 1;
        let run = self.runs;

        let started_id = self
            .journal
            .append(LedgerEvent::new(EventKind::RunStarted, json!({ "run": run })))
            .event
            .id;

        let verified = match self.journal.verify() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(ledger = %self.config.name, run, "journal verification failed: {}", e);
                false
            }
        };

        if verified && self.snapshots.should_snapshot(run) {
            self.take_snapshot();
        }

        self.journal.append(
            LedgerEvent::new(
                EventKind::RunCompleted,
                json!({ "run": run, "verified": verified }),
            )
            .with_causation(started_id),
        );

        tracing::info!(
            ledger = %self.config.name,
            run,
            entries = self.journal.len(),
            verified,
            "run completed"
        );
        verified
    }

    /// 记录一个认知事件
    ///
    /// 运行周期类事件 (`RunStarted` / `RunCompleted` / `SnapshotTaken`) 由 `run` 写入，
    /// 外部记录会被拒绝。
    pub fn record(&mut self, kind: EventKind, payload: serde_json::Value) -> Result<&LedgerEvent> {
        // 与运行周期同名的自定义事件同样拒绝，否则会混入 summary 计数
        if EventKind::parse(kind.as_str()).is_lifecycle() {
            return Err(LedgerError::ReservedKind(kind.as_str().to_string()));
        }
        Ok(&self.journal.append(LedgerEvent::new(kind, payload)).event)
    }

    /// 校验哈希链
    pub fn verify(&self) -> Result<()> {
        self.journal.verify()
    }

    fn take_snapshot(&mut self) {
        let sequence = self.journal.len() as u64;
        let head = self.journal.head();
        let state = self.summary();
        let id = self.snapshots.create_snapshot(sequence, head, state).id;
        self.journal.append(LedgerEvent::new(
            EventKind::SnapshotTaken,
            json!({ "snapshot": id, "sequence": sequence }),
        ));
    }

    /// 当前状态摘要
    pub fn summary(&self) -> serde_json::Value {
        let mut kinds: BTreeMap<String, u64> = BTreeMap::new();
        for entry in self.journal.entries() {
            *kinds.entry(entry.event.kind.as_str().to_string()).or_insert(0) += 1;
        }
        json!({
            "name": self.config.name,
            "entries": self.journal.len(),
            "runs": self.runs,
            "head": hex::encode(self.journal.head()),
            "kinds": kinds,
        })
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn snapshots(&self) -> &SnapshotManager {
        &self.snapshots
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// 已执行的 run 次数
    pub fn run_count(&self) -> u64 {
        self.runs
    }

    /// 链头摘要
    pub fn head(&self) -> Digest32 {
        self.journal.head()
    }

    pub fn len(&self) -> usize {
        self.journal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.journal.is_empty()
    }
}

impl Default for CognitiveLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ledger_is_empty() {
        let ledger = CognitiveLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.run_count(), 0);
        assert_eq!(ledger.snapshots().count(), 0);
    }

    #[test]
    fn run_reports_false_on_corrupted_journal() {
        let mut ledger = CognitiveLedger::new();
        assert!(ledger.run());
        ledger.journal.entries_mut()[0].event.payload = json!({ "run": 99 });
        assert!(!ledger.run());

        let completed = ledger
            .journal()
            .events_of(&EventKind::RunCompleted)
            .last()
            .map(|e| e.payload.clone());
        assert_eq!(completed, Some(json!({ "run": 2, "verified": false })));
    }

    #[test]
    fn run_completed_points_back_to_its_start() {
        let mut ledger = CognitiveLedger::new();
        ledger.run();
        let entries = ledger.journal().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event.kind, EventKind::RunStarted);
        assert_eq!(entries[1].event.kind, EventKind::RunCompleted);
        assert_eq!(entries[1].event.causation_id, Some(entries[0].event.id));
    }

    #[test]
    fn summary_counts_kinds() {
        let mut ledger = CognitiveLedger::new();
        ledger.record(EventKind::Observation, json!("sky is grey")).unwrap();
        ledger.record(EventKind::Observation, json!("wind picks up")).unwrap();
        ledger.run();

        let summary = ledger.summary();
        assert_eq!(summary["entries"], json!(4));
        assert_eq!(summary["runs"], json!(1));
        assert_eq!(summary["kinds"]["observation"], json!(2));
        assert_eq!(summary["kinds"]["run_started"], json!(1));
        assert_eq!(summary["head"], json!(hex::encode(ledger.head())));
    }

    #[test]
    fn lifecycle_kinds_cannot_be_recorded() {
        let mut ledger = CognitiveLedger::new();
        for kind in [
            EventKind::RunStarted,
            EventKind::RunCompleted,
            EventKind::SnapshotTaken,
            EventKind::Custom("run_completed".into()),
        ] {
            let err = ledger.record(kind, json!("forged")).unwrap_err();
            assert!(matches!(err, LedgerError::ReservedKind(_)));
        }
        assert!(ledger.is_empty());

        ledger.run();
        assert_eq!(ledger.summary()["kinds"]["run_started"], json!(1));
    }
}
