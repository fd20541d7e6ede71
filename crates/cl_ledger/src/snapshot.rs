//! 快照管理器

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::journal::Digest32;

/// 快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// 快照 ID
    pub id: Uuid,
    /// 快照时间
    pub timestamp: DateTime<Utc>,
    /// 覆盖的日志条目数
    pub sequence: u64,
    /// 覆盖范围内的链头摘要
    #[serde(with = "hex::serde")]
    pub head: Digest32,
    /// 状态数据
    pub state: serde_json::Value,
}

impl Snapshot {
    /// 创建新快照
    pub fn new(sequence: u64, head: Digest32, state: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            sequence,
            head,
            state,
        }
    }
}

/// 快照策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotStrategy {
    /// 每 N 次 run 创建快照
    EveryNRuns(u64),
    /// 从不
    Never,
}

impl SnapshotStrategy {
    /// 由配置值构造，0 表示关闭
    pub fn from_interval(every: u64) -> Self {
        if every == 0 {
            SnapshotStrategy::Never
        } else {
            SnapshotStrategy::EveryNRuns(every)
        }
    }
}

/// 快照管理器
#[derive(Debug)]
pub struct SnapshotManager {
    /// 快照策略
    strategy: SnapshotStrategy,
    /// 最多保留的快照数
    max_snapshots: usize,
    /// 内存缓存
    cache: Vec<Snapshot>,
}

impl SnapshotManager {
    /// 创建新的快照管理器
    pub fn new(strategy: SnapshotStrategy, max_snapshots: usize) -> Self {
        Self {
            strategy,
            max_snapshots,
            cache: Vec::new(),
        }
    }

    pub fn strategy(&self) -> SnapshotStrategy {
        self.strategy
    }

    /// 检查是否需要创建快照
    pub fn should_snapshot(&self, run_count: u64) -> bool {
        match self.strategy {
            SnapshotStrategy::EveryNRuns(n) => run_count > 0 && run_count % n == 0,
            SnapshotStrategy::Never => false,
        }
    }

    /// 创建快照，超出上限时丢弃最旧的
    pub fn create_snapshot(
        &mut self,
        sequence: u64,
        head: Digest32,
        state: serde_json::Value,
    ) -> &Snapshot {
        self.cache.push(Snapshot::new(sequence, head, state));
        self.prune(self.max_snapshots.max(1));
        tracing::debug!(sequence, retained = self.cache.len(), "snapshot created");
        &self.cache[self.cache.len() - 1]
    }

    /// 最新快照
    pub fn latest(&self) -> Option<&Snapshot> {
        self.cache.iter().max_by_key(|s| s.sequence)
    }

    /// 获取覆盖到指定序号的最近快照
    pub fn at_sequence(&self, sequence: u64) -> Option<&Snapshot> {
        self.cache
            .iter()
            .filter(|s| s.sequence <= sequence)
            .max_by_key(|s| s.sequence)
    }

    /// 清理旧快照
    pub fn prune(&mut self, keep_last: usize) {
        if self.cache.len() > keep_last {
            self.cache.drain(0..self.cache.len() - keep_last);
        }
    }

    /// 获取快照数量
    pub fn count(&self) -> usize {
        self.cache.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.cache.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_n_runs_fires_on_multiples() {
        let manager = SnapshotManager::new(SnapshotStrategy::EveryNRuns(3), 4);
        let fired: Vec<u64> = (0..10).filter(|n| manager.should_snapshot(*n)).collect();
        assert_eq!(fired, vec![3, 6, 9]);
    }

    #[test]
    fn zero_interval_disables_snapshots() {
        let manager = SnapshotManager::new(SnapshotStrategy::from_interval(0), 4);
        assert_eq!(manager.strategy(), SnapshotStrategy::Never);
        assert!(!(0..100).any(|n| manager.should_snapshot(n)));
    }

    #[test]
    fn cap_keeps_newest() {
        let mut manager = SnapshotManager::new(SnapshotStrategy::EveryNRuns(1), 2);
        for seq in [2, 4, 6] {
            manager.create_snapshot(seq, [seq as u8; 32], serde_json::Value::Null);
        }
        assert_eq!(manager.count(), 2);
        assert_eq!(manager.latest().map(|s| s.sequence), Some(6));
        assert_eq!(manager.at_sequence(5).map(|s| s.sequence), Some(4));
        assert!(manager.at_sequence(3).is_none());
    }

    #[test]
    fn head_serializes_as_hex() {
        let snapshot = Snapshot::new(3, [0xab; 32], serde_json::Value::Null);
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["head"], serde_json::json!("ab".repeat(32)));
    }
}
