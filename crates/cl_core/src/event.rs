//! 认知事件定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 账本事件
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEvent {
    /// 事件唯一标识
    pub id: Uuid,
    /// 事件类型
    pub kind: EventKind,
    /// 事件时间戳
    pub timestamp: DateTime<Utc>,
    /// 事件载荷 (JSON)
    pub payload: serde_json::Value,
    /// 因果关系: 前置事件 ID
    pub causation_id: Option<Uuid>,
}

impl LedgerEvent {
    /// 创建新事件
    pub fn new(kind: EventKind, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            timestamp: Utc::now(),
            payload,
            causation_id: None,
        }
    }

    /// 设置因果关系
    pub fn with_causation(mut self, causation_id: Uuid) -> Self {
        self.causation_id = Some(causation_id);
        self
    }
}

/// 事件类型枚举
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EventKind {
    // 运行周期
    RunStarted,
    RunCompleted,

    // 认知事件
    Observation,
    Decision,
    Reflection,

    // 维护事件
    SnapshotTaken,

    // 自定义事件
    Custom(String),
}

impl EventKind {
    /// 获取事件类型名称
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::RunStarted => "run_started",
            EventKind::RunCompleted => "run_completed",
            EventKind::Observation => "observation",
            EventKind::Decision => "decision",
            EventKind::Reflection => "reflection",
            EventKind::SnapshotTaken => "snapshot_taken",
            EventKind::Custom(name) => name,
        }
    }

    /// 运行周期与维护事件只能由账本自身写入
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            EventKind::RunStarted | EventKind::RunCompleted | EventKind::SnapshotTaken
        )
    }

    /// 从名称解析事件类型，未知名称视为自定义事件
    pub fn parse(name: &str) -> Self {
        match name {
            "run_started" => EventKind::RunStarted,
            "run_completed" => EventKind::RunCompleted,
            "observation" => EventKind::Observation,
            "decision" => EventKind::Decision,
            "reflection" => EventKind::Reflection,
            "snapshot_taken" => EventKind::SnapshotTaken,
            other => EventKind::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip_through_parse() {
        for kind in [
            EventKind::RunStarted,
            EventKind::RunCompleted,
            EventKind::Observation,
            EventKind::Decision,
            EventKind::Reflection,
            EventKind::SnapshotTaken,
        ] {
            assert_eq!(EventKind::parse(kind.as_str()), kind);
        }
    }

    #[test]
    fn lifecycle_kinds_are_flagged() {
        assert!(EventKind::RunStarted.is_lifecycle());
        assert!(EventKind::SnapshotTaken.is_lifecycle());
        assert!(!EventKind::Observation.is_lifecycle());
        assert!(!EventKind::Custom("run_started".into()).is_lifecycle());
    }

    #[test]
    fn unknown_names_become_custom() {
        let kind = EventKind::parse("hunch");
        assert_eq!(kind, EventKind::Custom("hunch".to_string()));
        assert_eq!(kind.as_str(), "hunch");
    }

    #[test]
    fn causation_is_attached() {
        let cause = LedgerEvent::new(EventKind::RunStarted, serde_json::json!({ "run": 1 }));
        let effect = LedgerEvent::new(EventKind::RunCompleted, serde_json::Value::Null)
            .with_causation(cause.id);
        assert_eq!(effect.causation_id, Some(cause.id));
        assert_ne!(cause.id, effect.id);
    }
}
