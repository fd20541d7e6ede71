//! 账本配置

use std::path::Path;

use serde::{Deserialize, Serialize};

use cl_core::{LedgerError, Result};

/// 账本配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// 账本名称 (用于日志)
    pub name: String,
    /// 每 N 次 run 创建一次快照，0 表示关闭
    pub snapshot_every: u64,
    /// 最多保留的快照数
    pub max_snapshots: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            name: "cognitive-ledger".to_string(),
            snapshot_every: 10,
            max_snapshots: 16,
        }
    }
}

impl LedgerConfig {
    /// 从 JSON 文本解析，缺省字段取默认值
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.snapshot_every > 0 && self.max_snapshots == 0 {
            return Err(LedgerError::Config(
                "max_snapshots must be at least 1 when snapshots are enabled".to_string(),
            ));
        }
        Ok(())
    }
}
