//! 哈希链日志
//!
//! 只追加的认知事件日志。每个条目携带前一条目的摘要，
//! 任何对历史条目的篡改都会在校验时暴露。

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use cl_core::event::{EventKind, LedgerEvent};
use cl_core::{LedgerError, Result};

/// 32 字节 SHA-256 摘要
pub type Digest32 = [u8; 32];

/// 创世摘要: 第一个条目的前驱
pub fn genesis_digest() -> Digest32 {
    Sha256::digest(b"cognitive-ledger-genesis").into()
}

/// 日志条目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    /// 序号 (从 0 开始连续递增)
    pub sequence: u64,
    /// 事件
    pub event: LedgerEvent,
    /// 前驱摘要
    #[serde(with = "hex::serde")]
    pub prev_digest: Digest32,
    /// 本条目摘要
    #[serde(with = "hex::serde")]
    pub digest: Digest32,
}

impl JournalEntry {
    fn seal(sequence: u64, event: LedgerEvent, prev_digest: Digest32) -> Self {
        let digest = entry_digest(sequence, &event, &prev_digest);
        Self {
            sequence,
            event,
            prev_digest,
            digest,
        }
    }

    /// 摘要的十六进制表示
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

/// 变长字段带 u64 长度前缀，避免字段边界歧义
fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// 内置类型用固定标签，自定义类型额外带名称
fn update_kind(hasher: &mut Sha256, kind: &EventKind) {
    let tag: u8 = match kind {
        EventKind::RunStarted => 0,
        EventKind::RunCompleted => 1,
        EventKind::Observation => 2,
        EventKind::Decision => 3,
        EventKind::Reflection => 4,
        EventKind::SnapshotTaken => 5,
        EventKind::Custom(_) => 0xff,
    };
    hasher.update([tag]);
    if let EventKind::Custom(name) = kind {
        update_field(hasher, name.as_bytes());
    }
}

fn entry_digest(sequence: u64, event: &LedgerEvent, prev_digest: &Digest32) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(b"entry");
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_digest);
    hasher.update(event.id.as_bytes());
    update_kind(&mut hasher, &event.kind);
    hasher.update(event.timestamp.timestamp().to_le_bytes());
    hasher.update(event.timestamp.timestamp_subsec_nanos().to_le_bytes());
    match &event.causation_id {
        Some(cause) => {
            hasher.update([1u8]);
            hasher.update(cause.as_bytes());
        }
        None => hasher.update([0u8]),
    }
    update_field(&mut hasher, event.payload.to_string().as_bytes());
    hasher.finalize().into()
}

/// 日志
#[derive(Debug, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    /// 创建空日志
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加事件
    pub fn append(&mut self, event: LedgerEvent) -> &JournalEntry {
        let sequence = self.entries.len() as u64;
        let entry = JournalEntry::seal(sequence, event, self.head());
        tracing::debug!(
            sequence,
            kind = %entry.event.kind,
            digest = %entry.digest_hex(),
            "journal entry appended"
        );
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// 当前链头摘要 (空日志时为创世摘要)
    pub fn head(&self) -> Digest32 {
        self.entries
            .last()
            .map(|e| e.digest)
            .unwrap_or_else(genesis_digest)
    }

    /// 所有条目
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// 按序号获取条目
    pub fn get(&self, sequence: u64) -> Option<&JournalEntry> {
        usize::try_from(sequence)
            .ok()
            .and_then(|idx| self.entries.get(idx))
    }

    /// 按类型筛选事件
    pub fn events_of<'a>(&'a self, kind: &'a EventKind) -> impl Iterator<Item = &'a LedgerEvent> {
        self.entries
            .iter()
            .map(|e| &e.event)
            .filter(move |event| &event.kind == kind)
    }

    /// 条目数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 校验整条哈希链
    pub fn verify(&self) -> Result<()> {
        let mut prev = genesis_digest();
        for (idx, entry) in self.entries.iter().enumerate() {
            let expected = idx as u64;
            if entry.sequence != expected {
                return Err(LedgerError::SequenceGap {
                    expected,
                    found: entry.sequence,
                });
            }
            if entry.prev_digest != prev {
                return Err(LedgerError::BrokenChain {
                    sequence: entry.sequence,
                });
            }
            if entry_digest(entry.sequence, &entry.event, &entry.prev_digest) != entry.digest {
                return Err(LedgerError::DigestMismatch {
                    sequence: entry.sequence,
                });
            }
            prev = entry.digest;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn entries_mut(&mut self) -> &mut Vec<JournalEntry> {
        &mut self.entries
    }
}
