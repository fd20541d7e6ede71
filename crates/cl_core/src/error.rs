//! 全局错误处理机制

use thiserror::Error;

/// CognitiveLedger 统一错误类型
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Journal sequence gap: expected {expected}, found {found}")]
    SequenceGap { expected: u64, found: u64 },

    #[error("Broken hash chain at entry {sequence}")]
    BrokenChain { sequence: u64 },

    #[error("Digest mismatch at entry {sequence}")]
    DigestMismatch { sequence: u64 },

    #[error("Event kind {0} is reserved for the ledger itself")]
    ReservedKind(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 统一 Result 类型别名
pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_entry() {
        let err = LedgerError::BrokenChain { sequence: 7 };
        assert_eq!(err.to_string(), "Broken hash chain at entry 7");

        let err = LedgerError::SequenceGap { expected: 2, found: 5 };
        assert_eq!(err.to_string(), "Journal sequence gap: expected 2, found 5");
    }

    #[test]
    fn serde_errors_convert() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: LedgerError = parse.unwrap_err().into();
        assert!(matches!(err, LedgerError::Serialization(_)));
    }
}
