//! Error handling for the ledger
//!
//! Every storage-touching operation returns these errors instead of
//! terminating; only the binary's entry point decides to exit.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, BlockchainError>;

/// Error types for ledger operations
#[derive(Debug, Clone)]
pub enum BlockchainError {
    /// The store could not be opened or created
    StoreOpen(String),
    /// An atomic commit (genesis or append) failed; nothing was applied
    Commit(String),
    /// The stored chain is inconsistent, e.g. a linked block is missing
    Integrity(String),
    /// Other database errors
    Database(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// Transaction construction errors
    Transaction(String),
    /// Invalid address format
    InvalidAddress(String),
    /// Insufficient funds for a payment
    InsufficientFunds { required: u64, available: u64 },
    /// Block construction errors
    InvalidBlock(String),
    /// Proof-of-work errors
    Mining(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(String),
}

impl fmt::Display for BlockchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockchainError::StoreOpen(msg) => write!(f, "Failed to open store: {msg}"),
            BlockchainError::Commit(msg) => write!(f, "Commit failed: {msg}"),
            BlockchainError::Integrity(msg) => write!(f, "Chain integrity error: {msg}"),
            BlockchainError::Database(msg) => write!(f, "Database error: {msg}"),
            BlockchainError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            BlockchainError::Transaction(msg) => write!(f, "Transaction error: {msg}"),
            BlockchainError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
            BlockchainError::InsufficientFunds {
                required,
                available,
            } => {
                write!(
                    f,
                    "Insufficient funds: required {required}, available {available}"
                )
            }
            BlockchainError::InvalidBlock(msg) => write!(f, "Invalid block: {msg}"),
            BlockchainError::Mining(msg) => write!(f, "Mining error: {msg}"),
            BlockchainError::Config(msg) => write!(f, "Configuration error: {msg}"),
            BlockchainError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for BlockchainError {}

impl From<std::io::Error> for BlockchainError {
    fn from(err: std::io::Error) -> Self {
        BlockchainError::Io(err.to_string())
    }
}

impl From<sled::Error> for BlockchainError {
    fn from(err: sled::Error) -> Self {
        BlockchainError::Database(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for BlockchainError {
    fn from(err: bincode::error::EncodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for BlockchainError {
    fn from(err: bincode::error::DecodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_message() {
        let err = BlockchainError::InsufficientFunds {
            required: 40,
            available: 10,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds: required 40, available 10"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: BlockchainError = io.into();
        assert!(matches!(err, BlockchainError::Io(_)));
    }
}
