use thiserror::Error;

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error type surfaced by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("no wallet exists for {0}")]
    NotFound(String),
    #[error("wallet {0} already exists")]
    AlreadyExists(String),
    #[error("transaction {transaction_id} from {entity} already recorded for wallet {wallet}")]
    DuplicateTransaction {
        wallet: String,
        entity: String,
        transaction_id: String,
    },
    #[error("wallet {wallet} holds {balance} points, cannot redeem {requested}")]
    InsufficientBalance {
        wallet: String,
        balance: i64,
        requested: u64,
    },
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("corrupt record at {key}: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("failed to encode record for {key}: {reason}")]
    Encode { key: String, reason: String },
}

impl LedgerError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Short machine-readable label, used for events and exit reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::DuplicateTransaction { .. } => "duplicate_transaction",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::Corrupt { .. } => "corrupt",
            Self::Encode { .. } => "encode",
        }
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(value: rusqlite::Error) -> Self {
        Self::StoreUnavailable(value.to_string())
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(value: std::io::Error) -> Self {
        Self::StoreUnavailable(value.to_string())
    }
}
