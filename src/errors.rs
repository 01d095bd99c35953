use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("No wallet available: {0}")]
    WalletMissing(String),

    #[error("Please switch networks: expected chain {expected}, got {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("Contract call failed: {0}")]
    Contract(String),

    #[error("Metadata for token {token_id} unavailable: {reason}")]
    Metadata { token_id: u64, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Fetch task failed: {0}")]
    Task(String),
}

pub type MarketResult<T> = Result<T, MarketError>;
