use crate::domain::payment::PaymentStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchpadError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Payment gateway error: {0}")]
    GatewayError(String),
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Gateway order does not match the payment record")]
    OrderMismatch,
    #[error("Payment not found")]
    NotFound,
    #[error("Payment already finalized as {0}")]
    AlreadyFinalized(PaymentStatus),
    #[error("Duplicate record: {0}")]
    Duplicate(String),
    #[error("Email error: {0}")]
    EmailError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDBError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl LaunchpadError {
    /// Stable machine-readable code reported alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigurationError(_) => "configuration",
            Self::ValidationError(_) => "validation",
            Self::GatewayError(_) => "gateway",
            Self::InvalidSignature => "invalid_signature",
            Self::OrderMismatch => "order_mismatch",
            Self::NotFound => "not_found",
            Self::AlreadyFinalized(_) => "already_finalized",
            Self::Duplicate(_) => "duplicate",
            Self::EmailError(_) => "email",
            Self::CsvError(_) | Self::IoError(_) | Self::InternalError(_) => "internal",
            #[cfg(feature = "storage-rocksdb")]
            Self::RocksDBError(_) => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, LaunchpadError>;
