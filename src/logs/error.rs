//! Log Transport Error Types

use crate::broker::BrokerError;

#[derive(Debug, thiserror::Error)]
pub enum LogsError {
    /// Failure in the underlying broker layer.
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// The log entry could not be encoded for the wire.
    #[error("encoding log message failed: {0}")]
    Encoding(#[source] serde_json::Error),

    /// A received payload does not decode to the expected entry shape.
    #[error("invalid format of received log message: {body}")]
    Format { body: String },

    /// An argument was rejected before any broker interaction.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for log transport operations
pub type LogsResult<T> = Result<T, LogsError>;
