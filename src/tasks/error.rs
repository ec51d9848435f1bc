//! Task Queue Error Types

use crate::broker::BrokerError;

#[derive(Debug, thiserror::Error)]
pub enum CommandQueueError {
    /// Failure in the underlying broker layer.
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// The command's memo could not be encoded for the wire.
    #[error("failed to encode command memo: {0}")]
    Encoding(#[source] serde_json::Error),

    /// Requeue was requested for a command with no in-flight entry. This is a
    /// programming error, not a transient condition.
    #[error("command '{name}' should be requeued but was not found")]
    NotInFlight { name: String },

    /// The synchronous in-memory queue cannot wait for commands.
    #[error("synchronous in-memory command queue cannot operate in blocking mode")]
    BlockingUnsupported,
}

/// Result type for command-queue operations
pub type CommandResult<T> = Result<T, CommandQueueError>;
