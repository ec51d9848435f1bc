//! Broker Error Types

#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// The physical connection could not be established. Wraps the transport
    /// cause; never retried here, retry is the caller's responsibility.
    #[error("cannot establish connection to message broker: {source}")]
    Connection {
        #[source]
        source: lapin::Error,
    },

    /// A channel-level broker operation failed.
    #[error("broker operation failed: {0}")]
    Protocol(#[from] lapin::Error),

    /// Precondition violation by the caller.
    #[error("{0}")]
    Usage(String),

    /// The consumer stream ended while a delivery was being awaited.
    #[error("channel closed while waiting for a delivery")]
    ChannelClosed,
}

/// Result type for broker operations
pub type BrokerResult<T> = Result<T, BrokerError>;
