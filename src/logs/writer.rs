//! Broker-backed log writer

use crate::broker::{BrokerChannel, SharedBrokerConnection};
use crate::logs::entry::LogEntry;
use crate::logs::error::LogsResult;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Publishes log entries to the fanout exchange.
///
/// The log channel is obtained lazily from the shared connection on the
/// first write. Writing is fire-and-forget: there is no acknowledgment and
/// no record of which readers, if any, received an entry.
pub struct BrokerLogsWriter {
    connection: SharedBrokerConnection,
    channel: Option<Arc<Mutex<BrokerChannel>>>,
}

impl BrokerLogsWriter {
    pub fn new(connection: SharedBrokerConnection) -> Self {
        Self {
            connection,
            channel: None,
        }
    }

    async fn channel(&mut self) -> LogsResult<Arc<Mutex<BrokerChannel>>> {
        if let Some(channel) = &self.channel {
            return Ok(Arc::clone(channel));
        }

        let channel = self.connection.lock().await.log_channel().await?;
        self.channel = Some(Arc::clone(&channel));
        Ok(channel)
    }

    /// JSON-encode `{message, context}` and publish it to the log exchange.
    ///
    /// Fails with an encoding error if the entry cannot be serialized, or
    /// with a broker error if publishing fails.
    pub async fn write(&mut self, message: &str, context: Value) -> LogsResult<()> {
        let payload = LogEntry::new(message, context).encode()?;

        let channel = self.channel().await?;
        channel.lock().await.publish(&payload).await?;
        Ok(())
    }
}
