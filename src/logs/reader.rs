//! Broker-backed log reader
//!
//! Drives a consume loop over the fanout channel with counter-based and
//! timeout-based stop conditions. Each delivered entry is JSON-decoded and
//! forwarded to a [`LogConsumer`].

use crate::broker::{BrokerChannel, SharedBrokerConnection};
use crate::logs::entry::LogEntry;
use crate::logs::error::{LogsError, LogsResult};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Sink for consumed log entries.
pub trait LogConsumer: Send {
    fn consume_log(&mut self, message: &str, context: &Value);
}

/// Pulls log entries from the fanout exchange.
///
/// The underlying broker subscription (anonymous queue, binding, consumer)
/// is registered once per reader, on the first `read` call. Swapping the
/// [`LogConsumer`] between `read` calls while deliveries are still pending
/// is unsupported: buffered entries go to whichever consumer is active when
/// they are pulled.
pub struct BrokerLogsReader {
    connection: SharedBrokerConnection,
    channel: Option<Arc<Mutex<BrokerChannel>>>,
}

impl BrokerLogsReader {
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

    /// Consume log entries, forwarding each to `consumer`.
    ///
    /// `max_reads`: `None` means unlimited; `Some(n)` stops after `n`
    /// entries and must be at least 1. `timeout`: `Duration::ZERO` means
    /// "no timeout"; otherwise each wait is bounded and an expired wait ends
    /// the call. With no bound on either, this never returns.
    ///
    /// Arguments are validated before any broker interaction.
    pub async fn read(
        &mut self,
        consumer: &mut dyn LogConsumer,
        max_reads: Option<u64>,
        timeout: Duration,
    ) -> LogsResult<()> {
        if max_reads == Some(0) {
            return Err(LogsError::InvalidArgument(
                "max_reads must be at least 1 when bounded".to_string(),
            ));
        }

        let channel = self.channel().await?;
        let mut channel = channel.lock().await;
        channel.subscribe().await?;

        let mut reads: u64 = 0;

        if !timeout.is_zero() {
            loop {
                match channel.wait_for_next(Some(timeout)).await? {
                    Some(delivery) => {
                        Self::dispatch(consumer, &delivery.data)?;
                        reads += 1;
                        if Some(reads) == max_reads {
                            break;
                        }
                    }
                    None => break,
                }
            }
        } else if max_reads.is_some() {
            while Some(reads) != max_reads {
                if let Some(delivery) = channel.wait_for_next(None).await? {
                    Self::dispatch(consumer, &delivery.data)?;
                    reads += 1;
                }
            }
        } else {
            loop {
                if let Some(delivery) = channel.wait_for_next(None).await? {
                    Self::dispatch(consumer, &delivery.data)?;
                }
            }
        }

        Ok(())
    }

    fn dispatch(consumer: &mut dyn LogConsumer, body: &[u8]) -> LogsResult<()> {
        let entry = LogEntry::decode(body)?;
        consumer.consume_log(&entry.message, &entry.context);
        Ok(())
    }
}
