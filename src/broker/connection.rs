//! Physical broker connection with lazy resource construction
//!
//! The connection is attempted at most once, on the first operation that
//! needs it. Connect failures wrap the transport cause and are not retried
//! here. The two logical sub-resources are likewise built on first request
//! and cached for the lifetime of the connection.

use crate::broker::channel::BrokerChannel;
use crate::broker::config::BrokerConfig;
use crate::broker::error::{BrokerError, BrokerResult};
use crate::broker::queue::BrokerQueue;
use lapin::options::{BasicQosOptions, ExchangeDeclareOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{Connection, ConnectionProperties, ExchangeKind};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handle to one [`BrokerConnection`].
///
/// The physical connection and its channels are exclusively owned by one
/// `BrokerConnection`; the command queue and the log writer/reader built on
/// top of it go through this shared handle rather than holding independent
/// connections.
pub type SharedBrokerConnection = Arc<Mutex<BrokerConnection>>;

/// Owner of the physical broker connection.
pub struct BrokerConnection {
    config: BrokerConfig,
    connection: Option<Connection>,
    task_queue: Option<Arc<Mutex<BrokerQueue>>>,
    log_channel: Option<Arc<Mutex<BrokerChannel>>>,
}

impl BrokerConnection {
    /// Build a disconnected instance; nothing touches the network until the
    /// first resource request.
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            config,
            connection: None,
            task_queue: None,
            log_channel: None,
        }
    }

    /// Wrap the connection in the shared handle used by the task-queue and
    /// log components.
    pub fn into_shared(self) -> SharedBrokerConnection {
        Arc::new(Mutex::new(self))
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Whether the physical connection has been established.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    async fn connect(&mut self) -> BrokerResult<&Connection> {
        if self.connection.is_none() {
            let connection =
                Connection::connect(&self.config.amqp_uri(), ConnectionProperties::default())
                    .await
                    .map_err(|source| BrokerError::Connection { source })?;
            log::debug!(
                "Connected to message broker at {}:{}",
                self.config.host,
                self.config.port
            );
            self.connection = Some(connection);
        }

        self.connection.as_ref().ok_or_else(|| {
            BrokerError::Usage("connection vanished during establishment".to_string())
        })
    }

    /// The task queue: a named durable queue with prefetch 1.
    ///
    /// The first call opens a channel, declares the queue (survives broker
    /// restart, not auto-deleted) and limits the channel to one
    /// unacknowledged delivery in flight. Subsequent calls return the cached
    /// instance.
    pub async fn task_queue(&mut self) -> BrokerResult<Arc<Mutex<BrokerQueue>>> {
        if let Some(queue) = &self.task_queue {
            return Ok(Arc::clone(queue));
        }

        let queue_name = self.config.task_queue.clone();
        let connection = self.connect().await?;
        let channel = connection.create_channel().await?;

        channel
            .queue_declare(
                &queue_name,
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;
        channel.basic_qos(1, BasicQosOptions::default()).await?;

        let queue = Arc::new(Mutex::new(BrokerQueue::new(channel, queue_name)));
        self.task_queue = Some(Arc::clone(&queue));
        Ok(queue)
    }

    /// The log channel: a fanout exchange, non-durable and not auto-deleted.
    ///
    /// The first call opens a channel and declares the exchange; subsequent
    /// calls return the cached instance.
    pub async fn log_channel(&mut self) -> BrokerResult<Arc<Mutex<BrokerChannel>>> {
        if let Some(channel) = &self.log_channel {
            return Ok(Arc::clone(channel));
        }

        let exchange = self.config.log_exchange.clone();
        let connection = self.connect().await?;
        let channel = connection.create_channel().await?;

        channel
            .exchange_declare(
                &exchange,
                ExchangeKind::Fanout,
                ExchangeDeclareOptions::default(),
                FieldTable::default(),
            )
            .await?;

        let log_channel = Arc::new(Mutex::new(BrokerChannel::new(channel, exchange)));
        self.log_channel = Some(Arc::clone(&log_channel));
        Ok(log_channel)
    }

    /// Tear down: drop the cached sub-resources and close the physical
    /// connection if it was ever opened.
    pub async fn close(&mut self) -> BrokerResult<()> {
        self.task_queue = None;
        self.log_channel = None;

        if let Some(connection) = self.connection.take() {
            connection.close(200, "client shutdown").await?;
            log::debug!("Broker connection closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_connection_is_lazy() {
        let connection = BrokerConnection::new(BrokerConfig::default());

        assert!(!connection.is_connected());
        assert_eq!(connection.config().task_queue, "tasks_queue");
    }

    #[tokio::test]
    async fn test_close_without_connect_is_a_noop() {
        let mut connection = BrokerConnection::new(BrokerConfig::default());

        connection.close().await.expect("close should succeed");
        assert!(!connection.is_connected());
    }
}
