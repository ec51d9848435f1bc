//! Fanout channel used for log traffic
//!
//! A [`BrokerChannel`] wraps one logical channel bound to a fanout exchange.
//! Publishing broadcasts to every bound queue; subscribing binds an anonymous
//! exclusive auto-delete queue so this channel receives its own copy of every
//! entry. Consumption is no-ack: the broker removes a message on delivery, so
//! log entries are lost if the consumer crashes mid-handling. That trade-off
//! is deliberate for log traffic.

use crate::broker::error::{BrokerError, BrokerResult};
use futures::StreamExt;
use lapin::message::Delivery;
use lapin::options::{
    BasicConsumeOptions, BasicPublishOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Consumer};
use std::time::Duration;

pub struct BrokerChannel {
    channel: Channel,
    exchange: String,
    queue_name: Option<String>,
    consumer: Option<Consumer>,
}

impl BrokerChannel {
    pub(crate) fn new(channel: Channel, exchange: String) -> Self {
        Self {
            channel,
            exchange,
            queue_name: None,
            consumer: None,
        }
    }

    /// Name of the fanout exchange this channel is bound to.
    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    /// Publish a payload to the fanout exchange.
    pub async fn publish(&self, payload: &[u8]) -> BrokerResult<()> {
        let _confirm = self
            .channel
            .basic_publish(
                &self.exchange,
                "",
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default(),
            )
            .await?;
        Ok(())
    }

    /// Register this channel's consumer.
    ///
    /// The first call declares an anonymous exclusive auto-delete queue, binds
    /// it to the fanout exchange and starts a no-ack consumer. Subsequent
    /// calls are no-ops.
    pub async fn subscribe(&mut self) -> BrokerResult<()> {
        if self.consumer.is_some() {
            return Ok(());
        }

        let declared = self
            .channel
            .queue_declare(
                "",
                QueueDeclareOptions {
                    exclusive: true,
                    auto_delete: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;
        let queue_name = declared.name().as_str().to_owned();

        self.channel
            .queue_bind(
                &queue_name,
                &self.exchange,
                "",
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await?;

        let consumer = self
            .channel
            .basic_consume(
                &queue_name,
                "",
                BasicConsumeOptions {
                    no_ack: true,
                    ..BasicConsumeOptions::default()
                },
                FieldTable::default(),
            )
            .await?;

        log::debug!(
            "Log consumer registered on queue '{}' bound to exchange '{}'",
            queue_name,
            self.exchange
        );

        self.queue_name = Some(queue_name);
        self.consumer = Some(consumer);
        Ok(())
    }

    /// Wait for the next delivery on this channel.
    ///
    /// `None` waits indefinitely for the next frame. With a timeout, expiry
    /// is a normal poll outcome reported as `Ok(None)`, not an error.
    ///
    /// Fails with a usage error if [`subscribe`](Self::subscribe) was never
    /// called.
    pub async fn wait_for_next(
        &mut self,
        timeout: Option<Duration>,
    ) -> BrokerResult<Option<Delivery>> {
        let consumer = self.consumer.as_mut().ok_or_else(|| {
            BrokerError::Usage("subscribe must be called before wait_for_next".to_string())
        })?;

        let next = match timeout {
            Some(timeout) => match tokio::time::timeout(timeout, consumer.next()).await {
                Ok(next) => next,
                Err(_elapsed) => return Ok(None),
            },
            None => consumer.next().await,
        };

        match next {
            Some(Ok(delivery)) => Ok(Some(delivery)),
            Some(Err(e)) => Err(BrokerError::Protocol(e)),
            None => Err(BrokerError::ChannelClosed),
        }
    }
}
