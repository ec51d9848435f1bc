//! Durable task queue channel
//!
//! A [`BrokerQueue`] wraps one logical channel bound to a named durable queue
//! with prefetch set to 1, so at most one unacknowledged delivery is
//! outstanding per consumer at any time. Retrieval is pull-style: each
//! [`next_message`](BrokerQueue::next_message) call performs exactly one wait
//! cycle against the consumer stream and yields at most one delivery.

use crate::broker::error::{BrokerError, BrokerResult};
use futures::StreamExt;
use lapin::message::Delivery;
use lapin::options::{BasicConsumeOptions, BasicPublishOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Consumer};
use std::time::Duration;

/// Fixed wait applied to non-blocking retrieval before reporting "no message".
const NON_BLOCKING_WAIT: Duration = Duration::from_secs(1);

pub struct BrokerQueue {
    channel: Channel,
    queue_name: String,
    consumer: Option<Consumer>,
    consumer_tag: Option<String>,
}

impl BrokerQueue {
    pub(crate) fn new(channel: Channel, queue_name: String) -> Self {
        Self {
            channel,
            queue_name,
            consumer: None,
            consumer_tag: None,
        }
    }

    /// Name of the durable queue.
    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// Broker-assigned consumer tag, present once a consumer is registered.
    pub fn consumer_tag(&self) -> Option<&str> {
        self.consumer_tag.as_deref()
    }

    /// Publish a payload directly to the queue (default exchange routing).
    pub async fn publish(&self, payload: &[u8]) -> BrokerResult<()> {
        let _confirm = self
            .channel
            .basic_publish(
                "",
                &self.queue_name,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default(),
            )
            .await?;
        Ok(())
    }

    /// Retrieve exactly one delivered message.
    ///
    /// The first call registers an ack-required consumer and stores its tag;
    /// registration happens once per queue instance. When `blocking` is true
    /// the wait has no timeout; otherwise a fixed short timeout applies and
    /// expiry yields `Ok(None)` rather than an error.
    ///
    /// Deliveries carry their acker; prefetch=1 on this channel guarantees no
    /// further delivery arrives until the previous one is acknowledged.
    pub async fn next_message(&mut self, blocking: bool) -> BrokerResult<Option<Delivery>> {
        if self.consumer.is_none() {
            let consumer = self
                .channel
                .basic_consume(
                    &self.queue_name,
                    "",
                    BasicConsumeOptions::default(),
                    FieldTable::default(),
                )
                .await?;
            let tag = consumer.tag().as_str().to_owned();
            log::debug!(
                "Task consumer '{}' registered on queue '{}'",
                tag,
                self.queue_name
            );
            self.consumer_tag = Some(tag);
            self.consumer = Some(consumer);
        }

        let Some(consumer) = self.consumer.as_mut() else {
            return Err(BrokerError::Usage(
                "task consumer registration did not complete".to_string(),
            ));
        };

        let next = if blocking {
            consumer.next().await
        } else {
            match tokio::time::timeout(NON_BLOCKING_WAIT, consumer.next()).await {
                Ok(next) => next,
                Err(_elapsed) => return Ok(None),
            }
        };

        match next {
            Some(Ok(delivery)) => Ok(Some(delivery)),
            Some(Err(e)) => Err(BrokerError::Protocol(e)),
            None => Err(BrokerError::ChannelClosed),
        }
    }
}
