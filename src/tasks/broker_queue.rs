//! Broker-backed command queue
//!
//! Translates the `CommandQueue` contract into operations on the durable
//! task queue: publish serializes the command's memo, fetch deserializes one
//! delivery and registers it in the in-flight table, confirm acknowledges the
//! stored delivery, requeue acknowledges and republishes.

use crate::broker::{BrokerError, BrokerQueue, SharedBrokerConnection};
use crate::tasks::command::{Command, CommandMemo, DeliveryTicket, Fetched};
use crate::tasks::error::{CommandQueueError, CommandResult};
use crate::tasks::queue::CommandQueue;
use async_trait::async_trait;
use lapin::acker::Acker;
use lapin::options::BasicAckOptions;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;

/// At-least-once command queue over the broker's durable task queue.
///
/// Keeps an in-flight table mapping each fetched command's ticket to the
/// acker of the delivery it arrived on. An entry exists from the moment a
/// command is fetched until it is confirmed (ack sent, entry removed) or
/// requeued (ack sent, entry removed, fresh publish performed).
///
/// Not safe for concurrent use from multiple tasks; confine one instance to
/// one worker task.
pub struct BrokerCommandQueue<C> {
    connection: SharedBrokerConnection,
    task_queue: Option<Arc<Mutex<BrokerQueue>>>,
    in_flight: HashMap<DeliveryTicket, Acker>,
    next_ticket: u64,
    _command: PhantomData<C>,
}

impl<C> BrokerCommandQueue<C>
where
    C: Command + Send + Sync,
{
    pub fn new(connection: SharedBrokerConnection) -> Self {
        Self {
            connection,
            task_queue: None,
            in_flight: HashMap::new(),
            next_ticket: 0,
            _command: PhantomData,
        }
    }

    /// Number of fetched commands awaiting confirm or requeue.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    async fn task_queue(&mut self) -> CommandResult<Arc<Mutex<BrokerQueue>>> {
        if let Some(queue) = &self.task_queue {
            return Ok(Arc::clone(queue));
        }

        let queue = self.connection.lock().await.task_queue().await?;
        self.task_queue = Some(Arc::clone(&queue));
        Ok(queue)
    }

    fn issue_ticket(&mut self) -> DeliveryTicket {
        let ticket = DeliveryTicket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }
}

#[async_trait]
impl<C> CommandQueue<C> for BrokerCommandQueue<C>
where
    C: Command + Send + Sync,
{
    async fn publish_command(&mut self, command: &C) -> CommandResult<()> {
        let payload =
            serde_json::to_vec(&command.memo()).map_err(CommandQueueError::Encoding)?;

        let queue = self.task_queue().await?;
        queue.lock().await.publish(&payload).await?;

        log::info!("Command published: {}", command.name());
        Ok(())
    }

    async fn next_command(&mut self, blocking: bool) -> CommandResult<Option<Fetched<C>>> {
        let queue = self.task_queue().await?;
        let delivery = match queue.lock().await.next_message(blocking).await? {
            Some(delivery) => delivery,
            None => return Ok(None),
        };

        match serde_json::from_slice::<C::Memo>(&delivery.data) {
            Ok(memo) => {
                let command = memo.restore_command();
                log::info!("Command received: {}", command.name());

                let ticket = self.issue_ticket();
                self.in_flight.insert(ticket, delivery.acker);
                Ok(Some(Fetched::new(command, ticket)))
            }
            Err(e) => {
                // Malformed payloads are dropped rather than requeued, which
                // keeps a poison message from looping forever. The delivery
                // stays unacknowledged until the channel goes away.
                log::error!(
                    "Received message does not decode to a command memo: {}\nMessage body:\n{}",
                    e,
                    String::from_utf8_lossy(&delivery.data)
                );
                Ok(None)
            }
        }
    }

    async fn confirm_command_handled(&mut self, fetched: &Fetched<C>) -> CommandResult<()> {
        match self.in_flight.remove(&fetched.ticket()) {
            Some(acker) => {
                acker
                    .ack(BasicAckOptions::default())
                    .await
                    .map_err(BrokerError::Protocol)?;
                log::info!("Command confirmed: {}", fetched.name());
            }
            None => {
                log::warn!(
                    "Command {} should be confirmed but was not found",
                    fetched.name()
                );
            }
        }
        Ok(())
    }

    async fn requeue_command(&mut self, fetched: &Fetched<C>) -> CommandResult<()> {
        if !self.in_flight.contains_key(&fetched.ticket()) {
            let name = fetched.name().to_string();
            log::error!("Command {} should be requeued but was not found", name);
            return Err(CommandQueueError::NotInFlight { name });
        }

        // Ack-then-republish: the retried command lands at the tail of the
        // queue, not the front. Native reject-with-requeue is deliberately
        // not used.
        self.confirm_command_handled(fetched).await?;
        self.publish_command(fetched.command()).await?;

        log::info!("Command requeued: {}", fetched.name());
        Ok(())
    }

    async fn queue_name(&mut self) -> CommandResult<String> {
        let queue = self.task_queue().await?;
        let name = queue.lock().await.queue_name().to_string();
        Ok(name)
    }
}
