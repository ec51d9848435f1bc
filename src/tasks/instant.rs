//! In-memory command queue
//!
//! A local, single-process implementation of the `CommandQueue` contract with
//! no network or concurrency concerns. Useful for development, tests and
//! setups where producer and worker live in the same process.

use crate::tasks::command::{Command, DeliveryTicket, Fetched};
use crate::tasks::error::{CommandQueueError, CommandResult};
use crate::tasks::queue::CommandQueue;
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};

const INSTANT_QUEUE_NAME: &str = "in_memory_tasks_queue";

/// Synchronous in-memory command queue.
///
/// Commands are stored locally instead of traveling over a broker, so
/// fetching can never wait for another process: blocking retrieval is a
/// usage error. Confirm/requeue bookkeeping matches the broker-backed
/// implementation, including tail placement of requeued commands.
pub struct InstantCommandQueue<C> {
    pending: VecDeque<C>,
    in_flight: HashSet<DeliveryTicket>,
    next_ticket: u64,
}

impl<C> Default for InstantCommandQueue<C>
where
    C: Command + Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C> InstantCommandQueue<C>
where
    C: Command + Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            in_flight: HashSet::new(),
            next_ticket: 0,
        }
    }

    /// Number of commands waiting to be fetched.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn issue_ticket(&mut self) -> DeliveryTicket {
        let ticket = DeliveryTicket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }
}

#[async_trait]
impl<C> CommandQueue<C> for InstantCommandQueue<C>
where
    C: Command + Clone + Send + Sync,
{
    async fn publish_command(&mut self, command: &C) -> CommandResult<()> {
        self.pending.push_back(command.clone());
        log::info!("Command published: {}", command.name());
        Ok(())
    }

    async fn next_command(&mut self, blocking: bool) -> CommandResult<Option<Fetched<C>>> {
        if blocking {
            return Err(CommandQueueError::BlockingUnsupported);
        }

        let Some(command) = self.pending.pop_front() else {
            return Ok(None);
        };

        log::info!("Command received: {}", command.name());
        let ticket = self.issue_ticket();
        self.in_flight.insert(ticket);
        Ok(Some(Fetched::new(command, ticket)))
    }

    async fn confirm_command_handled(&mut self, fetched: &Fetched<C>) -> CommandResult<()> {
        if self.in_flight.remove(&fetched.ticket()) {
            log::info!("Command confirmed: {}", fetched.name());
        } else {
            log::warn!(
                "Command {} should be confirmed but was not found",
                fetched.name()
            );
        }
        Ok(())
    }

    async fn requeue_command(&mut self, fetched: &Fetched<C>) -> CommandResult<()> {
        if !self.in_flight.remove(&fetched.ticket()) {
            let name = fetched.name().to_string();
            log::error!("Command {} should be requeued but was not found", name);
            return Err(CommandQueueError::NotInFlight { name });
        }

        self.pending.push_back(fetched.command().clone());
        log::info!("Command requeued: {}", fetched.name());
        Ok(())
    }

    async fn queue_name(&mut self) -> CommandResult<String> {
        Ok(INSTANT_QUEUE_NAME.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::command::CommandMemo;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq)]
    struct ResizeImage {
        path: String,
        width: u32,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct ResizeImageMemo {
        path: String,
        width: u32,
    }

    impl Command for ResizeImage {
        type Memo = ResizeImageMemo;

        fn name(&self) -> &str {
            "resize_image"
        }

        fn memo(&self) -> ResizeImageMemo {
            ResizeImageMemo {
                path: self.path.clone(),
                width: self.width,
            }
        }
    }

    impl CommandMemo for ResizeImageMemo {
        type Command = ResizeImage;

        fn restore_command(self) -> ResizeImage {
            ResizeImage {
                path: self.path,
                width: self.width,
            }
        }
    }

    fn sample_command(path: &str) -> ResizeImage {
        ResizeImage {
            path: path.to_string(),
            width: 800,
        }
    }

    #[test]
    fn test_memo_round_trips_through_wire_format() {
        let command = sample_command("/tmp/a.png");

        let payload = serde_json::to_vec(&command.memo()).unwrap();
        let memo: ResizeImageMemo = serde_json::from_slice(&payload).unwrap();

        assert_eq!(memo.restore_command(), command);
    }

    #[tokio::test]
    async fn test_publish_then_fetch_returns_equivalent_command() {
        let mut queue = InstantCommandQueue::new();
        let command = sample_command("/tmp/a.png");

        queue.publish_command(&command).await.unwrap();
        let fetched = queue.next_command(false).await.unwrap().unwrap();

        assert_eq!(*fetched.command(), command);
        assert_eq!(queue.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_on_empty_queue_returns_none() {
        let mut queue: InstantCommandQueue<ResizeImage> = InstantCommandQueue::new();

        let fetched = queue.next_command(false).await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_blocking_fetch_is_unsupported() {
        let mut queue: InstantCommandQueue<ResizeImage> = InstantCommandQueue::new();

        match queue.next_command(true).await {
            Err(CommandQueueError::BlockingUnsupported) => {}
            other => panic!("expected BlockingUnsupported, got {:?}", other.is_ok()),
        }
    }

    #[tokio::test]
    async fn test_fetched_commands_preserve_fifo_order() {
        let mut queue = InstantCommandQueue::new();
        queue.publish_command(&sample_command("/a")).await.unwrap();
        queue.publish_command(&sample_command("/b")).await.unwrap();

        let first = queue.next_command(false).await.unwrap().unwrap();
        let second = queue.next_command(false).await.unwrap().unwrap();

        assert_eq!(first.path, "/a");
        assert_eq!(second.path, "/b");
    }

    #[tokio::test]
    async fn test_identical_commands_get_distinct_tickets() {
        let mut queue = InstantCommandQueue::new();
        let command = sample_command("/same");
        queue.publish_command(&command).await.unwrap();
        queue.publish_command(&command).await.unwrap();

        let first = queue.next_command(false).await.unwrap().unwrap();
        let second = queue.next_command(false).await.unwrap().unwrap();

        assert_eq!(*first.command(), *second.command());
        assert_ne!(first.ticket(), second.ticket());
    }

    #[tokio::test]
    async fn test_duplicate_confirm_is_a_noop() {
        let mut queue = InstantCommandQueue::new();
        queue.publish_command(&sample_command("/a")).await.unwrap();
        let fetched = queue.next_command(false).await.unwrap().unwrap();

        queue.confirm_command_handled(&fetched).await.unwrap();
        // Second confirm finds no in-flight entry and must not fail.
        queue.confirm_command_handled(&fetched).await.unwrap();
    }

    #[tokio::test]
    async fn test_requeue_unknown_command_fails() {
        let mut queue = InstantCommandQueue::new();
        queue.publish_command(&sample_command("/a")).await.unwrap();
        let fetched = queue.next_command(false).await.unwrap().unwrap();
        queue.confirm_command_handled(&fetched).await.unwrap();

        match queue.requeue_command(&fetched).await {
            Err(CommandQueueError::NotInFlight { name }) => {
                assert_eq!(name, "resize_image");
            }
            other => panic!("expected NotInFlight, got {:?}", other.is_ok()),
        }
    }

    #[tokio::test]
    async fn test_requeued_command_lands_at_the_tail() {
        let mut queue = InstantCommandQueue::new();
        queue.publish_command(&sample_command("/a")).await.unwrap();
        queue.publish_command(&sample_command("/b")).await.unwrap();

        let first = queue.next_command(false).await.unwrap().unwrap();
        assert_eq!(first.path, "/a");

        queue.requeue_command(&first).await.unwrap();

        let second = queue.next_command(false).await.unwrap().unwrap();
        let third = queue.next_command(false).await.unwrap().unwrap();
        assert_eq!(second.path, "/b");
        assert_eq!(third.path, "/a");
    }

    #[tokio::test]
    async fn test_requeue_after_requeue_fails() {
        let mut queue = InstantCommandQueue::new();
        queue.publish_command(&sample_command("/a")).await.unwrap();
        let fetched = queue.next_command(false).await.unwrap().unwrap();

        queue.requeue_command(&fetched).await.unwrap();
        assert!(queue.requeue_command(&fetched).await.is_err());
    }

    #[tokio::test]
    async fn test_queue_name() {
        let mut queue: InstantCommandQueue<ResizeImage> = InstantCommandQueue::new();
        assert_eq!(queue.queue_name().await.unwrap(), "in_memory_tasks_queue");
    }
}
