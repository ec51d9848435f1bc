//! The task-queue contract

use crate::tasks::command::{Command, Fetched};
use crate::tasks::error::CommandResult;
use async_trait::async_trait;

/// Uniform contract for publishing and handling units of work.
///
/// Implementations differ in their backing store (broker connection or local
/// structure) but share the same state machine per command: absent →
/// in-flight (after a successful fetch) → terminal (after confirm or
/// requeue). Only fetched commands can be confirmed or requeued.
#[async_trait]
pub trait CommandQueue<C>: Send
where
    C: Command + Send + Sync,
{
    /// Send a command to the queue for execution by a worker.
    ///
    /// No in-flight state is tracked for published commands; tracking starts
    /// only when a command is delivered back through
    /// [`next_command`](Self::next_command).
    async fn publish_command(&mut self, command: &C) -> CommandResult<()>;

    /// Fetch the next command ready to be handled.
    ///
    /// With `blocking` set, waits until a command is available; otherwise
    /// returns `Ok(None)` promptly when the queue is empty.
    async fn next_command(&mut self, blocking: bool) -> CommandResult<Option<Fetched<C>>>;

    /// Confirm that a fetched command has been handled correctly.
    ///
    /// Confirming a command that is no longer in flight is a warn-logged
    /// no-op, so duplicate confirms are harmless.
    async fn confirm_command_handled(&mut self, fetched: &Fetched<C>) -> CommandResult<()>;

    /// Return a fetched command to the queue because it failed or cannot be
    /// handled right now.
    ///
    /// The command is republished as a brand-new message and therefore lands
    /// at the tail of the queue. Requeueing a command that is not in flight
    /// is a hard error.
    async fn requeue_command(&mut self, fetched: &Fetched<C>) -> CommandResult<()>;

    /// Name of the underlying queue.
    async fn queue_name(&mut self) -> CommandResult<String>;
}
