//! Public API for the task-queue system
//!
//! External modules should import from here rather than directly from
//! internal modules.

pub use crate::tasks::broker_queue::BrokerCommandQueue;
pub use crate::tasks::command::{Command, CommandMemo, DeliveryTicket, Fetched};
pub use crate::tasks::error::{CommandQueueError, CommandResult};
pub use crate::tasks::instant::InstantCommandQueue;
pub use crate::tasks::queue::CommandQueue;
