//! Task Queue Component
//!
//! The `CommandQueue` contract and its implementations: publish a unit of
//! work, block or poll for the next one, acknowledge success, or requeue on
//! failure. The contract is the same whether the backing store is a broker
//! connection or a local in-process structure.
//!
//! # Delivery protocol (broker-backed)
//!
//! ```text
//!            publish_command           next_command
//!  producer ───────────────▶ queue ◀──────────────── worker
//!                                        │
//!                          ┌─────────────┴─────────────┐
//!                          │   in-flight (ticketed)    │
//!                          └─────┬───────────────┬─────┘
//!              confirm_command_handled     requeue_command
//!                        (ack)            (ack + republish
//!                                          to queue tail)
//! ```
//!
//! Delivery is at-least-once: a fetched command stays tracked under its
//! [`DeliveryTicket`] until it is confirmed or requeued. Fetching attaches a
//! fresh ticket, so two commands with identical content are distinct tracked
//! entries.

mod broker_queue;
mod command;
mod error;
mod instant;
mod queue;

pub mod api;

pub use broker_queue::BrokerCommandQueue;
pub use command::{Command, CommandMemo, DeliveryTicket, Fetched};
pub use error::{CommandQueueError, CommandResult};
pub use instant::InstantCommandQueue;
pub use queue::CommandQueue;
