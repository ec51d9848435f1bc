//! taskrelay
//!
//! Task-queue and log-transport abstraction over an AMQP message broker.
//!
//! Two independent traffic paths share one physical connection:
//!
//! - **Task delivery**: a named durable queue with prefetch 1. Commands are
//!   published as serialized memos, fetched one at a time and tracked until
//!   they are confirmed (acknowledged) or requeued. See [`tasks`].
//! - **Log fan-out**: a fanout exchange where every bound reader receives
//!   every entry. Delivery is fire-and-forget; loss on consumer crash is
//!   acceptable. See [`logs`].
//!
//! The [`broker`] module owns the connection/channel lifecycle; [`core`]
//! carries logger initialization for applications embedding the crate.

pub mod broker;
pub mod core;
pub mod logs;
pub mod tasks;
