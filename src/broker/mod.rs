//! Broker Connection Component
//!
//! Connection and channel lifecycle management for the AMQP broker. One
//! [`BrokerConnection`] owns the physical connection and lazily creates two
//! logical sub-resources on first use:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                   BrokerConnection                     │
//! │            (one physical AMQP connection)              │
//! │                                                        │
//! │  ┌──────────────────────┐  ┌────────────────────────┐  │
//! │  │     BrokerQueue      │  │     BrokerChannel      │  │
//! │  │ named durable queue  │  │    fanout exchange     │  │
//! │  │ prefetch=1, ack'd    │  │ no-ack, one anonymous  │  │
//! │  │ task traffic         │  │ queue per subscriber   │  │
//! │  └──────────────────────┘  └────────────────────────┘  │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! Task traffic and log traffic never share a queue. Each resource
//! transitions unconnected → connected exactly once, lazily, on the first
//! operation that needs it; the only way back is tearing down the owning
//! connection with [`BrokerConnection::close`].

mod channel;
mod config;
mod connection;
mod error;
mod queue;

pub mod api;

pub use channel::BrokerChannel;
pub use config::BrokerConfig;
pub use connection::{BrokerConnection, SharedBrokerConnection};
pub use error::{BrokerError, BrokerResult};
pub use queue::BrokerQueue;
