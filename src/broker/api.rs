//! Public API for the broker layer
//!
//! External modules should import from here rather than directly from
//! internal modules.

pub use crate::broker::channel::BrokerChannel;
pub use crate::broker::config::BrokerConfig;
pub use crate::broker::connection::{BrokerConnection, SharedBrokerConnection};
pub use crate::broker::error::{BrokerError, BrokerResult};
pub use crate::broker::queue::BrokerQueue;
