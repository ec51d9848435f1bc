//! Public API for the log transport
//!
//! External modules should import from here rather than directly from
//! internal modules.

pub use crate::logs::entry::LogEntry;
pub use crate::logs::error::{LogsError, LogsResult};
pub use crate::logs::reader::{BrokerLogsReader, LogConsumer};
pub use crate::logs::writer::BrokerLogsWriter;
