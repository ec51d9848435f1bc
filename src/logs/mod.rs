//! Log Transport Component
//!
//! Fire-and-forget log fan-out over the broker's fanout exchange. The writer
//! publishes JSON-encoded `{message, context}` entries; every reader binds
//! its own anonymous exclusive queue and therefore receives every entry.
//!
//! Log traffic reuses the task queue's physical connection but travels
//! through a separate channel, so it never competes with task deliveries for
//! acknowledgment or prefetch slots and loss on a reader crash is contained
//! to that reader.

mod entry;
mod error;
mod reader;
mod writer;

pub mod api;

pub use entry::LogEntry;
pub use error::{LogsError, LogsResult};
pub use reader::{BrokerLogsReader, LogConsumer};
pub use writer::BrokerLogsWriter;
