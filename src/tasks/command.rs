//! Command and memo contracts
//!
//! A command is an opaque unit of work with a stable display name. What
//! travels over the wire is its memo: a serializable snapshot sufficient to
//! reconstruct the command later, possibly in a different process.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A unit of work that can be queued.
pub trait Command {
    /// Snapshot type this command serializes through.
    type Memo: CommandMemo<Command = Self>;

    /// Stable display name, used in queue activity logs.
    fn name(&self) -> &str;

    /// Take a snapshot sufficient to reconstruct this command.
    fn memo(&self) -> Self::Memo;
}

/// Restorable snapshot of a [`Command`].
///
/// Memos are carried as JSON and must round-trip: `command.memo()` followed
/// by `restore_command()` yields an equivalent command.
pub trait CommandMemo: Serialize + DeserializeOwned {
    type Command: Command;

    fn restore_command(self) -> Self::Command;
}

/// Opaque handle identifying one fetched, unacknowledged command.
///
/// Tickets are issued at fetch time from a per-queue monotonic counter, so
/// two fetched commands with identical content hold distinct tickets. A
/// ticket is valid from the fetch until the command is confirmed or requeued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeliveryTicket(pub(crate) u64);

/// A command pulled from a queue, together with its in-flight ticket.
///
/// Dereferences to the command itself for convenience.
#[derive(Debug)]
pub struct Fetched<C> {
    command: C,
    ticket: DeliveryTicket,
}

impl<C> Fetched<C> {
    pub(crate) fn new(command: C, ticket: DeliveryTicket) -> Self {
        Self { command, ticket }
    }

    pub fn command(&self) -> &C {
        &self.command
    }

    pub fn ticket(&self) -> DeliveryTicket {
        self.ticket
    }

    /// Give up in-flight tracking and keep only the command.
    pub fn into_command(self) -> C {
        self.command
    }
}

impl<C> std::ops::Deref for Fetched<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.command
    }
}
