//! Single-flight gate for long-running operations.
//!
//! Crop, background removal and enhancement each replace the active image.
//! Only one may be in flight at a time: starting one hands out a [`Ticket`],
//! and the result is only committed if that ticket is still current when it
//! comes back. Cancelling invalidates the ticket, so a late result is
//! discarded instead of clobbering newer state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kinds of operation that hold the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Crop,
    BackgroundRemoval,
    Enhancement,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Crop => "crop",
            OperationKind::BackgroundRemoval => "background removal",
            OperationKind::Enhancement => "enhancement",
        };
        f.write_str(name)
    }
}

/// Whether an operation is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationState {
    #[default]
    Idle,
    Busy(OperationKind),
}

impl OperationState {
    pub fn is_busy(self) -> bool {
        matches!(self, OperationState::Busy(_))
    }
}

/// Proof that the holder started the current operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    id: u64,
    kind: OperationKind,
}

impl Ticket {
    pub fn kind(self) -> OperationKind {
        self.kind
    }

    /// Rebuild a ticket from its parts, for hosts that store it across a
    /// language boundary.
    pub fn from_parts(id: u64, kind: OperationKind) -> Self {
        Self { id, kind }
    }

    pub fn id(self) -> u64 {
        self.id
    }
}

/// What happened to an operation's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// The result replaced the active image.
    Applied,
    /// The ticket was stale; the result was dropped.
    Discarded,
    /// There was nothing to operate on.
    NothingToDo,
}

/// Tracks the in-flight operation.
#[derive(Debug, Default)]
pub struct OperationGate {
    state: OperationState,
    current: Option<u64>,
    next_id: u64,
}

impl OperationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> OperationState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Claim the gate. Fails with the running kind if already busy.
    pub fn begin(&mut self, kind: OperationKind) -> Result<Ticket, OperationKind> {
        if let OperationState::Busy(running) = self.state {
            return Err(running);
        }
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.state = OperationState::Busy(kind);
        self.current = Some(id);
        tracing::debug!(%kind, id, "Operation started");
        Ok(Ticket { id, kind })
    }

    /// Whether `ticket` belongs to the operation currently in flight.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current == Some(ticket.id) && self.state == OperationState::Busy(ticket.kind)
    }

    /// Release the gate. Returns `false` (and changes nothing) for a stale
    /// ticket.
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(kind = %ticket.kind, id = ticket.id, "Stale ticket ignored");
            return false;
        }
        self.state = OperationState::Idle;
        self.current = None;
        tracing::debug!(kind = %ticket.kind, id = ticket.id, "Operation finished");
        true
    }

    /// Abandon the in-flight operation, if any, returning its kind.
    pub fn cancel(&mut self) -> Option<OperationKind> {
        let OperationState::Busy(kind) = self.state else {
            return None;
        };
        self.state = OperationState::Idle;
        self.current = None;
        tracing::info!(%kind, "Operation cancelled");
        Some(kind)
    }
}
