//! Per-call execution context.

use crate::{Address, ObjectId};
use events::{Event, EventKind};

/// What the hosting environment tells the engine about the current call:
/// who is calling, fresh identities for new objects, and a buffer for
/// emitted events.
#[derive(Debug)]
pub struct TxContext {
    sender: Address,
    ids_created: u64,
    events: Vec<Event>,
}

impl TxContext {
    pub fn new(sender: impl Into<Address>) -> Self {
        Self {
            sender: sender.into(),
            ids_created: 0,
            events: Vec::new(),
        }
    }

    /// The invoking identity.
    pub fn sender(&self) -> &Address {
        &self.sender
    }

    /// Allocate an identity for a new object.
    pub fn fresh_id(&mut self) -> ObjectId {
        self.ids_created += 1;
        ObjectId::new()
    }

    /// Number of identities allocated during this call.
    pub fn ids_created(&self) -> u64 {
        self.ids_created
    }

    /// Emit an event. Fire-and-forget: the engine never reads it back.
    pub fn emit(&mut self, kind: EventKind) {
        self.events.push(Event::new(kind));
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Drain the emitted events, e.g. to journal them.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
