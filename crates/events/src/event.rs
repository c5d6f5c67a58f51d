//! Event types emitted by the policy engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of event that occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// A token policy was published as a shared object.
    PolicyCreated {
        policy_id: Uuid,
        /// Type name of the value-kind the policy governs.
        token_kind: String,
    },
    /// The spent balance of a policy was burned against its treasury.
    SpentFlushed { policy_id: Uuid, amount: u64 },
}

impl EventKind {
    /// Short, stable name used for filtering.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::PolicyCreated { .. } => "policy_created",
            EventKind::SpentFlushed { .. } => "spent_flushed",
        }
    }

    /// The policy this event is about.
    pub fn policy_id(&self) -> Uuid {
        match self {
            EventKind::PolicyCreated { policy_id, .. } => *policy_id,
            EventKind::SpentFlushed { policy_id, .. } => *policy_id,
        }
    }
}

/// An emitted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
        }
    }

    pub fn policy_created(policy_id: Uuid, token_kind: impl Into<String>) -> Self {
        Self::new(EventKind::PolicyCreated {
            policy_id,
            token_kind: token_kind.into(),
        })
    }

    pub fn spent_flushed(policy_id: Uuid, amount: u64) -> Self {
        Self::new(EventKind::SpentFlushed { policy_id, amount })
    }
}
