//! Event model and SQLite-backed journal for token policy events.
//!
//! The policy engine never talks to a database. It emits events into the
//! caller's transaction context, fire-and-forget, and whoever hosts the
//! engine decides where they go. This crate provides the event types and an
//! [`EventStore`] that journals them for later inspection.
//!
//! # Core Concepts
//!
//! ## Event
//!
//! An [`Event`] has a unique ID, a timestamp and an [`EventKind`]:
//! - `PolicyCreated`: a token policy was published as a shared object
//! - `SpentFlushed`: spent balance was burned against the treasury
//!
//! ## EventStore
//!
//! The [`EventStore`] wraps a SQLite database. Events are indexed by the
//! policy they are about, so the full history of one policy can be loaded
//! in emission order.
//!
//! # Example
//!
//! ```no_run
//! use events::{Event, EventStore};
//! use uuid::Uuid;
//!
//! let store = EventStore::open("events.db")?;
//!
//! let policy_id = Uuid::new_v4();
//! store.append(&Event::policy_created(policy_id, "gems::Gem"))?;
//! store.append(&Event::spent_flushed(policy_id, 40))?;
//!
//! for event in store.load_policy(policy_id)? {
//!     println!("{}: {:?}", event.timestamp, event.kind);
//! }
//! # Ok::<(), events::Error>(())
//! ```

mod error;
mod event;
mod store;

pub use error::{Error, Result};
pub use event::{Event, EventKind};
pub use store::EventStore;
