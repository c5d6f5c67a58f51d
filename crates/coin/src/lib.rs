//! Value primitives shared by every value-kind.
//!
//! A value-kind is any Rust type `T` used as a marker; `Balance<Gem>` and
//! `Balance<Gold>` can never be mixed. Supply of a kind is controlled by its
//! [`TreasuryCap`], the only way to create or retire value.
//!
//! - [`Balance`]: a bare amount, no identity, not `Clone`
//! - [`Coin`]: an open-loop value object (balance + identity)
//! - [`TreasuryCap`]: the supply authority: mint, burn, total supply
//! - [`Refused`]: a value handed back by an operation that would not take it
//! - [`TxContext`]: the calling identity, id allocation and event buffer
//!
//! Closed-loop, policy-gated value lives in the `policy` crate.

mod balance;
mod coin;
mod context;
mod error;
mod id;
mod treasury;

pub use balance::{Balance, Supply};
pub use coin::Coin;
pub use context::TxContext;
pub use error::{Error, Refused, Result};
pub use id::{Address, ObjectId};
pub use treasury::TreasuryCap;
