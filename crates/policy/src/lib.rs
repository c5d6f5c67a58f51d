//! Closed-loop token policy engine.
//!
//! A [`Token`] is a value container whose movement is gated by a
//! [`TokenPolicy`]. Every gated operation produces an [`ActionRequest`]
//! that must be resolved through exactly one confirmation path:
//!
//! - [`TokenPolicy::confirm`]: every rule required for the action has
//!   stamped the request.
//! - [`TokenPolicy::confirm_mut`]: as above, and the request's detached
//!   balance is moved into the policy's spent balance.
//! - [`ActionRequest::confirm_with_policy_cap`]: override by the policy owner.
//! - [`ActionRequest::confirm_with_treasury_cap`]: override by the supply
//!   authority.
//!
//! Core principle: **authority is possession of a typed capability.**

mod capability;
mod config;
mod error;
mod policy;
mod request;
mod token;

pub use capability::{PolicyCap, Rule, RuleId};
pub use config::{ActionTemplate, PolicyTemplate, RuleRegistry};
pub use error::{Error, Result};
pub use policy::{SharedPolicy, TokenPolicy};
pub use request::{ActionRequest, ConfirmationPath, ConfirmedAction, Rejected, action};
pub use token::Token;
