//! Policy error types.

use crate::RuleId;
use coin::ObjectId;
use thiserror::Error;

/// Policy errors.
///
/// Every failure aborts the attempted operation with no state mutation.
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The action is not in the policy's rule map, so it is forbidden.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// A rule required for the action has not stamped the request.
    #[error("rule {rule} has not approved action {action}")]
    RuleNotApproved { action: String, rule: RuleId },

    /// The presented capability is not bound to the target object, or value
    /// minted by one treasury met another.
    #[error("capability {capability} is not bound to {target}")]
    NotAuthorized {
        capability: ObjectId,
        target: ObjectId,
    },

    /// A split or spend asked for more than the container holds.
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    /// Only empty containers can be destroyed.
    #[error("balance is not zero: {0}")]
    NonZeroBalance(u64),

    /// Minting would overflow the total supply.
    #[error("supply overflow: cannot mint {amount} on top of {supply}")]
    SupplyOverflow { supply: u64, amount: u64 },

    /// No configuration of the requested type exists for the rule.
    #[error("no configuration of the requested type for rule {0}")]
    ConfigMissing(RuleId),

    /// The rule already has a configuration attached.
    #[error("rule {0} already has a configuration")]
    ConfigExists(RuleId),

    /// The request was presented to a confirmation path that cannot take it.
    #[error("action {action} cannot be confirmed this way: {reason}")]
    InvalidConfirmationPath { action: String, reason: &'static str },

    /// Any other value primitive failure.
    #[error(transparent)]
    Value(coin::Error),

    /// A policy template names a rule that is not registered.
    #[error("unknown rule: {0}")]
    UnknownRule(String),

    /// Failed to parse a policy template.
    #[error("failed to parse policy template: {0}")]
    Parse(String),

    /// An I/O error occurred while reading a policy template.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<coin::Error> for Error {
    fn from(err: coin::Error) -> Self {
        match err {
            coin::Error::InsufficientBalance {
                requested,
                available,
            } => Error::InsufficientBalance {
                requested,
                available,
            },
            coin::Error::NonZeroBalance(value) => Error::NonZeroBalance(value),
            coin::Error::SupplyOverflow { supply, amount } => {
                Error::SupplyOverflow { supply, amount }
            }
            coin::Error::ForeignValue { treasury, origin } => Error::NotAuthorized {
                capability: treasury,
                target: origin,
            },
            other => Error::Value(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
