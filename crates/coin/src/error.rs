//! Value primitive error types.

use crate::ObjectId;
use std::fmt;
use thiserror::Error;

/// Errors raised by balance and supply arithmetic.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// A split or withdrawal asked for more than the balance holds.
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    /// A balance had to be empty to be destroyed.
    #[error("balance is not zero: {0}")]
    NonZeroBalance(u64),

    /// Minting would overflow the total supply.
    #[error("supply overflow: cannot mint {amount} on top of {supply}")]
    SupplyOverflow { supply: u64, amount: u64 },

    /// Burning would take the supply below zero.
    #[error("supply underflow: cannot burn {amount} out of {supply}")]
    SupplyUnderflow { supply: u64, amount: u64 },

    /// Value minted by one treasury was handed to another.
    #[error("value minted by {origin} cannot be used with treasury {treasury}")]
    ForeignValue { treasury: ObjectId, origin: ObjectId },
}

pub type Result<T> = std::result::Result<T, Error>;

/// A value handed back by an operation that refused it.
///
/// Values that hold supply cannot be dropped, so a failed burn, join or
/// teardown returns the value next to the error instead of consuming it.
#[must_use = "a refused value still holds supply"]
pub struct Refused<V> {
    error: Error,
    value: V,
}

impl<V> Refused<V> {
    pub fn new(error: Error, value: V) -> Self {
        Self { error, value }
    }

    pub fn error(&self) -> &Error {
        &self.error
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub fn into_parts(self) -> (Error, V) {
        (self.error, self.value)
    }

    /// Rewrap the returned value, e.g. a balance back into its coin.
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> Refused<U> {
        Refused {
            error: self.error,
            value: f(self.value),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Refused<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refused")
            .field("error", &self.error)
            .field("value", &self.value)
            .finish()
    }
}

impl<V> fmt::Display for Refused<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value refused: {}", self.error)
    }
}
