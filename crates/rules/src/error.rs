//! Rule error types.

use coin::Address;
use thiserror::Error;

/// Why a stock rule refused to stamp a request.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Sender or recipient is missing from the allow-list.
    #[error("address {0} is not on the allow-list")]
    AddressNotAllowed(Address),

    /// Sender or recipient is on the deny-list.
    #[error("address {0} is on the deny-list")]
    AddressDenied(Address),

    /// The request amount is above the action's limit.
    #[error("action {action} is limited to {limit}, requested {amount}")]
    LimitExceeded {
        action: String,
        amount: u64,
        limit: u64,
    },

    /// The sender has used up its quota.
    #[error("quota exceeded for {sender}: requested {requested}, remaining {remaining}")]
    QuotaExceeded {
        sender: Address,
        requested: u64,
        remaining: u64,
    },

    #[error(transparent)]
    Policy(#[from] policy::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
