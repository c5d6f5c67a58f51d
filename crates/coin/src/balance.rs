//! Raw balances and the supply they are drawn from.

use crate::{Error, ObjectId, Refused, Result};
use std::fmt;
use std::marker::PhantomData;

/// An amount of value-kind `T` with no identity of its own.
///
/// Balances cannot be cloned. A non-zero balance only comes into existence
/// through [`Supply::increase`] and leaves it through [`Supply::decrease`],
/// so the sum of all balances of a kind always equals its supply. Each
/// non-zero balance remembers the treasury that minted it and can only be
/// merged with, or burned against, value from that same treasury.
///
/// # Panics
///
/// Dropping a non-zero balance panics: value is retired by burning it.
#[must_use = "a non-zero balance must be burned, joined or spent"]
pub struct Balance<T> {
    value: u64,
    origin: Option<ObjectId>,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Balance<T> {
    fn with(value: u64, origin: Option<ObjectId>) -> Self {
        Self {
            value,
            origin,
            _kind: PhantomData,
        }
    }

    /// An empty balance.
    pub fn zero() -> Self {
        Self::with(0, None)
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    /// The treasury that minted this value. `None` for an empty balance.
    pub fn origin(&self) -> Option<ObjectId> {
        if self.value == 0 { None } else { self.origin }
    }

    /// Merge `other` into this balance, returning the new value.
    ///
    /// Value from a different treasury is handed back.
    pub fn join(&mut self, mut other: Balance<T>) -> std::result::Result<u64, Refused<Balance<T>>> {
        if let (Some(mine), Some(theirs)) = (self.origin(), other.origin())
            && mine != theirs
        {
            let error = Error::ForeignValue {
                treasury: mine,
                origin: theirs,
            };
            return Err(Refused::new(error, other));
        }
        // Same treasury: the sum is bounded by its supply.
        self.origin = self.origin().or(other.origin());
        self.value += other.take();
        Ok(self.value)
    }

    /// Move `amount` out into a new balance.
    pub fn split(&mut self, amount: u64) -> Result<Balance<T>> {
        if amount > self.value {
            return Err(Error::InsufficientBalance {
                requested: amount,
                available: self.value,
            });
        }
        self.value -= amount;
        Ok(Self::with(amount, self.origin))
    }

    /// Move everything out, leaving this balance empty.
    pub fn withdraw_all(&mut self) -> Balance<T> {
        let origin = self.origin;
        Self::with(self.take(), origin)
    }

    /// Destroy an empty balance. A non-zero balance is handed back.
    pub fn destroy_zero(self) -> std::result::Result<(), Refused<Self>> {
        match self.value {
            0 => Ok(()),
            value => Err(Refused::new(Error::NonZeroBalance(value), self)),
        }
    }

    fn take(&mut self) -> u64 {
        std::mem::take(&mut self.value)
    }
}

impl<T> Default for Balance<T> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T> Drop for Balance<T> {
    fn drop(&mut self) {
        if self.value != 0 && !std::thread::panicking() {
            panic!(
                "balance of {} dropped without being burned or spent",
                self.value
            );
        }
    }
}

impl<T> fmt::Debug for Balance<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Balance").field(&self.value).finish()
    }
}

/// Outstanding supply of value-kind `T` minted by one treasury.
#[must_use]
pub struct Supply<T> {
    treasury: ObjectId,
    value: u64,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Supply<T> {
    pub(crate) fn new(treasury: ObjectId) -> Self {
        Self {
            treasury,
            value: 0,
            _kind: PhantomData,
        }
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    /// Whether `balance` was drawn from this supply (or is empty).
    pub fn owns(&self, balance: &Balance<T>) -> bool {
        balance.origin().is_none_or(|origin| origin == self.treasury)
    }

    /// Create `amount` of new value.
    pub fn increase(&mut self, amount: u64) -> Result<Balance<T>> {
        self.value = self
            .value
            .checked_add(amount)
            .ok_or(Error::SupplyOverflow {
                supply: self.value,
                amount,
            })?;
        Ok(Balance::with(amount, Some(self.treasury)))
    }

    /// Retire a balance, returning the amount removed from supply.
    ///
    /// Value minted elsewhere is handed back untouched.
    pub fn decrease(&mut self, mut balance: Balance<T>) -> std::result::Result<u64, Refused<Balance<T>>> {
        if let Some(origin) = balance.origin()
            && origin != self.treasury
        {
            let error = Error::ForeignValue {
                treasury: self.treasury,
                origin,
            };
            return Err(Refused::new(error, balance));
        }
        let Some(rest) = self.value.checked_sub(balance.value) else {
            let error = Error::SupplyUnderflow {
                supply: self.value,
                amount: balance.value,
            };
            return Err(Refused::new(error, balance));
        };
        self.value = rest;
        Ok(balance.take())
    }
}

impl<T> fmt::Debug for Supply<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Supply").field(&self.value).finish()
    }
}
