//! The supply authority of a value-kind.

use crate::{Balance, Coin, ObjectId, Refused, Result, Supply, TxContext};
use std::fmt;
use tracing::{debug, warn};

/// Sole holder of mint and burn rights for value-kind `T`.
///
/// Not `Clone`: whoever holds the cap controls the supply. Several
/// treasuries of one kind may exist, but each only accepts back the value it
/// minted itself.
#[must_use]
pub struct TreasuryCap<T> {
    id: ObjectId,
    supply: Supply<T>,
}

impl<T> TreasuryCap<T> {
    /// Create the supply authority for a new value-kind, with zero supply.
    pub fn new(ctx: &mut TxContext) -> Self {
        let id = ctx.fresh_id();
        Self {
            id,
            supply: Supply::new(id),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Total outstanding supply.
    pub fn total_supply(&self) -> u64 {
        self.supply.value()
    }

    /// Whether `balance` was minted here (or is empty).
    pub fn owns(&self, balance: &Balance<T>) -> bool {
        self.supply.owns(balance)
    }

    /// Mint a raw balance.
    pub fn mint_balance(&mut self, amount: u64) -> Result<Balance<T>> {
        let balance = self.supply.increase(amount)?;
        debug!(treasury = %self.id, amount, supply = self.supply.value(), "minted");
        Ok(balance)
    }

    /// Burn a raw balance, returning the amount retired. A balance minted
    /// by another treasury is handed back.
    pub fn burn_balance(&mut self, balance: Balance<T>) -> std::result::Result<u64, Refused<Balance<T>>> {
        match self.supply.decrease(balance) {
            Ok(amount) => {
                debug!(treasury = %self.id, amount, supply = self.supply.value(), "burned");
                Ok(amount)
            }
            Err(refused) => {
                warn!(treasury = %self.id, error = %refused.error(), "burn refused");
                Err(refused)
            }
        }
    }

    /// Mint an open-loop coin.
    pub fn mint(&mut self, amount: u64, ctx: &mut TxContext) -> Result<Coin<T>> {
        let balance = self.mint_balance(amount)?;
        Ok(Coin::from_balance(balance, ctx))
    }

    /// Burn an open-loop coin.
    pub fn burn(&mut self, coin: Coin<T>) -> std::result::Result<u64, Refused<Coin<T>>> {
        let id = coin.id();
        self.burn_balance(coin.into_balance())
            .map_err(|refused| refused.map(|balance| Coin::from_parts(id, balance)))
    }
}

impl<T> fmt::Debug for TreasuryCap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreasuryCap")
            .field("id", &self.id)
            .field("total_supply", &self.supply.value())
            .finish()
    }
}
