//! Open-loop value: freely transferable, no policy attached.

use crate::{Balance, ObjectId, Refused, Result, TxContext};
use std::fmt;

/// A balance wrapped in an object identity.
#[must_use]
pub struct Coin<T> {
    id: ObjectId,
    balance: Balance<T>,
}

impl<T> Coin<T> {
    pub fn from_balance(balance: Balance<T>, ctx: &mut TxContext) -> Self {
        Self {
            id: ctx.fresh_id(),
            balance,
        }
    }

    pub(crate) fn from_parts(id: ObjectId, balance: Balance<T>) -> Self {
        Self { id, balance }
    }

    /// Unwrap the balance, retiring the coin's identity.
    pub fn into_balance(self) -> Balance<T> {
        self.balance
    }

    pub fn zero(ctx: &mut TxContext) -> Self {
        Self::from_balance(Balance::zero(), ctx)
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn value(&self) -> u64 {
        self.balance.value()
    }

    pub fn balance(&self) -> &Balance<T> {
        &self.balance
    }

    /// The treasury that minted this coin's value.
    pub fn origin(&self) -> Option<ObjectId> {
        self.balance.origin()
    }

    pub fn split(&mut self, amount: u64, ctx: &mut TxContext) -> Result<Coin<T>> {
        let balance = self.balance.split(amount)?;
        Ok(Self::from_balance(balance, ctx))
    }

    /// Merge `other` into this coin. A coin minted by another treasury is
    /// handed back.
    pub fn join(&mut self, other: Coin<T>) -> std::result::Result<(), Refused<Coin<T>>> {
        let id = other.id;
        self.balance
            .join(other.balance)
            .map(|_| ())
            .map_err(|refused| refused.map(|balance| Self::from_parts(id, balance)))
    }

    pub fn destroy_zero(self) -> std::result::Result<(), Refused<Coin<T>>> {
        let id = self.id;
        self.balance
            .destroy_zero()
            .map_err(|refused| refused.map(|balance| Self::from_parts(id, balance)))
    }
}

impl<T> fmt::Debug for Coin<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coin")
            .field("id", &self.id)
            .field("value", &self.value())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, TreasuryCap};

    struct Gem;

    #[test]
    fn test_split_and_join() {
        let mut ctx = TxContext::new("alice");
        let mut treasury = TreasuryCap::<Gem>::new(&mut ctx);
        let mut coin = treasury.mint(10, &mut ctx).unwrap();

        let part = coin.split(4, &mut ctx).unwrap();
        assert_ne!(part.id(), coin.id());
        assert_eq!((coin.value(), part.value()), (6, 4));

        coin.join(part).unwrap();
        assert_eq!(coin.value(), 10);
        assert_eq!(treasury.total_supply(), 10);
        treasury.burn(coin).unwrap();
    }

    #[test]
    fn test_destroy_zero_rejects_value() {
        let mut ctx = TxContext::new("alice");
        let mut treasury = TreasuryCap::<Gem>::new(&mut ctx);

        assert!(Coin::<Gem>::zero(&mut ctx).destroy_zero().is_ok());
        let coin = treasury.mint(3, &mut ctx).unwrap();
        let id = coin.id();
        let refused = coin.destroy_zero().unwrap_err();
        assert_eq!(refused.error(), &Error::NonZeroBalance(3));

        let coin = refused.into_value();
        assert_eq!(coin.id(), id);
        assert_eq!(treasury.burn(coin).unwrap(), 3);
    }

    #[test]
    fn test_join_refuses_coin_from_other_treasury() {
        let mut ctx = TxContext::new("alice");
        let mut gold = TreasuryCap::<Gem>::new(&mut ctx);
        let mut fake = TreasuryCap::<Gem>::new(&mut ctx);

        let mut coin = gold.mint(10, &mut ctx).unwrap();
        let forged = fake.mint(90, &mut ctx).unwrap();
        let refused = coin.join(forged).unwrap_err();
        assert!(matches!(refused.error(), Error::ForeignValue { .. }));
        assert_eq!(coin.value(), 10);

        assert_eq!(fake.burn(refused.into_value()).unwrap(), 90);
        assert_eq!(gold.burn(coin).unwrap(), 10);
    }
}
