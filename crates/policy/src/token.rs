//! Closed-loop tokens and their action entry points.

use crate::request::action;
use crate::{ActionRequest, Result};
use coin::{Balance, Coin, ObjectId, Refused, TreasuryCap, TxContext};
use std::fmt;

/// A policy-gated value container.
///
/// Splitting, joining and destroying an empty token are free. Anything
/// that moves value out of its owner's hands goes through an
/// [`ActionRequest`] that a [`TokenPolicy`](crate::TokenPolicy) has to
/// confirm.
///
/// # Panics
///
/// Dropping a non-zero token panics. Value leaves circulation only by
/// [`burn`](Self::burn) or [`spend`](Self::spend).
#[must_use = "a non-zero token must be burned or spent"]
pub struct Token<T> {
    id: ObjectId,
    balance: Balance<T>,
}

impl<T> Token<T> {
    fn from_balance(balance: Balance<T>, ctx: &mut TxContext) -> Self {
        Self {
            id: ctx.fresh_id(),
            balance,
        }
    }

    fn rewrap(id: ObjectId) -> impl FnOnce(Balance<T>) -> Self {
        move |balance| Self { id, balance }
    }

    /// Mint a new token. Requires the supply authority.
    pub fn mint(treasury: &mut TreasuryCap<T>, amount: u64, ctx: &mut TxContext) -> Result<Self> {
        let balance = treasury.mint_balance(amount)?;
        Ok(Self::from_balance(balance, ctx))
    }

    /// Burn a token. Requires the treasury that minted it; any other
    /// treasury hands the token back.
    pub fn burn(
        treasury: &mut TreasuryCap<T>,
        token: Token<T>,
    ) -> std::result::Result<u64, Refused<Token<T>>> {
        let id = token.id;
        treasury
            .burn_balance(token.balance)
            .map_err(|refused| refused.map(Self::rewrap(id)))
    }

    pub fn zero(ctx: &mut TxContext) -> Self {
        Self::from_balance(Balance::zero(), ctx)
    }

    /// Destroy an empty token. A non-zero token is handed back.
    pub fn destroy_zero(self) -> std::result::Result<(), Refused<Token<T>>> {
        let id = self.id;
        self.balance
            .destroy_zero()
            .map_err(|refused| refused.map(Self::rewrap(id)))
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn value(&self) -> u64 {
        self.balance.value()
    }

    /// The treasury that minted this token's value. `None` when empty.
    pub fn origin(&self) -> Option<ObjectId> {
        self.balance.origin()
    }

    /// Split `amount` off into a new token; the source is untouched on failure.
    pub fn split(&mut self, amount: u64, ctx: &mut TxContext) -> Result<Token<T>> {
        let balance = self.balance.split(amount)?;
        Ok(Self::from_balance(balance, ctx))
    }

    /// Merge `other` into this token, retiring its identity. A token minted
    /// by another treasury is handed back.
    pub fn join(&mut self, other: Token<T>) -> std::result::Result<(), Refused<Token<T>>> {
        let id = other.id;
        self.balance
            .join(other.balance)
            .map(|_| ())
            .map_err(|refused| refused.map(Self::rewrap(id)))
    }

    /// Request a transfer to `recipient`.
    ///
    /// The token travels sealed inside the request and is handed back by the
    /// confirmation ([`ConfirmedAction::take_token`](crate::ConfirmedAction::take_token)).
    pub fn transfer(self, recipient: impl Into<coin::Address>, ctx: &TxContext) -> ActionRequest<T> {
        let amount = self.value();
        ActionRequest::new(action::TRANSFER, amount, Some(recipient.into()), None, ctx)
            .with_parcel(self)
    }

    /// Request to spend the token. The token is destroyed and its balance
    /// detached into the request for settlement.
    pub fn spend(self, ctx: &TxContext) -> ActionRequest<T> {
        let amount = self.value();
        ActionRequest::new(action::SPEND, amount, None, Some(self.balance), ctx)
    }

    /// Convert the token into an open-loop coin.
    pub fn to_coin(self, ctx: &mut TxContext) -> (Coin<T>, ActionRequest<T>) {
        let amount = self.value();
        let request = ActionRequest::new(action::TO_COIN, amount, None, None, ctx);
        (Coin::from_balance(self.balance, ctx), request)
    }

    /// Convert an open-loop coin into a token.
    pub fn from_coin(coin: Coin<T>, ctx: &mut TxContext) -> (Token<T>, ActionRequest<T>) {
        let amount = coin.value();
        let request = ActionRequest::new(action::FROM_COIN, amount, None, None, ctx);
        (Self::from_balance(coin.into_balance(), ctx), request)
    }
}

impl<T> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("id", &self.id)
            .field("value", &self.value())
            .finish()
    }
}
