//! Action requests: the in-flight record of an attempted action.

use crate::{Error, PolicyCap, Rule, RuleId, Token};
use coin::{Address, Balance, ObjectId, TreasuryCap, TxContext};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Built-in action names.
pub mod action {
    /// Move a token to another account.
    pub const TRANSFER: &str = "transfer";
    /// Destroy a token, handing its balance to the policy for settlement.
    pub const SPEND: &str = "spend";
    /// Convert a token into an open-loop coin.
    pub const TO_COIN: &str = "to_coin";
    /// Convert an open-loop coin into a token.
    pub const FROM_COIN: &str = "from_coin";
}

/// Which terminal transition resolved a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfirmationPath {
    /// Rules satisfied, no balance involved.
    Plain,
    /// Rules satisfied, detached balance merged into the policy's spent balance.
    Settlement,
    /// Rule checks bypassed by the policy owner.
    PolicyCap,
    /// Rule checks bypassed by the supply authority.
    Treasury,
}

/// An attempted action waiting for confirmation.
///
/// Requests are single-use and cannot be discarded: the only ways to get rid
/// of one are [`TokenPolicy::confirm`](crate::TokenPolicy::confirm),
/// [`TokenPolicy::confirm_mut`](crate::TokenPolicy::confirm_mut),
/// [`confirm_with_policy_cap`](Self::confirm_with_policy_cap) and
/// [`confirm_with_treasury_cap`](Self::confirm_with_treasury_cap).
/// A failed confirmation hands the request back inside [`Rejected`].
///
/// # Panics
///
/// Dropping an unresolved request panics.
#[must_use = "an action request must be resolved through a confirmation path"]
pub struct ActionRequest<T> {
    name: String,
    amount: u64,
    sender: Address,
    recipient: Option<Address>,
    spent: Option<Balance<T>>,
    parcel: Option<Token<T>>,
    approvals: BTreeSet<RuleId>,
    resolved: bool,
}

impl<T> ActionRequest<T> {
    /// Create a request for a custom action.
    ///
    /// Pass `spent` only for actions that destroy value; such requests can
    /// then only be resolved by settlement or by the treasury.
    pub fn new(
        name: impl Into<String>,
        amount: u64,
        recipient: Option<Address>,
        spent: Option<Balance<T>>,
        ctx: &TxContext,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            sender: ctx.sender().clone(),
            recipient,
            spent,
            parcel: None,
            approvals: BTreeSet::new(),
            resolved: false,
        }
    }

    /// Seal a token inside the request; it is released on confirmation.
    pub(crate) fn with_parcel(mut self, token: Token<T>) -> Self {
        self.parcel = Some(token);
        self
    }

    pub fn action(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn sender(&self) -> &Address {
        &self.sender
    }

    pub fn recipient(&self) -> Option<&Address> {
        self.recipient.as_ref()
    }

    /// Value of the detached balance, if the action destroys value.
    pub fn spent(&self) -> Option<u64> {
        self.spent.as_ref().map(Balance::value)
    }

    /// The treasury that minted the value carried by this request, if any.
    pub fn origin(&self) -> Option<ObjectId> {
        let spent = self.spent.as_ref().and_then(Balance::origin);
        spent.or_else(|| self.parcel.as_ref().and_then(Token::origin))
    }

    pub fn approvals(&self) -> &BTreeSet<RuleId> {
        &self.approvals
    }

    pub fn is_approved_by<R: Rule>(&self) -> bool {
        self.approvals.contains(&RuleId::of::<R>())
    }

    /// Stamp the request with a rule's approval. Idempotent.
    pub fn add_approval<R: Rule>(&mut self, _rule: R) {
        self.approvals.insert(RuleId::of::<R>());
    }

    /// Confirm as the policy owner, bypassing rule checks.
    ///
    /// A policy cap cannot reduce supply, so requests carrying a detached
    /// balance are rejected.
    pub fn confirm_with_policy_cap(
        self,
        cap: &PolicyCap<T>,
    ) -> Result<ConfirmedAction<T>, Rejected<T>> {
        if self.spent.is_some() {
            let reason = "a policy cap cannot retire a spent balance";
            return Err(self.invalid_path(reason));
        }
        debug!(cap = %cap.id(), action = %self.name, amount = self.amount, "confirmed by policy cap");
        let (confirmed, _) = self.resolve(ConfirmationPath::PolicyCap);
        Ok(confirmed)
    }

    /// Confirm as the supply authority, bypassing rule checks.
    ///
    /// A detached balance, if any, is burned. Only the treasury that minted
    /// the carried value may do this.
    pub fn confirm_with_treasury_cap(
        mut self,
        treasury: &mut TreasuryCap<T>,
    ) -> Result<ConfirmedAction<T>, Rejected<T>> {
        if let Some(origin) = self.origin()
            && origin != treasury.id()
        {
            let error = Error::NotAuthorized {
                capability: treasury.id(),
                target: origin,
            };
            return Err(self.reject(error));
        }
        let burned = match self.spent.take().map(|balance| treasury.burn_balance(balance)) {
            None => 0,
            Some(Ok(amount)) => amount,
            Some(Err(refused)) => {
                let (error, balance) = refused.into_parts();
                self.spent = Some(balance);
                return Err(self.reject(error.into()));
            }
        };

        let (confirmed, _) = self.resolve(ConfirmationPath::Treasury);
        debug!(
            treasury = %treasury.id(),
            action = %confirmed.action,
            amount = confirmed.amount,
            burned,
            "confirmed by treasury"
        );
        Ok(confirmed)
    }

    pub(crate) fn has_spent(&self) -> bool {
        self.spent.is_some()
    }

    pub(crate) fn take_spent(&mut self) -> Option<Balance<T>> {
        self.spent.take()
    }

    pub(crate) fn restore_spent(&mut self, balance: Balance<T>) {
        self.spent = Some(balance);
    }

    pub(crate) fn reject(self, error: Error) -> Rejected<T> {
        Rejected {
            error,
            request: self,
        }
    }

    pub(crate) fn invalid_path(self, reason: &'static str) -> Rejected<T> {
        let error = Error::InvalidConfirmationPath {
            action: self.name.clone(),
            reason,
        };
        self.reject(error)
    }

    /// Terminal transition: consume the request, releasing its outcome and
    /// any detached balance for the caller to route.
    pub(crate) fn resolve(
        mut self,
        path: ConfirmationPath,
    ) -> (ConfirmedAction<T>, Option<Balance<T>>) {
        self.resolved = true;
        let confirmed = ConfirmedAction {
            action: std::mem::take(&mut self.name),
            amount: self.amount,
            sender: self.sender.clone(),
            recipient: self.recipient.take(),
            path,
            token: self.parcel.take(),
        };
        (confirmed, self.spent.take())
    }
}

impl<T> Drop for ActionRequest<T> {
    fn drop(&mut self) {
        if !self.resolved && !std::thread::panicking() {
            panic!(
                "action request `{}` from {} dropped without confirmation",
                self.name, self.sender
            );
        }
    }
}

impl<T> fmt::Debug for ActionRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRequest")
            .field("name", &self.name)
            .field("amount", &self.amount)
            .field("sender", &self.sender)
            .field("recipient", &self.recipient)
            .field("spent", &self.spent())
            .field("approvals", &self.approvals)
            .finish()
    }
}

/// A confirmation that failed, handing the request back.
///
/// The request is untouched: stamp the missing approvals and try again, or
/// resolve it through an override. Does not implement `std::error::Error`:
/// take the request out before propagating [`Rejected::error`].
#[must_use = "a rejected request still has to be resolved"]
pub struct Rejected<T> {
    error: Error,
    request: ActionRequest<T>,
}

impl<T> Rejected<T> {
    pub fn error(&self) -> &Error {
        &self.error
    }

    pub fn request(&self) -> &ActionRequest<T> {
        &self.request
    }

    pub fn into_request(self) -> ActionRequest<T> {
        self.request
    }

    pub fn into_parts(self) -> (Error, ActionRequest<T>) {
        (self.error, self.request)
    }
}

impl<T> fmt::Debug for Rejected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected")
            .field("error", &self.error)
            .field("request", &self.request)
            .finish()
    }
}

impl<T> fmt::Display for Rejected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request rejected: {}", self.error)
    }
}

/// The outcome of a confirmed action.
///
/// # Panics
///
/// A confirmed transfer carries its token; dropping the outcome before
/// [`take_token`](Self::take_token) or [`into_token`](Self::into_token)
/// panics.
#[must_use]
pub struct ConfirmedAction<T> {
    action: String,
    amount: u64,
    sender: Address,
    recipient: Option<Address>,
    path: ConfirmationPath,
    token: Option<Token<T>>,
}

impl<T> ConfirmedAction<T> {
    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn sender(&self) -> &Address {
        &self.sender
    }

    pub fn recipient(&self) -> Option<&Address> {
        self.recipient.as_ref()
    }

    pub fn path(&self) -> ConfirmationPath {
        self.path
    }

    /// `(action, amount, sender, recipient)`
    pub fn tuple(&self) -> (&str, u64, &Address, Option<&Address>) {
        (&self.action, self.amount, &self.sender, self.recipient.as_ref())
    }

    /// Take the token released by a confirmed transfer, for delivery to
    /// the recipient.
    pub fn take_token(&mut self) -> Option<Token<T>> {
        self.token.take()
    }

    pub fn into_token(self) -> Option<Token<T>> {
        self.token
    }
}

impl<T> fmt::Debug for ConfirmedAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfirmedAction")
            .field("action", &self.action)
            .field("amount", &self.amount)
            .field("sender", &self.sender)
            .field("recipient", &self.recipient)
            .field("path", &self.path)
            .field("token", &self.token)
            .finish()
    }
}
