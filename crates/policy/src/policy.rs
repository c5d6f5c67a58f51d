//! Token policy: allowed actions, required rules, rule configuration and
//! the spent balance awaiting retirement.

use crate::request::ConfirmationPath;
use crate::{ActionRequest, ConfirmedAction, Error, PolicyCap, Rejected, Result, Rule, RuleId};
use coin::{Balance, ObjectId, TreasuryCap, TxContext};
use events::EventKind;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info, warn};

type RuleConfig = Box<dyn Any + Send + Sync>;

/// Per value-kind record of which actions are allowed and which rules each
/// one requires.
///
/// An action mapped to an empty rule set is allowed unconditionally; an
/// action that is not mapped at all is forbidden.
///
/// # Panics
///
/// The spent balance is still part of the supply, so dropping a policy
/// before it has been [flushed](Self::flush) panics.
pub struct TokenPolicy<T> {
    id: ObjectId,
    treasury_id: ObjectId,
    spent: Balance<T>,
    rules: BTreeMap<String, BTreeSet<RuleId>>,
    configs: HashMap<RuleId, RuleConfig>,
}

impl<T> TokenPolicy<T> {
    /// Create a policy for the kind controlled by `treasury`, together with
    /// the cap that administers it.
    pub fn new(treasury: &TreasuryCap<T>, ctx: &mut TxContext) -> (Self, PolicyCap<T>) {
        let id = ctx.fresh_id();
        let policy = Self {
            id,
            treasury_id: treasury.id(),
            spent: Balance::zero(),
            rules: BTreeMap::new(),
            configs: HashMap::new(),
        };
        let cap = PolicyCap {
            id: ctx.fresh_id(),
            policy_id: id,
            _kind: PhantomData,
        };
        (policy, cap)
    }

    /// Publish the policy as a long-lived shared object.
    pub fn share(self, ctx: &mut TxContext) -> SharedPolicy<T> {
        let token_kind = std::any::type_name::<T>();
        ctx.emit(EventKind::PolicyCreated {
            policy_id: self.id.as_uuid(),
            token_kind: token_kind.to_string(),
        });
        info!(policy_id = %self.id, token_kind, "policy published");
        SharedPolicy {
            id: self.id,
            inner: Arc::new(RwLock::new(self)),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Check that `cap` administers this policy.
    pub fn authorize(&self, cap: &PolicyCap<T>) -> Result<()> {
        if cap.policy_id != self.id {
            return Err(Error::NotAuthorized {
                capability: cap.id,
                target: self.id,
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    /// Allow `action` with no rule requirements. Keeps existing rules if the
    /// action is already allowed.
    pub fn allow(&mut self, cap: &PolicyCap<T>, action: impl Into<String>) -> Result<()> {
        self.authorize(cap)?;
        let action = action.into();
        debug!(policy_id = %self.id, action = %action, "action allowed");
        self.rules.entry(action).or_default();
        Ok(())
    }

    /// Forbid `action`, dropping its rule requirements.
    pub fn disallow(&mut self, cap: &PolicyCap<T>, action: &str) -> Result<()> {
        self.authorize(cap)?;
        debug!(policy_id = %self.id, action, "action disallowed");
        self.rules.remove(action);
        Ok(())
    }

    /// Require rule `R` for `action`, allowing the action if needed.
    pub fn require_rule<R: Rule>(&mut self, cap: &PolicyCap<T>, action: impl Into<String>) -> Result<()> {
        self.require_rule_id(cap, action, RuleId::of::<R>())
    }

    /// Require the rule identified by `rule` for `action`.
    pub fn require_rule_id(
        &mut self,
        cap: &PolicyCap<T>,
        action: impl Into<String>,
        rule: RuleId,
    ) -> Result<()> {
        self.authorize(cap)?;
        let action = action.into();
        debug!(policy_id = %self.id, action = %action, rule = %rule, "rule required");
        self.rules.entry(action).or_default().insert(rule);
        Ok(())
    }

    /// Stop requiring rule `R` for `action`. The action stays allowed even if
    /// no rules remain.
    pub fn drop_rule<R: Rule>(&mut self, cap: &PolicyCap<T>, action: &str) -> Result<()> {
        self.drop_rule_id(cap, action, &RuleId::of::<R>())
    }

    pub fn drop_rule_id(&mut self, cap: &PolicyCap<T>, action: &str, rule: &RuleId) -> Result<()> {
        self.authorize(cap)?;
        if let Some(rules) = self.rules.get_mut(action) {
            rules.remove(rule);
            debug!(policy_id = %self.id, action, rule = %rule, "rule dropped");
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rule configuration
    // ------------------------------------------------------------------

    /// Attach a configuration to rule `R`. Needs both the rule's witness and
    /// the policy cap.
    pub fn add_rule_config<R, C>(&mut self, _rule: R, cap: &PolicyCap<T>, config: C) -> Result<()>
    where
        R: Rule,
        C: Any + Send + Sync,
    {
        self.authorize(cap)?;
        let rule = RuleId::of::<R>();
        if self.configs.contains_key(&rule) {
            return Err(Error::ConfigExists(rule));
        }
        debug!(policy_id = %self.id, rule = %rule, "rule config added");
        self.configs.insert(rule, Box::new(config));
        Ok(())
    }

    /// Read rule `R`'s configuration.
    pub fn rule_config<R, C>(&self, _rule: R) -> Result<&C>
    where
        R: Rule,
        C: Any + Send + Sync,
    {
        let rule = RuleId::of::<R>();
        match self.configs.get(&rule).and_then(|config| config.downcast_ref::<C>()) {
            Some(config) => Ok(config),
            None => Err(Error::ConfigMissing(rule)),
        }
    }

    /// Modify rule `R`'s configuration, e.g. a counter kept by the rule.
    pub fn rule_config_mut<R, C>(&mut self, _rule: R) -> Result<&mut C>
    where
        R: Rule,
        C: Any + Send + Sync,
    {
        let rule = RuleId::of::<R>();
        match self.configs.get_mut(&rule).and_then(|config| config.downcast_mut::<C>()) {
            Some(config) => Ok(config),
            None => Err(Error::ConfigMissing(rule)),
        }
    }

    /// Detach rule `R`'s configuration and hand it back. Needs both the
    /// rule's witness and the policy cap.
    pub fn remove_rule_config<R, C>(&mut self, _rule: R, cap: &PolicyCap<T>) -> Result<C>
    where
        R: Rule,
        C: Any + Send + Sync,
    {
        self.authorize(cap)?;
        let rule = RuleId::of::<R>();
        let Some(config) = self.configs.remove(&rule) else {
            return Err(Error::ConfigMissing(rule));
        };
        match config.downcast::<C>() {
            Ok(config) => {
                debug!(policy_id = %self.id, rule = %rule, "rule config removed");
                Ok(*config)
            }
            Err(config) => {
                // Wrong type requested: put it back untouched.
                self.configs.insert(rule.clone(), config);
                Err(Error::ConfigMissing(rule))
            }
        }
    }

    pub fn has_rule_config<R: Rule>(&self) -> bool {
        self.configs.contains_key(&RuleId::of::<R>())
    }

    pub fn has_rule_config_with_type<R: Rule, C: Any + Send + Sync>(&self) -> bool {
        self.configs
            .get(&RuleId::of::<R>())
            .is_some_and(|config| config.is::<C>())
    }

    // ------------------------------------------------------------------
    // Confirmation
    // ------------------------------------------------------------------

    /// Confirm a request that carries no balance.
    pub fn confirm(&self, request: ActionRequest<T>) -> std::result::Result<ConfirmedAction<T>, Rejected<T>> {
        if !self.rules.contains_key(request.action()) {
            return Err(self.rejected(request, |r| Error::UnknownAction(r.action().to_string())));
        }
        if request.has_spent() {
            warn!(policy_id = %self.id, action = request.action(), "spent balance on plain path");
            return Err(request.invalid_path("a spent balance must be settled with confirm_mut"));
        }
        if let Err(err) = self.check_origin(&request).and_then(|()| self.check_rules(&request)) {
            return Err(self.rejected(request, |_| err));
        }

        let (confirmed, _) = request.resolve(ConfirmationPath::Plain);
        debug!(
            policy_id = %self.id,
            action = confirmed.action(),
            amount = confirmed.amount(),
            "request confirmed"
        );
        Ok(confirmed)
    }

    /// Confirm a request that carries a detached balance, merging the
    /// balance into the policy's spent balance.
    ///
    /// The balance must have been minted by the treasury this policy was
    /// created for.
    pub fn confirm_mut(
        &mut self,
        mut request: ActionRequest<T>,
    ) -> std::result::Result<ConfirmedAction<T>, Rejected<T>> {
        if !request.has_spent() {
            warn!(policy_id = %self.id, action = request.action(), "no spent balance to settle");
            return Err(request.invalid_path("only requests with a spent balance can be settled"));
        }
        if !self.rules.contains_key(request.action()) {
            return Err(self.rejected(request, |r| Error::UnknownAction(r.action().to_string())));
        }
        if let Err(err) = self.check_origin(&request).and_then(|()| self.check_rules(&request)) {
            return Err(self.rejected(request, |_| err));
        }

        if let Some(balance) = request.take_spent()
            && let Err(refused) = self.spent.join(balance)
        {
            let (error, balance) = refused.into_parts();
            request.restore_spent(balance);
            return Err(self.rejected(request, |_| error.into()));
        }
        let (confirmed, _) = request.resolve(ConfirmationPath::Settlement);
        debug!(
            policy_id = %self.id,
            action = confirmed.action(),
            amount = confirmed.amount(),
            spent_total = self.spent.value(),
            "request settled"
        );
        Ok(confirmed)
    }

    /// Value carried by the request must come from this policy's treasury.
    fn check_origin(&self, request: &ActionRequest<T>) -> Result<()> {
        match request.origin() {
            Some(origin) if origin != self.treasury_id => Err(Error::NotAuthorized {
                capability: origin,
                target: self.id,
            }),
            _ => Ok(()),
        }
    }

    fn check_rules(&self, request: &ActionRequest<T>) -> Result<()> {
        let Some(required) = self.rules.get(request.action()) else {
            return Err(Error::UnknownAction(request.action().to_string()));
        };
        match required.difference(request.approvals()).next() {
            Some(missing) => Err(Error::RuleNotApproved {
                action: request.action().to_string(),
                rule: missing.clone(),
            }),
            None => Ok(()),
        }
    }

    fn rejected(
        &self,
        request: ActionRequest<T>,
        error: impl FnOnce(&ActionRequest<T>) -> Error,
    ) -> Rejected<T> {
        let error = error(&request);
        warn!(policy_id = %self.id, action = request.action(), error = %error, "request rejected");
        request.reject(error)
    }

    // ------------------------------------------------------------------
    // Settlement
    // ------------------------------------------------------------------

    /// Burn the whole spent balance against the treasury. Returns the
    /// amount retired; zero when there was nothing to flush.
    pub fn flush(&mut self, treasury: &mut TreasuryCap<T>, ctx: &mut TxContext) -> Result<u64> {
        if treasury.id() != self.treasury_id {
            return Err(Error::NotAuthorized {
                capability: treasury.id(),
                target: self.id,
            });
        }
        if self.spent.value() == 0 {
            return Ok(0);
        }

        let amount = match treasury.burn_balance(self.spent.withdraw_all()) {
            Ok(amount) => amount,
            Err(refused) => {
                let (error, balance) = refused.into_parts();
                self.spent = balance;
                return Err(error.into());
            }
        };
        ctx.emit(EventKind::SpentFlushed {
            policy_id: self.id.as_uuid(),
            amount,
        });
        info!(policy_id = %self.id, amount, supply = treasury.total_supply(), "spent balance flushed");
        Ok(amount)
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    pub fn is_allowed(&self, action: &str) -> bool {
        self.rules.contains_key(action)
    }

    /// Rules required for `action`; empty when the action is unconditionally
    /// allowed or not allowed at all.
    pub fn required_rules(&self, action: &str) -> BTreeSet<RuleId> {
        self.rules.get(action).cloned().unwrap_or_default()
    }

    pub fn has_rule_for_action<R: Rule>(&self, action: &str) -> bool {
        self.rules
            .get(action)
            .is_some_and(|rules| rules.contains(&RuleId::of::<R>()))
    }

    /// Every allowed action with its required rules.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &BTreeSet<RuleId>)> {
        self.rules.iter().map(|(action, rules)| (action.as_str(), rules))
    }

    /// Balance spent and settled but not yet flushed.
    pub fn spent_total(&self) -> u64 {
        self.spent.value()
    }
}

impl<T> fmt::Debug for TokenPolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPolicy")
            .field("id", &self.id)
            .field("spent", &self.spent.value())
            .field("rules", &self.rules)
            .field("configs", &self.configs.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A published policy.
///
/// Mutation (administration, settlement, flush, stateful rules) takes the
/// write lock; plain confirmations only need the read lock and may run
/// concurrently.
pub struct SharedPolicy<T> {
    id: ObjectId,
    inner: Arc<RwLock<TokenPolicy<T>>>,
}

impl<T> SharedPolicy<T> {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn read(&self) -> RwLockReadGuard<'_, TokenPolicy<T>> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, TokenPolicy<T>> {
        self.inner.write()
    }
}

impl<T> Clone for SharedPolicy<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for SharedPolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedPolicy").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::action;
    use crate::Token;
    use coin::Address;

    struct Gem;

    struct Kyc {
        _private: (),
    }
    impl Rule for Kyc {}

    struct Limit;
    impl Rule for Limit {}

    #[derive(Debug, PartialEq)]
    struct Counter(u64);

    fn setup() -> (TxContext, TreasuryCap<Gem>, TokenPolicy<Gem>, PolicyCap<Gem>) {
        let mut ctx = TxContext::new("alice");
        let treasury = TreasuryCap::new(&mut ctx);
        let (policy, cap) = TokenPolicy::new(&treasury, &mut ctx);
        (ctx, treasury, policy, cap)
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let (mut ctx, mut treasury, policy, _cap) = setup();
        let token = Token::mint(&mut treasury, 10, &mut ctx).unwrap();

        let rejected = policy.confirm(token.transfer("bob", &ctx)).unwrap_err();
        assert!(matches!(rejected.error(), Error::UnknownAction(a) if a == "transfer"));

        let mut confirmed = rejected
            .into_request()
            .confirm_with_treasury_cap(&mut treasury)
            .unwrap();
        let token = confirmed.take_token().unwrap();
        assert_eq!(token.value(), 10);
        Token::burn(&mut treasury, token).unwrap();
    }

    #[test]
    fn test_transfer_requires_every_rule() {
        let (mut ctx, mut treasury, mut policy, cap) = setup();
        policy.require_rule::<Kyc>(&cap, action::TRANSFER).unwrap();
        policy.require_rule::<Limit>(&cap, action::TRANSFER).unwrap();

        let token = Token::mint(&mut treasury, 100, &mut ctx).unwrap();
        let mut request = token.transfer("bob", &ctx);
        request.add_approval(Kyc { _private: () });

        let rejected = policy.confirm(request).unwrap_err();
        match rejected.error() {
            Error::RuleNotApproved { action, rule } => {
                assert_eq!(action, "transfer");
                assert_eq!(*rule, RuleId::of::<Limit>());
            }
            other => panic!("unexpected error: {other}"),
        }

        let mut request = rejected.into_request();
        request.add_approval(Limit);
        let mut confirmed = policy.confirm(request).unwrap();
        assert_eq!(
            confirmed.tuple(),
            ("transfer", 100, &Address::from("alice"), Some(&Address::from("bob")))
        );
        assert_eq!(confirmed.path(), ConfirmationPath::Plain);
        let token = confirmed.take_token().unwrap();
        assert_eq!(token.value(), 100);
        Token::burn(&mut treasury, token).unwrap();
    }

    #[test]
    fn test_spend_goes_through_settlement() {
        let (mut ctx, mut treasury, mut policy, cap) = setup();
        policy.allow(&cap, action::SPEND).unwrap();
        let token = Token::mint(&mut treasury, 40, &mut ctx).unwrap();

        let rejected = policy.confirm(token.spend(&ctx)).unwrap_err();
        assert!(matches!(
            rejected.error(),
            Error::InvalidConfirmationPath { .. }
        ));

        let confirmed = policy.confirm_mut(rejected.into_request()).unwrap();
        assert_eq!(confirmed.path(), ConfirmationPath::Settlement);
        assert_eq!(policy.spent_total(), 40);
        assert_eq!(treasury.total_supply(), 40);

        assert_eq!(policy.flush(&mut treasury, &mut ctx).unwrap(), 40);
        assert_eq!(policy.spent_total(), 0);
        assert_eq!(treasury.total_supply(), 0);
        assert_eq!(policy.flush(&mut treasury, &mut ctx).unwrap(), 0);

        let flushed: Vec<_> = ctx
            .events()
            .iter()
            .filter(|e| e.kind.name() == "spent_flushed")
            .collect();
        assert_eq!(flushed.len(), 1);
    }

    #[test]
    fn test_settlement_rejects_balance_free_requests() {
        let (mut ctx, mut treasury, mut policy, cap) = setup();
        policy.allow(&cap, action::TRANSFER).unwrap();
        let token = Token::mint(&mut treasury, 3, &mut ctx).unwrap();

        let rejected = policy.confirm_mut(token.transfer("bob", &ctx)).unwrap_err();
        assert!(matches!(
            rejected.error(),
            Error::InvalidConfirmationPath { .. }
        ));
        let token = policy
            .confirm(rejected.into_request())
            .unwrap()
            .into_token()
            .unwrap();
        Token::burn(&mut treasury, token).unwrap();
    }

    #[test]
    fn test_failed_settlement_leaves_spent_untouched() {
        let (mut ctx, mut treasury, mut policy, cap) = setup();
        policy.require_rule::<Limit>(&cap, action::SPEND).unwrap();
        let token = Token::mint(&mut treasury, 9, &mut ctx).unwrap();

        let rejected = policy.confirm_mut(token.spend(&ctx)).unwrap_err();
        assert!(matches!(rejected.error(), Error::RuleNotApproved { .. }));
        assert_eq!(policy.spent_total(), 0);

        let request = rejected.into_request();
        assert_eq!(request.spent(), Some(9));
        let _ = request.confirm_with_treasury_cap(&mut treasury).unwrap();
        assert_eq!(treasury.total_supply(), 0);
    }

    #[test]
    fn test_settlement_rejects_value_from_another_treasury() {
        let (mut ctx, mut treasury, mut policy, cap) = setup();
        let mut other = TreasuryCap::<Gem>::new(&mut ctx);
        policy.allow(&cap, action::SPEND).unwrap();

        let ours = Token::mint(&mut treasury, 5, &mut ctx).unwrap();
        let _ = policy.confirm_mut(ours.spend(&ctx)).unwrap();
        let theirs = Token::mint(&mut other, 100, &mut ctx).unwrap();

        let rejected = policy.confirm_mut(theirs.spend(&ctx)).unwrap_err();
        assert!(matches!(
            rejected.error(),
            Error::NotAuthorized { capability, .. } if *capability == other.id()
        ));
        assert_eq!(policy.spent_total(), 5);

        // The foreign treasury can still retire its own value.
        let request = rejected.into_request();
        assert_eq!(request.spent(), Some(100));
        let _ = request.confirm_with_treasury_cap(&mut other).unwrap();
        assert_eq!(other.total_supply(), 0);

        assert_eq!(policy.flush(&mut treasury, &mut ctx).unwrap(), 5);
        assert_eq!(treasury.total_supply(), 0);
    }

    #[test]
    fn test_plain_confirmation_rejects_value_from_another_treasury() {
        let (mut ctx, mut treasury, mut policy, cap) = setup();
        let mut other = TreasuryCap::<Gem>::new(&mut ctx);
        policy.allow(&cap, action::TRANSFER).unwrap();
        let theirs = Token::mint(&mut other, 8, &mut ctx).unwrap();

        let rejected = policy.confirm(theirs.transfer("bob", &ctx)).unwrap_err();
        assert!(matches!(rejected.error(), Error::NotAuthorized { .. }));

        let token = rejected
            .into_request()
            .confirm_with_treasury_cap(&mut other)
            .unwrap()
            .into_token()
            .unwrap();
        Token::burn(&mut other, token).unwrap();
        assert_eq!(treasury.total_supply(), 0);
    }

    #[test]
    fn test_flush_keeps_every_treasury_whole() {
        let (mut ctx, mut treasury, mut policy, cap) = setup();
        let mut other = TreasuryCap::<Gem>::new(&mut ctx);
        let (mut other_policy, other_cap) = TokenPolicy::new(&other, &mut ctx);
        policy.allow(&cap, action::SPEND).unwrap();
        other_policy.allow(&other_cap, action::SPEND).unwrap();

        let ours = Token::mint(&mut treasury, 30, &mut ctx).unwrap();
        let theirs = Token::mint(&mut other, 12, &mut ctx).unwrap();
        let _ = policy.confirm_mut(ours.spend(&ctx)).unwrap();
        let _ = other_policy.confirm_mut(theirs.spend(&ctx)).unwrap();

        assert!(matches!(
            policy.flush(&mut other, &mut ctx),
            Err(Error::NotAuthorized { .. })
        ));
        assert_eq!((policy.spent_total(), other.total_supply()), (30, 12));

        assert_eq!(policy.flush(&mut treasury, &mut ctx).unwrap(), 30);
        assert_eq!(other_policy.flush(&mut other, &mut ctx).unwrap(), 12);
        assert_eq!((treasury.total_supply(), other.total_supply()), (0, 0));
    }

    #[test]
    fn test_administration_semantics() {
        let (_ctx, _treasury, mut policy, cap) = setup();
        assert!(!policy.is_allowed("transfer"));

        policy.allow(&cap, "transfer").unwrap();
        policy.allow(&cap, "transfer").unwrap();
        assert!(policy.is_allowed("transfer"));
        assert!(policy.required_rules("transfer").is_empty());

        policy.require_rule::<Kyc>(&cap, "spend").unwrap();
        assert!(policy.is_allowed("spend"));
        assert!(policy.has_rule_for_action::<Kyc>("spend"));

        policy.drop_rule::<Kyc>(&cap, "spend").unwrap();
        assert!(policy.is_allowed("spend"));
        assert!(policy.required_rules("spend").is_empty());

        policy.disallow(&cap, "spend").unwrap();
        assert!(!policy.is_allowed("spend"));
        assert_eq!(policy.rules().count(), 1);
    }

    #[test]
    fn test_foreign_cap_is_not_authorized() {
        let (mut ctx, treasury, mut policy, _cap) = setup();
        let (_other, other_cap) = TokenPolicy::new(&treasury, &mut ctx);

        let err = policy.allow(&other_cap, "transfer").unwrap_err();
        assert!(matches!(err, Error::NotAuthorized { .. }));
        assert!(!policy.is_allowed("transfer"));
    }

    #[test]
    fn test_flush_requires_matching_treasury() {
        let (mut ctx, _treasury, mut policy, _cap) = setup();
        let mut other = TreasuryCap::<Gem>::new(&mut ctx);

        assert!(matches!(
            policy.flush(&mut other, &mut ctx),
            Err(Error::NotAuthorized { .. })
        ));
    }

    #[test]
    fn test_rule_config_lifecycle() {
        let (_ctx, _treasury, mut policy, cap) = setup();
        assert!(!policy.has_rule_config::<Limit>());
        assert!(matches!(
            policy.rule_config::<Limit, Counter>(Limit),
            Err(Error::ConfigMissing(_))
        ));

        policy.add_rule_config(Limit, &cap, Counter(0)).unwrap();
        assert!(matches!(
            policy.add_rule_config(Limit, &cap, Counter(5)),
            Err(Error::ConfigExists(_))
        ));
        assert!(policy.has_rule_config_with_type::<Limit, Counter>());
        assert!(!policy.has_rule_config_with_type::<Limit, String>());

        policy.rule_config_mut::<Limit, Counter>(Limit).unwrap().0 += 3;
        assert_eq!(policy.rule_config::<Limit, Counter>(Limit).unwrap(), &Counter(3));

        // Wrong type: reported missing, config stays.
        assert!(matches!(
            policy.rule_config::<Limit, String>(Limit),
            Err(Error::ConfigMissing(_))
        ));
        assert!(matches!(
            policy.remove_rule_config::<Limit, String>(Limit, &cap),
            Err(Error::ConfigMissing(_))
        ));
        assert!(policy.has_rule_config::<Limit>());

        let removed: Counter = policy.remove_rule_config::<Limit, Counter>(Limit, &cap).unwrap();
        assert_eq!(removed, Counter(3));
        assert!(!policy.has_rule_config::<Limit>());
    }

    #[test]
    fn test_share_emits_policy_created() {
        let (mut ctx, _treasury, policy, _cap) = setup();
        let policy_id = policy.id();

        let shared = policy.share(&mut ctx);
        assert_eq!(shared.id(), policy_id);
        assert_eq!(shared.read().id(), policy_id);

        let events = ctx.take_events();
        assert_eq!(events.len(), 1);
        match &events[0].kind {
            EventKind::PolicyCreated {
                policy_id: id,
                token_kind,
            } => {
                assert_eq!(*id, policy_id.as_uuid());
                assert!(token_kind.ends_with("Gem"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
