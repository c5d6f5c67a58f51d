//! Per-sender cumulative quota.
//!
//! Unlike the other stock rules, the quota keeps state: every stamped
//! request is counted against its sender, so `verify` needs the policy
//! mutably (take the write lock on a shared policy).

use crate::{Error, Result};
use coin::Address;
use policy::{ActionRequest, PolicyCap, Rule, TokenPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Rule witness.
pub struct Quota {
    _private: (),
}

impl Rule for Quota {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Total amount each sender may move.
    pub max: u64,
    /// Amount used so far, per sender.
    pub used: BTreeMap<Address, u64>,
}

impl QuotaConfig {
    pub fn remaining(&self, sender: &Address) -> u64 {
        let used = self.used.get(sender).copied().unwrap_or(0);
        self.max.saturating_sub(used)
    }
}

impl Quota {
    fn witness() -> Self {
        Self { _private: () }
    }

    /// Set the per-sender maximum. Usage counted so far is kept.
    pub fn set_max<T>(policy: &mut TokenPolicy<T>, cap: &PolicyCap<T>, max: u64) -> Result<()> {
        policy.authorize(cap)?;
        if !policy.has_rule_config::<Self>() {
            policy.add_rule_config(Self::witness(), cap, QuotaConfig::default())?;
        }
        policy.rule_config_mut::<Self, QuotaConfig>(Self::witness())?.max = max;
        debug!(policy_id = %policy.id(), max, "quota set");
        Ok(())
    }

    /// Forget what `sender` has used.
    pub fn reset<T>(policy: &mut TokenPolicy<T>, cap: &PolicyCap<T>, sender: &Address) -> Result<()> {
        policy.authorize(cap)?;
        let config = policy.rule_config_mut::<Self, QuotaConfig>(Self::witness())?;
        config.used.remove(sender);
        Ok(())
    }

    pub fn remaining<T>(policy: &TokenPolicy<T>, sender: &Address) -> Result<u64> {
        let config = policy.rule_config::<Self, QuotaConfig>(Self::witness())?;
        Ok(config.remaining(sender))
    }

    /// Count `request` against its sender's quota and stamp it. Nothing is
    /// counted when the quota would be exceeded.
    pub fn verify<T>(policy: &mut TokenPolicy<T>, request: &mut ActionRequest<T>) -> Result<()> {
        let config = policy.rule_config_mut::<Self, QuotaConfig>(Self::witness())?;
        let sender = request.sender();
        let remaining = config.remaining(sender);
        if request.amount() > remaining {
            return Err(Error::QuotaExceeded {
                sender: sender.clone(),
                requested: request.amount(),
                remaining,
            });
        }
        *config.used.entry(sender.clone()).or_insert(0) += request.amount();
        request.add_approval(Self::witness());
        Ok(())
    }
}
