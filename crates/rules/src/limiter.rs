//! Per-action amount limits.

use crate::{Error, Result};
use policy::{ActionRequest, PolicyCap, Rule, TokenPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Rule witness.
pub struct Limiter {
    _private: (),
}

impl Rule for Limiter {}

/// Maximum amount per action name. Actions without an entry are unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimiterConfig {
    pub limits: BTreeMap<String, u64>,
}

impl Limiter {
    fn witness() -> Self {
        Self { _private: () }
    }

    /// Set or replace the limit for `action`.
    pub fn set_limit<T>(
        policy: &mut TokenPolicy<T>,
        cap: &PolicyCap<T>,
        action: impl Into<String>,
        limit: u64,
    ) -> Result<()> {
        policy.authorize(cap)?;
        if !policy.has_rule_config::<Self>() {
            policy.add_rule_config(Self::witness(), cap, LimiterConfig::default())?;
        }
        let action = action.into();
        debug!(policy_id = %policy.id(), action = %action, limit, "limit set");
        let config = policy.rule_config_mut::<Self, LimiterConfig>(Self::witness())?;
        config.limits.insert(action, limit);
        Ok(())
    }

    /// Lift the limit for `action`, returning the old one.
    pub fn remove_limit<T>(
        policy: &mut TokenPolicy<T>,
        cap: &PolicyCap<T>,
        action: &str,
    ) -> Result<Option<u64>> {
        policy.authorize(cap)?;
        let config = policy.rule_config_mut::<Self, LimiterConfig>(Self::witness())?;
        Ok(config.limits.remove(action))
    }

    pub fn limit<T>(policy: &TokenPolicy<T>, action: &str) -> Option<u64> {
        policy
            .rule_config::<Self, LimiterConfig>(Self::witness())
            .ok()
            .and_then(|config| config.limits.get(action).copied())
    }

    /// Stamp `request` if its amount is within the action's limit.
    pub fn verify<T>(policy: &TokenPolicy<T>, request: &mut ActionRequest<T>) -> Result<()> {
        let config = policy.rule_config::<Self, LimiterConfig>(Self::witness())?;
        if let Some(&limit) = config.limits.get(request.action())
            && request.amount() > limit
        {
            return Err(Error::LimitExceeded {
                action: request.action().to_string(),
                amount: request.amount(),
                limit,
            });
        }
        request.add_approval(Self::witness());
        Ok(())
    }
}
