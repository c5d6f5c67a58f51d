//! Deny-list: neither party of a request may be listed.

use crate::{Error, Result};
use coin::Address;
use policy::{ActionRequest, PolicyCap, Rule, TokenPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Rule witness.
pub struct Denylist {
    _private: (),
}

impl Rule for Denylist {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenylistConfig {
    pub addresses: BTreeSet<Address>,
}

impl Denylist {
    fn witness() -> Self {
        Self { _private: () }
    }

    pub fn add_records<T>(
        policy: &mut TokenPolicy<T>,
        cap: &PolicyCap<T>,
        addresses: impl IntoIterator<Item = Address>,
    ) -> Result<()> {
        policy.authorize(cap)?;
        if !policy.has_rule_config::<Self>() {
            policy.add_rule_config(Self::witness(), cap, DenylistConfig::default())?;
        }
        let config = policy.rule_config_mut::<Self, DenylistConfig>(Self::witness())?;
        config.addresses.extend(addresses);
        debug!(policy_id = %policy.id(), "deny-list updated");
        Ok(())
    }

    pub fn remove_records<'a, T>(
        policy: &mut TokenPolicy<T>,
        cap: &PolicyCap<T>,
        addresses: impl IntoIterator<Item = &'a Address>,
    ) -> Result<()> {
        policy.authorize(cap)?;
        let config = policy.rule_config_mut::<Self, DenylistConfig>(Self::witness())?;
        for address in addresses {
            config.addresses.remove(address);
        }
        Ok(())
    }

    pub fn contains<T>(policy: &TokenPolicy<T>, address: &Address) -> bool {
        policy
            .rule_config::<Self, DenylistConfig>(Self::witness())
            .is_ok_and(|config| config.addresses.contains(address))
    }

    /// Stamp `request` unless its sender or recipient is listed. A policy
    /// with no deny-list denies nobody.
    pub fn verify<T>(policy: &TokenPolicy<T>, request: &mut ActionRequest<T>) -> Result<()> {
        let parties = std::iter::once(request.sender()).chain(request.recipient());
        for address in parties {
            if Self::contains(policy, address) {
                warn!(policy_id = %policy.id(), address = %address, "denied address");
                return Err(Error::AddressDenied(address.clone()));
            }
        }
        request.add_approval(Self::witness());
        Ok(())
    }
}
