//! Allow-list: both parties of a request must be listed.

use crate::{Error, Result};
use coin::Address;
use policy::{ActionRequest, PolicyCap, Rule, TokenPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Rule witness.
pub struct Allowlist {
    _private: (),
}

impl Rule for Allowlist {}

/// Listed addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowlistConfig {
    pub addresses: BTreeSet<Address>,
}

impl Allowlist {
    fn witness() -> Self {
        Self { _private: () }
    }

    /// Add addresses, creating the list on first use.
    pub fn add_records<T>(
        policy: &mut TokenPolicy<T>,
        cap: &PolicyCap<T>,
        addresses: impl IntoIterator<Item = Address>,
    ) -> Result<()> {
        policy.authorize(cap)?;
        if !policy.has_rule_config::<Self>() {
            policy.add_rule_config(Self::witness(), cap, AllowlistConfig::default())?;
        }
        let config = policy.rule_config_mut::<Self, AllowlistConfig>(Self::witness())?;
        config.addresses.extend(addresses);
        debug!(policy_id = %policy.id(), "allow-list updated");
        Ok(())
    }

    pub fn remove_records<'a, T>(
        policy: &mut TokenPolicy<T>,
        cap: &PolicyCap<T>,
        addresses: impl IntoIterator<Item = &'a Address>,
    ) -> Result<()> {
        policy.authorize(cap)?;
        let config = policy.rule_config_mut::<Self, AllowlistConfig>(Self::witness())?;
        for address in addresses {
            config.addresses.remove(address);
        }
        Ok(())
    }

    pub fn contains<T>(policy: &TokenPolicy<T>, address: &Address) -> bool {
        policy
            .rule_config::<Self, AllowlistConfig>(Self::witness())
            .is_ok_and(|config| config.addresses.contains(address))
    }

    /// Stamp `request` if its sender and recipient are listed.
    pub fn verify<T>(policy: &TokenPolicy<T>, request: &mut ActionRequest<T>) -> Result<()> {
        let config = policy.rule_config::<Self, AllowlistConfig>(Self::witness())?;
        let parties = std::iter::once(request.sender()).chain(request.recipient());
        for address in parties {
            if !config.addresses.contains(address) {
                return Err(Error::AddressNotAllowed(address.clone()));
            }
        }
        request.add_approval(Self::witness());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coin::{TreasuryCap, TxContext};
    use policy::action;

    struct Gem;

    fn setup() -> (TxContext, TreasuryCap<Gem>, TokenPolicy<Gem>, PolicyCap<Gem>) {
        let mut ctx = TxContext::new("alice");
        let treasury = TreasuryCap::new(&mut ctx);
        let (policy, cap) = TokenPolicy::new(&treasury, &mut ctx);
        (ctx, treasury, policy, cap)
    }

    #[test]
    fn test_verify_requires_config() {
        let (ctx, mut treasury, policy, _cap) = setup();
        let mut request = ActionRequest::<Gem>::new(action::TRANSFER, 1, None, None, &ctx);

        let err = Allowlist::verify(&policy, &mut request).unwrap_err();
        assert!(matches!(err, Error::Policy(policy::Error::ConfigMissing(_))));
        let _ = request.confirm_with_treasury_cap(&mut treasury).unwrap();
    }

    #[test]
    fn test_both_parties_must_be_listed() {
        let (ctx, mut treasury, mut policy, cap) = setup();
        Allowlist::add_records(&mut policy, &cap, [Address::from("alice")]).unwrap();

        let mut request =
            ActionRequest::<Gem>::new(action::TRANSFER, 1, Some("bob".into()), None, &ctx);
        let err = Allowlist::verify(&policy, &mut request).unwrap_err();
        assert!(matches!(err, Error::AddressNotAllowed(a) if a.as_str() == "bob"));
        assert!(!request.is_approved_by::<Allowlist>());

        Allowlist::add_records(&mut policy, &cap, [Address::from("bob")]).unwrap();
        Allowlist::verify(&policy, &mut request).unwrap();
        assert!(request.is_approved_by::<Allowlist>());
        let _ = request.confirm_with_treasury_cap(&mut treasury).unwrap();
    }

    #[test]
    fn test_remove_records() {
        let (_ctx, _treasury, mut policy, cap) = setup();
        let bob = Address::from("bob");
        Allowlist::add_records(&mut policy, &cap, [bob.clone()]).unwrap();
        assert!(Allowlist::contains(&policy, &bob));

        Allowlist::remove_records(&mut policy, &cap, [&bob]).unwrap();
        assert!(!Allowlist::contains(&policy, &bob));
    }
}
