//! Capabilities and rule identities.
//!
//! Authority is possession: a function that needs the policy owner's
//! consent takes a `&PolicyCap<T>`, a function that needs a rule's consent
//! takes the rule's marker value. Neither is `Clone`, and both can only be
//! constructed by the module that owns them.

use coin::ObjectId;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

/// Administrative authority over exactly one [`TokenPolicy`](crate::TokenPolicy).
///
/// Created together with its policy and never rebound.
#[must_use]
pub struct PolicyCap<T> {
    pub(crate) id: ObjectId,
    pub(crate) policy_id: ObjectId,
    pub(crate) _kind: PhantomData<fn() -> T>,
}

impl<T> PolicyCap<T> {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The policy this cap administers.
    pub fn policy_id(&self) -> ObjectId {
        self.policy_id
    }
}

impl<T> fmt::Debug for PolicyCap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyCap")
            .field("id", &self.id)
            .field("policy_id", &self.policy_id)
            .finish()
    }
}

/// A pluggable authorization rule.
///
/// The implementing type is the rule's witness: whoever can construct a
/// value of it may stamp requests and touch the rule's configuration. Give
/// the type a private field so only its own module can build one:
///
/// ```
/// use policy::Rule;
///
/// pub struct Kyc {
///     _private: (),
/// }
///
/// impl Rule for Kyc {}
/// ```
///
/// The trait has no items. A rule's identity is always
/// [`RuleId::of`] its own type and cannot be chosen by the implementor:
///
/// ```compile_fail
/// use policy::{Rule, RuleId};
///
/// struct Impostor;
///
/// impl Rule for Impostor {
///     fn id() -> RuleId {
///         RuleId::of::<Impostor>()
///     }
/// }
/// ```
pub trait Rule: 'static {}

/// Stable, comparable identity of a rule implementation.
///
/// Derived from the rule's fully qualified type name, so it is the same
/// across runs of the same build and can be written to configuration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(Cow<'static, str>);

impl RuleId {
    /// Identity of rule `R`.
    pub fn of<R: Rule>() -> Self {
        Self(Cow::Borrowed(std::any::type_name::<R>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Kyc;
    impl Rule for Kyc {}

    struct Limit;
    impl Rule for Limit {}

    #[test]
    fn test_rule_ids_are_distinct_and_stable() {
        assert_eq!(RuleId::of::<Kyc>(), RuleId::of::<Kyc>());
        assert_ne!(RuleId::of::<Kyc>(), RuleId::of::<Limit>());
        assert!(RuleId::of::<Kyc>().as_str().ends_with("Kyc"));
    }
}
