//! Policy templates loaded from TOML.
//!
//! ```toml
//! [actions.transfer]
//! rules = ["allowlist", "limiter"]
//!
//! [actions.spend]
//! rules = []
//! ```

use crate::{Error, PolicyCap, Result, Rule, RuleId, TokenPolicy};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;

/// Declarative rule map for a policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTemplate {
    /// Allowed actions, keyed by action name.
    #[serde(default)]
    pub actions: BTreeMap<String, ActionTemplate>,
}

/// Rules required by one action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTemplate {
    /// Registry names of the required rules.
    #[serde(default)]
    pub rules: Vec<String>,
}

impl PolicyTemplate {
    /// Load a template from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse a template from a TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| Error::Parse(e.to_string()))
    }

    /// Render the template as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Parse(e.to_string()))
    }

    /// Allow every action in the template and require its rules.
    ///
    /// Additive: actions and rules already on the policy are kept. All rule
    /// names are resolved before anything is written, so an unknown name
    /// leaves the policy untouched.
    pub fn apply<T>(
        &self,
        policy: &mut TokenPolicy<T>,
        cap: &PolicyCap<T>,
        registry: &RuleRegistry,
    ) -> Result<()> {
        policy.authorize(cap)?;

        let mut resolved = Vec::with_capacity(self.actions.len());
        for (action, template) in &self.actions {
            let rules = template
                .rules
                .iter()
                .map(|name| registry.resolve(name))
                .collect::<Result<Vec<_>>>()?;
            resolved.push((action, rules));
        }

        for (action, rules) in resolved {
            policy.allow(cap, action.as_str())?;
            for rule in rules {
                policy.require_rule_id(cap, action.as_str(), rule)?;
            }
        }
        info!(policy_id = %policy.id(), actions = self.actions.len(), "policy template applied");
        Ok(())
    }

    /// Export a policy's rule map. Rules missing from the registry are
    /// written by their full id.
    pub fn from_policy<T>(policy: &TokenPolicy<T>, registry: &RuleRegistry) -> Self {
        let actions = policy
            .rules()
            .map(|(action, rules)| {
                let rules = rules
                    .iter()
                    .map(|rule| {
                        registry
                            .name_of(rule)
                            .map_or_else(|| rule.to_string(), str::to_string)
                    })
                    .collect();
                (action.to_string(), ActionTemplate { rules })
            })
            .collect();
        Self { actions }
    }
}

/// Names under which rules appear in templates.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    by_name: HashMap<String, RuleId>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register rule `R` under `name`, replacing any previous entry.
    pub fn register<R: Rule>(&mut self, name: impl Into<String>) -> &mut Self {
        self.by_name.insert(name.into(), RuleId::of::<R>());
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<R: Rule>(mut self, name: impl Into<String>) -> Self {
        self.register::<R>(name);
        self
    }

    pub fn resolve(&self, name: &str) -> Result<RuleId> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownRule(name.to_string()))
    }

    pub fn name_of(&self, rule: &RuleId) -> Option<&str> {
        self.by_name
            .iter()
            .find(|(_, id)| *id == rule)
            .map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coin::{TreasuryCap, TxContext};

    struct Gem;

    struct Kyc;
    impl Rule for Kyc {}

    struct Limit;
    impl Rule for Limit {}

    fn registry() -> RuleRegistry {
        RuleRegistry::new().with::<Kyc>("kyc").with::<Limit>("limit")
    }

    fn policy() -> (TokenPolicy<Gem>, PolicyCap<Gem>) {
        let mut ctx = TxContext::new("issuer");
        let treasury = TreasuryCap::new(&mut ctx);
        TokenPolicy::new(&treasury, &mut ctx)
    }

    #[test]
    fn test_parse_template() {
        let template = PolicyTemplate::parse(
            r#"
            [actions.transfer]
            rules = ["kyc", "limit"]

            [actions.spend]
            "#,
        )
        .unwrap();

        assert_eq!(template.actions.len(), 2);
        assert_eq!(template.actions["transfer"].rules, vec!["kyc", "limit"]);
        assert!(template.actions["spend"].rules.is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_toml() {
        let err = PolicyTemplate::parse("[actions.transfer\nrules = 1").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_apply_sets_rules() {
        let (mut policy, cap) = policy();
        let template = PolicyTemplate::parse(
            r#"
            [actions.transfer]
            rules = ["kyc"]

            [actions.spend]
            rules = []
            "#,
        )
        .unwrap();

        template.apply(&mut policy, &cap, &registry()).unwrap();

        assert!(policy.has_rule_for_action::<Kyc>("transfer"));
        assert!(policy.is_allowed("spend"));
        assert!(policy.required_rules("spend").is_empty());
    }

    #[test]
    fn test_unknown_rule_leaves_policy_untouched() {
        let (mut policy, cap) = policy();
        let template = PolicyTemplate::parse(
            r#"
            [actions.aaa]
            rules = ["kyc"]

            [actions.zzz]
            rules = ["nope"]
            "#,
        )
        .unwrap();

        let err = template.apply(&mut policy, &cap, &registry()).unwrap_err();
        assert!(matches!(err, Error::UnknownRule(name) if name == "nope"));
        assert_eq!(policy.rules().count(), 0);
    }

    #[test]
    fn test_export_matches_applied_template() {
        let (mut policy, cap) = policy();
        let registry = registry();
        let template = PolicyTemplate::parse(
            r#"
            [actions.transfer]
            rules = ["kyc", "limit"]
            "#,
        )
        .unwrap();
        template.apply(&mut policy, &cap, &registry).unwrap();

        let mut exported = PolicyTemplate::from_policy(&policy, &registry);
        exported
            .actions
            .values_mut()
            .for_each(|action| action.rules.sort());
        assert_eq!(exported, template);

        let reparsed = PolicyTemplate::parse(&exported.to_toml().unwrap()).unwrap();
        assert_eq!(reparsed, exported);
    }
}
