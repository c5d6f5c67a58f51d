//! Stock rules for token policies.
//!
//! Each rule is a witness type plus associated functions:
//!
//! - record management, gated by the policy cap
//! - `verify`, which inspects a request and stamps it on success
//!
//! Require a rule on an action with
//! [`TokenPolicy::require_rule`](policy::TokenPolicy::require_rule), then
//! run the rule's `verify` on every request for that action before
//! confirming it.

mod allowlist;
mod denylist;
mod error;
mod limiter;
mod quota;

pub use allowlist::{Allowlist, AllowlistConfig};
pub use denylist::{Denylist, DenylistConfig};
pub use error::{Error, Result};
pub use limiter::{Limiter, LimiterConfig};
pub use quota::{Quota, QuotaConfig};

use policy::RuleRegistry;

/// Registry with every stock rule under its conventional template name.
pub fn registry() -> RuleRegistry {
    RuleRegistry::new()
        .with::<Allowlist>("allowlist")
        .with::<Denylist>("denylist")
        .with::<Limiter>("limiter")
        .with::<Quota>("quota")
}
