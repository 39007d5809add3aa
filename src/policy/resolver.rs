//! Scope inheritance and the disable cascade.
//!
//! # Responsibilities
//! - Merge fragments from the outermost scope to the innermost
//! - Fill anything never set with the system defaults
//! - Force every block flag off in a scope whose module is disabled
//!
//! # Design Decisions
//! - Children inherit the values *before* the cascade, so a child can re-enable
//!   the module and get its ancestors' block flags back
//! - Inherited and explicit disables are treated the same

use axum::body::Bytes;
use serde::{Serialize, Serializer};

use crate::policy::PolicyFragment;

/// Values visible to a child scope: every flag concrete, cascade not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inherited {
    enabled: bool,
    block_http09: bool,
    block_http10: bool,
    block_http11: bool,
    custom_message: Option<Bytes>,
}

impl Inherited {
    /// System defaults used when no scope sets a flag.
    pub fn root() -> Self {
        Self {
            enabled: false,
            block_http09: true,
            block_http10: true,
            block_http11: false,
            custom_message: None,
        }
    }

    /// Merge a child fragment over these values.
    pub fn merge(&self, child: &PolicyFragment) -> Self {
        let custom_message = match &child.custom_message {
            Some(message) => Some(Bytes::copy_from_slice(message.as_bytes())),
            None => self.custom_message.clone(),
        };

        Self {
            enabled: child.enabled.or(self.enabled),
            block_http09: child.block_http09.or(self.block_http09),
            block_http10: child.block_http10.or(self.block_http10),
            block_http11: child.block_http11.or(self.block_http11),
            custom_message,
        }
    }

    /// The policy requests in this scope are decided against.
    pub fn effective(&self) -> EffectivePolicy {
        // An empty message still stops inheritance but falls back to the template.
        let custom_message = self.custom_message.clone().filter(|m| !m.is_empty());

        if !self.enabled {
            return EffectivePolicy {
                enabled: false,
                block_http09: false,
                block_http10: false,
                block_http11: false,
                custom_message,
            };
        }

        EffectivePolicy {
            enabled: true,
            block_http09: self.block_http09,
            block_http10: self.block_http10,
            block_http11: self.block_http11,
            custom_message,
        }
    }
}

impl Default for Inherited {
    fn default() -> Self {
        Self::root()
    }
}

/// Resolve a chain of fragments ordered outermost first.
pub fn resolve<'a, I>(chain: I) -> EffectivePolicy
where
    I: IntoIterator<Item = &'a PolicyFragment>,
{
    chain
        .into_iter()
        .fold(Inherited::root(), |acc, fragment| acc.merge(fragment))
        .effective()
}

/// Fully resolved policy of one scope. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectivePolicy {
    enabled: bool,
    block_http09: bool,
    block_http10: bool,
    block_http11: bool,
    #[serde(serialize_with = "serialize_message")]
    custom_message: Option<Bytes>,
}

impl EffectivePolicy {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn block_http09(&self) -> bool {
        self.block_http09
    }

    pub fn block_http10(&self) -> bool {
        self.block_http10
    }

    pub fn block_http11(&self) -> bool {
        self.block_http11
    }

    /// Custom rejection body, if any scope along the chain set one.
    pub fn custom_message(&self) -> Option<&Bytes> {
        self.custom_message.as_ref()
    }
}

impl Default for EffectivePolicy {
    fn default() -> Self {
        Inherited::root().effective()
    }
}

fn serialize_message<S: Serializer>(message: &Option<Bytes>, s: S) -> Result<S::Ok, S::Error> {
    match message {
        Some(bytes) => s.serialize_some(&*String::from_utf8_lossy(bytes)),
        None => s.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Toggle;

    fn enabled() -> PolicyFragment {
        PolicyFragment {
            enabled: Toggle::On,
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_disable_everything() {
        let policy = resolve(Vec::<&PolicyFragment>::new());
        assert!(!policy.enabled());
        assert!(!policy.block_http09());
        assert!(!policy.block_http10());
        assert!(!policy.block_http11());
        assert!(policy.custom_message().is_none());
    }

    #[test]
    fn test_enabled_uses_default_flags() {
        let policy = resolve([&enabled()]);
        assert!(policy.enabled());
        assert!(policy.block_http09());
        assert!(policy.block_http10());
        assert!(!policy.block_http11());
    }

    #[test]
    fn test_disable_cascade_forces_flags_off() {
        let fragment = PolicyFragment {
            enabled: Toggle::Off,
            block_http09: Toggle::On,
            block_http10: Toggle::On,
            block_http11: Toggle::On,
            ..Default::default()
        };
        let policy = resolve([&fragment]);
        assert!(!policy.block_http09());
        assert!(!policy.block_http10());
        assert!(!policy.block_http11());
    }

    #[test]
    fn test_child_inherits_unforced_values() {
        let global = PolicyFragment {
            block_http11: Toggle::On,
            ..Default::default()
        };
        let host = PolicyFragment::default();
        let location = enabled();

        let host_policy = resolve([&global, &host]);
        assert!(!host_policy.block_http11());

        let location_policy = resolve([&global, &host, &location]);
        assert!(location_policy.enabled());
        assert!(location_policy.block_http11());
    }

    #[test]
    fn test_inherited_disable_equals_explicit_disable() {
        let global = PolicyFragment {
            enabled: Toggle::Off,
            ..Default::default()
        };
        let host = PolicyFragment {
            block_http10: Toggle::On,
            ..Default::default()
        };
        let policy = resolve([&global, &host]);
        assert!(!policy.enabled());
        assert!(!policy.block_http10());
    }

    #[test]
    fn test_path_sets_only_http11() {
        let host = PolicyFragment {
            enabled: Toggle::On,
            block_http09: Toggle::Off,
            block_http10: Toggle::On,
            ..Default::default()
        };
        let location = PolicyFragment {
            block_http11: Toggle::On,
            ..Default::default()
        };
        let host_policy = resolve([&PolicyFragment::default(), &host]);
        let location_policy = resolve([&PolicyFragment::default(), &host, &location]);

        assert_eq!(host_policy.enabled(), location_policy.enabled());
        assert_eq!(host_policy.block_http09(), location_policy.block_http09());
        assert_eq!(host_policy.block_http10(), location_policy.block_http10());
        assert!(location_policy.block_http11());
    }

    #[test]
    fn test_custom_message_propagates_and_overrides() {
        let mut global = enabled();
        global.set_custom_message("global").unwrap();
        let mut location = PolicyFragment::default();
        location.set_custom_message("location").unwrap();

        let host_policy = resolve([&global, &PolicyFragment::default()]);
        assert_eq!(host_policy.custom_message().unwrap().as_ref(), b"global");

        let location_policy = resolve([&global, &PolicyFragment::default(), &location]);
        assert_eq!(location_policy.custom_message().unwrap().as_ref(), b"location");
    }

    #[test]
    fn test_empty_message_uses_template() {
        let mut global = enabled();
        global.set_custom_message("parent").unwrap();
        let mut host = PolicyFragment::default();
        host.set_custom_message("").unwrap();

        assert!(resolve([&global, &host]).custom_message().is_none());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut global = enabled();
        global.set_custom_message("blocked").unwrap();
        let host = PolicyFragment {
            block_http11: Toggle::On,
            ..Default::default()
        };

        assert_eq!(resolve([&global, &host]), resolve([&global, &host]));
    }
}
