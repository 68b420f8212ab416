//! User preference toggles contributed by the extension.

use crate::config::VisibilityPolicy;
use log::debug;
use std::collections::BTreeSet;

/// Toggle letting a user hide their identifier on their profile page.
pub const HIDE_IDENTIFIER_TOGGLE: &str = "hideopenid";

/// Set of boolean toggles shown on the preferences page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceRegistry {
    toggles: BTreeSet<String>,
}

impl PreferenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a toggle. Returns `false` when it was already registered.
    pub fn register_toggle(&mut self, name: &str) -> bool {
        self.toggles.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.toggles.contains(name)
    }

    pub fn toggles(&self) -> impl Iterator<Item = &str> {
        self.toggles.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.toggles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toggles.is_empty()
    }
}

/// Registers [`HIDE_IDENTIFIER_TOGGLE`] when users control visibility.
///
/// Returns whether the toggle is now present. Safe to call repeatedly.
pub fn register_preference_if_applicable(
    policy: VisibilityPolicy,
    registry: &mut PreferenceRegistry,
) -> bool {
    if policy != VisibilityPolicy::UserControlled {
        return false;
    }
    if registry.register_toggle(HIDE_IDENTIFIER_TOGGLE) {
        debug!(
            "event=preference_register module=preferences status=ok toggle={}",
            HIDE_IDENTIFIER_TOGGLE
        );
    }
    true
}

#[cfg(test)]
mod tests {
    use super::{register_preference_if_applicable, PreferenceRegistry, HIDE_IDENTIFIER_TOGGLE};
    use crate::config::VisibilityPolicy;

    #[test]
    fn registers_toggle_only_for_user_controlled_policy() {
        for (policy, expected) in [
            (VisibilityPolicy::UserControlled, true),
            (VisibilityPolicy::Always, false),
            (VisibilityPolicy::Never, false),
        ] {
            let mut registry = PreferenceRegistry::new();
            assert_eq!(
                register_preference_if_applicable(policy, &mut registry),
                expected
            );
            assert_eq!(registry.contains(HIDE_IDENTIFIER_TOGGLE), expected);
        }
    }

    #[test]
    fn repeated_registration_is_idempotent() {
        let mut registry = PreferenceRegistry::new();
        registry.register_toggle("showtoc");
        for _ in 0..3 {
            register_preference_if_applicable(VisibilityPolicy::UserControlled, &mut registry);
        }
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.toggles().collect::<Vec<_>>(),
            vec!["hideopenid", "showtoc"]
        );
    }
}
