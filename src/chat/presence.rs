//! Presence derived from join/part events.

use std::collections::BTreeMap;

/// Who is currently in the room, as far as join/part events tell.
///
/// A participant who never posts a part event stays present; there is no
/// timeout.
#[derive(Debug, Clone, Default)]
pub struct PresenceTracker {
    present: BTreeMap<String, bool>,
}

impl PresenceTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `user` present.
    ///
    /// Returns true if this changed the presence list.
    pub fn on_join(&mut self, user: &str) -> bool {
        self.present.insert(user.to_string(), true) != Some(true)
    }

    /// Mark `user` absent.
    ///
    /// Returns true if this changed the presence list.
    pub fn on_part(&mut self, user: &str) -> bool {
        self.present.insert(user.to_string(), false) == Some(true)
    }

    /// Check whether `user` is present.
    pub fn is_present(&self, user: &str) -> bool {
        self.present.get(user).copied().unwrap_or(false)
    }

    /// Present users, sorted by name.
    pub fn snapshot(&self) -> Vec<String> {
        self.present
            .iter()
            .filter(|(_, present)| **present)
            .map(|(name, _)| name.clone())
            .collect()
    }
}
