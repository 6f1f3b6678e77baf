//! Delivered-message ledger.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Default)]
struct SeenState {
    /// Ids in delivery order.
    order: Vec<u64>,
    /// Membership index over `order`.
    index: HashSet<u64>,
    /// Greatest id in `order`.
    max_id: Option<u64>,
}

/// Append-only set of message ids already delivered in this session.
///
/// Safe to share between the timer poll and the send-triggered poll. The
/// lock is held for one membership test or append, never across a fetch.
#[derive(Debug, Default)]
pub struct SeenTracker {
    state: RwLock<SeenState>,
}

impl SeenTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id` as delivered.
    ///
    /// Returns `true` if this call recorded it, `false` if it was already
    /// there. Test and insert happen under one write lock, so exactly one
    /// concurrent caller wins for any id.
    pub fn mark_seen(&self, id: u64) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !state.index.insert(id) {
            return false;
        }
        state.order.push(id);
        state.max_id = state.max_id.max(Some(id));
        true
    }

    /// Check whether `id` was delivered.
    pub fn is_seen(&self, id: u64) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .index
            .contains(&id)
    }

    /// Number of delivered ids.
    pub fn count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .len()
    }

    /// Greatest delivered id.
    pub fn last_id(&self) -> Option<u64> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .max_id
    }

    /// Delivered ids in delivery order.
    pub fn ids(&self) -> Vec<u64> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .clone()
    }
}
