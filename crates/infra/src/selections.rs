//! Server-side storage for interactive selections.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use labelforge_core::{SelectionId, UserId};
use labelforge_labels::Selection;

/// Selection storage; expired selections behave as absent.
pub trait SelectionStore: Send + Sync {
    /// The live selection `id` owned by `user_id`, if any.
    fn get(&self, user_id: UserId, id: SelectionId, now: DateTime<Utc>) -> Option<Selection>;
    fn save(&self, selection: Selection);
    /// Drop expired selections; returns how many were removed.
    fn purge_expired(&self, now: DateTime<Utc>) -> usize;
}

#[derive(Debug, Default)]
pub struct InMemorySelectionStore {
    inner: RwLock<HashMap<SelectionId, Selection>>,
}

impl InMemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionStore for InMemorySelectionStore {
    fn get(&self, user_id: UserId, id: SelectionId, now: DateTime<Utc>) -> Option<Selection> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.get(&id)
            .filter(|s| s.user_id() == user_id && !s.is_expired(now))
            .cloned()
    }

    fn save(&self, selection: Selection) {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.insert(selection.id(), selection);
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let before = map.len();
        map.retain(|_, s| !s.is_expired(now));
        before - map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn selections_are_scoped_to_their_owner() {
        let store = InMemorySelectionStore::new();
        let now = Utc::now();
        let sel = Selection::new(UserId::new(1), Duration::minutes(30), now);
        let id = sel.id();
        store.save(sel);

        assert!(store.get(UserId::new(1), id, now).is_some());
        assert!(store.get(UserId::new(2), id, now).is_none());
    }

    #[test]
    fn expired_selections_are_invisible_and_purged() {
        let store = InMemorySelectionStore::new();
        let now = Utc::now();
        let sel = Selection::new(UserId::new(1), Duration::minutes(30), now);
        let id = sel.id();
        store.save(sel);
        store.save(Selection::new(UserId::new(1), Duration::hours(2), now));

        let later = now + Duration::minutes(31);
        assert!(store.get(UserId::new(1), id, later).is_none());
        assert_eq!(store.purge_expired(later), 1);
        assert_eq!(store.purge_expired(later), 0);
    }
}
