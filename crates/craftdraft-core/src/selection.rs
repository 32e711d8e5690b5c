//! Selection state: the set of entity ids tools operate on.

use crate::document::EntityId;
use std::collections::BTreeSet;

/// Selected entity ids, kept sorted so edit requests are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    ids: BTreeSet<EntityId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with a single entity.
    pub fn set_single(&mut self, id: impl Into<EntityId>) {
        self.ids.clear();
        self.ids.insert(id.into());
    }

    /// Replace the selection with the given ids.
    pub fn set<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        self.ids = ids.into_iter().map(Into::into).collect();
    }

    /// Add an entity to the selection.
    pub fn add(&mut self, id: impl Into<EntityId>) {
        self.ids.insert(id.into());
    }

    /// Toggle an entity's membership.
    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Iterate ids in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &EntityId> {
        self.ids.iter()
    }

    /// Owned, sorted copy of the ids.
    pub fn ids(&self) -> Vec<EntityId> {
        self.ids.iter().cloned().collect()
    }

    /// Drop ids for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.ids.retain(|id| keep(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_single_replaces() {
        let mut sel = SelectionState::new();
        sel.set(["a", "b"]);
        sel.set_single("c");
        assert_eq!(sel.ids(), vec!["c".to_string()]);
    }

    #[test]
    fn test_ids_are_sorted() {
        let mut sel = SelectionState::new();
        sel.add("z");
        sel.add("a");
        sel.add("m");
        assert_eq!(sel.ids(), vec!["a", "m", "z"]);
    }

    #[test]
    fn test_toggle_and_clear() {
        let mut sel = SelectionState::new();
        sel.toggle("a");
        assert!(sel.is_selected("a"));
        sel.toggle("a");
        assert!(!sel.is_selected("a"));
        sel.add("b");
        sel.clear();
        assert!(sel.is_empty());
    }

    #[test]
    fn test_retain() {
        let mut sel = SelectionState::new();
        sel.set(["keep", "drop"]);
        sel.retain(|id| id == "keep");
        assert_eq!(sel.len(), 1);
        assert!(sel.is_selected("keep"));
    }
}
