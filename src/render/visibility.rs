//! Expanded/collapsed state per node.
//!
//! Kept apart from the hierarchy so a data rebuild never loses it and the
//! tree itself is never mutated to hide a subtree. Nodes are expanded unless
//! recorded here as collapsed.

use std::collections::HashSet;

use crate::hierarchy::RenderId;

/// Which nodes currently hide their children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityState {
    collapsed: HashSet<RenderId>,
}

impl VisibilityState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_expanded(&self, id: RenderId) -> bool {
        !self.collapsed.contains(&id)
    }

    #[inline]
    pub fn is_collapsed(&self, id: RenderId) -> bool {
        self.collapsed.contains(&id)
    }

    /// Flip a node between expanded and collapsed.
    ///
    /// Returns true if the node is expanded afterwards. Callers only toggle
    /// nodes that have children.
    pub fn toggle(&mut self, id: RenderId) -> bool {
        if self.collapsed.remove(&id) {
            true
        } else {
            self.collapsed.insert(id);
            false
        }
    }

    /// Drop state for nodes for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(RenderId) -> bool) {
        self.collapsed.retain(|&id| keep(id));
    }

    /// Number of collapsed nodes.
    pub fn collapsed_count(&self) -> usize {
        self.collapsed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_expanded() {
        let state = VisibilityState::new();
        assert!(state.is_expanded(RenderId(1)));
        assert!(!state.is_collapsed(RenderId(1)));
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut state = VisibilityState::new();
        let before = state.clone();

        assert!(!state.toggle(RenderId(3)));
        assert!(state.is_collapsed(RenderId(3)));
        assert!(state.toggle(RenderId(3)));
        assert_eq!(state, before);
    }

    #[test]
    fn test_retain() {
        let mut state = VisibilityState::new();
        state.toggle(RenderId(1));
        state.toggle(RenderId(2));
        state.retain(|id| id != RenderId(1));
        assert!(state.is_expanded(RenderId(1)));
        assert!(state.is_collapsed(RenderId(2)));
    }
}
