//! Node types: the stratified tree node and its stable render id.
//!
//! A tree node is rebuilt on every data update. Its render id is not: it is
//! handed out the first time an identifier is seen and survives rebuilds,
//! collapses and expansions for as long as the identifier stays in the data.

use std::collections::HashMap;
use std::fmt;

use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Stable rendering key for a node.
///
/// Wraps a u32 for efficient storage and WebAssembly interop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderId(pub u32);

impl RenderId {
    /// Create a new RenderId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for RenderId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<RenderId> for u32 {
    #[inline]
    fn from(id: RenderId) -> Self {
        id.0
    }
}

/// A node of the stratified tree.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode {
    /// Identifier taken from the defining row's child column.
    pub identifier: String,
    /// Value from the defining row.
    pub value: f64,
    /// Depth below the root (root = 0).
    pub depth: u32,
    /// Children in order of first appearance in the table.
    pub children: Vec<NodeIndex>,
}

impl HierarchyNode {
    pub(crate) fn new(identifier: String, value: f64) -> Self {
        Self {
            identifier,
            value,
            depth: 0,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Assignment table from identifier to render id.
///
/// Ids come from a monotonic counter starting at 1 and are never reused, even
/// after an identifier is dropped from the data and later comes back.
#[derive(Debug, Clone)]
pub struct RenderIds {
    by_identifier: HashMap<String, RenderId>,
    next: u32,
}

impl RenderIds {
    pub fn new() -> Self {
        Self {
            by_identifier: HashMap::new(),
            next: 1,
        }
    }

    /// Return the id for `identifier`, assigning a fresh one on first sight.
    pub fn assign(&mut self, identifier: &str) -> RenderId {
        if let Some(&id) = self.by_identifier.get(identifier) {
            return id;
        }
        let id = RenderId(self.next);
        self.next += 1;
        self.by_identifier.insert(identifier.to_owned(), id);
        id
    }

    /// Look up an already assigned id.
    pub fn get(&self, identifier: &str) -> Option<RenderId> {
        self.by_identifier.get(identifier).copied()
    }

    /// Forget identifiers for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.by_identifier.retain(|identifier, _| keep(identifier));
    }

    pub fn len(&self) -> usize {
        self.by_identifier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identifier.is_empty()
    }
}

impl Default for RenderIds {
    fn default() -> Self {
        Self::new()
    }
}
