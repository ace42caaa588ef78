//! The visible tree handed to the reconciler and the committed rendered set.

use std::collections::{BTreeMap, HashMap};

use super::geometry::{Position, Segment};
use crate::hierarchy::RenderId;

/// A laid-out visible node, keyed by render id.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleNode {
    pub id: RenderId,
    pub parent: Option<RenderId>,
    pub label: String,
    pub value: f64,
    pub position: Position,
    /// Has children in the data.
    pub expandable: bool,
    /// Has children in the data that are currently hidden.
    pub collapsed: bool,
}

/// Visible nodes of one layout pass, in pre-order.
#[derive(Debug, Clone, Default)]
pub struct VisibleTree {
    nodes: Vec<VisibleNode>,
    slot_of: HashMap<RenderId, usize>,
}

impl VisibleTree {
    pub fn new(nodes: Vec<VisibleNode>) -> Self {
        let slot_of = nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();
        Self { nodes, slot_of }
    }

    pub fn get(&self, id: RenderId) -> Option<&VisibleNode> {
        self.slot_of.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: RenderId) -> bool {
        self.slot_of.contains_key(&id)
    }

    pub fn position_of(&self, id: RenderId) -> Option<Position> {
        self.get(id).map(|n| n.position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VisibleNode> + '_ {
        self.nodes.iter()
    }

    /// Parent→child pairs. A link is identified by its child.
    pub fn links(&self) -> impl Iterator<Item = (&VisibleNode, &VisibleNode)> + '_ {
        self.nodes
            .iter()
            .filter_map(|child| Some((self.get(child.parent?)?, child)))
    }

    /// Whether the link into `target` exists in this tree.
    pub fn has_link(&self, target: RenderId) -> bool {
        self.get(target)
            .and_then(|n| n.parent)
            .is_some_and(|parent| self.contains(parent))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A link as last committed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedLink {
    pub source: RenderId,
    pub target: RenderId,
    pub segment: Segment,
}

/// What is on screen once the last pass's transitions finish.
///
/// Node positions here are the "previous position" the next pass animates
/// from. Ordered maps keep exit lists deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedSet {
    nodes: BTreeMap<RenderId, VisibleNode>,
    links: BTreeMap<RenderId, RenderedLink>,
}

impl RenderedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rendered set after every element of `tree` reaches its target.
    pub fn commit(tree: &VisibleTree) -> Self {
        let nodes = tree.iter().map(|n| (n.id, n.clone())).collect();
        let links = tree
            .links()
            .map(|(parent, child)| {
                (
                    child.id,
                    RenderedLink {
                        source: parent.id,
                        target: child.id,
                        segment: Segment::new(parent.position, child.position),
                    },
                )
            })
            .collect();
        Self { nodes, links }
    }

    pub fn node(&self, id: RenderId) -> Option<&VisibleNode> {
        self.nodes.get(&id)
    }

    pub fn link(&self, target: RenderId) -> Option<&RenderedLink> {
        self.links.get(&target)
    }

    pub fn position_of(&self, id: RenderId) -> Option<Position> {
        self.nodes.get(&id).map(|n| n.position)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &VisibleNode> + '_ {
        self.nodes.values()
    }

    pub fn links(&self) -> impl Iterator<Item = &RenderedLink> + '_ {
        self.links.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = RenderId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}
