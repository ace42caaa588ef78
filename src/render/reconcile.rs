//! Reconciler: diff the rendered set against a new layout.
//!
//! Every element falls in exactly one of three sets:
//!
//! - **enter**: in the new tree only. Nodes start at the source node's
//!   previous position; links start as a zero-length segment there.
//! - **update**: in both. Elements move from their committed geometry to the
//!   new one.
//! - **exit**: in the rendered set only. Elements retract into the source
//!   node's current position and are then dropped.
//!
//! Links are keyed by their child's render id. Interpolating over time is the
//! renderer's job; a pass that arrives mid-animation simply starts from the
//! committed geometry again.

use serde::Serialize;

use super::geometry::{Appearance, Position, Segment};
use super::rendered::{RenderedSet, VisibleNode, VisibleTree};
use crate::hierarchy::RenderId;

/// The node a pass is anchored on: the root for a data update, the clicked
/// node for an interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionSource {
    pub id: RenderId,
    /// Where entering elements emerge from.
    pub previous: Position,
    /// Where exiting elements retract to.
    pub current: Position,
}

/// Animation of one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTransition {
    pub id: RenderId,
    pub label: String,
    pub value: f64,
    pub expandable: bool,
    pub collapsed: bool,
    pub from: Position,
    pub to: Position,
    pub from_appearance: Appearance,
    pub to_appearance: Appearance,
}

/// Animation of one link, identified by its child.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkTransition {
    pub source: RenderId,
    pub target: RenderId,
    pub from: Segment,
    pub to: Segment,
}

/// Nodes and links sharing a phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransitionSet {
    pub nodes: Vec<NodeTransition>,
    pub links: Vec<LinkTransition>,
}

impl TransitionSet {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    pub fn node_ids(&self) -> Vec<RenderId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    pub fn link_targets(&self) -> Vec<RenderId> {
        self.links.iter().map(|l| l.target).collect()
    }

    pub fn node(&self, id: RenderId) -> Option<&NodeTransition> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Everything the renderer needs for one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPass {
    pub source: RenderId,
    pub duration_ms: u32,
    pub enter: TransitionSet,
    pub update: TransitionSet,
    pub exit: TransitionSet,
}

impl RenderPass {
    /// Whether no element appears or disappears.
    pub fn is_stable(&self) -> bool {
        self.enter.is_empty() && self.exit.is_empty()
    }
}

/// Computes transition sets.
#[derive(Debug, Clone)]
pub struct Reconciler {
    node_radius: f32,
    duration_ms: u32,
}

impl Reconciler {
    pub fn new(node_radius: f32, duration_ms: u32) -> Self {
        Self {
            node_radius,
            duration_ms,
        }
    }

    /// Diff `previous` against `next` without committing.
    pub fn plan(
        &self,
        previous: &RenderedSet,
        next: &VisibleTree,
        source: &TransitionSource,
    ) -> RenderPass {
        let visible = Appearance::visible(self.node_radius);
        let mut pass = RenderPass {
            source: source.id,
            duration_ms: self.duration_ms,
            enter: TransitionSet::default(),
            update: TransitionSet::default(),
            exit: TransitionSet::default(),
        };

        for node in next.iter() {
            match previous.position_of(node.id) {
                Some(committed) => pass.update.nodes.push(Self::node_transition(
                    node,
                    committed,
                    node.position,
                    visible,
                    visible,
                )),
                None => pass.enter.nodes.push(Self::node_transition(
                    node,
                    source.previous,
                    node.position,
                    Appearance::HIDDEN,
                    visible,
                )),
            }
        }

        for (parent, child) in next.links() {
            let to = Segment::new(parent.position, child.position);
            let (set, from) = match previous.link(child.id) {
                Some(committed) => (&mut pass.update, committed.segment),
                None => (&mut pass.enter, Segment::collapsed(source.previous)),
            };
            set.links.push(LinkTransition {
                source: parent.id,
                target: child.id,
                from,
                to,
            });
        }

        for node in previous.nodes().filter(|n| !next.contains(n.id)) {
            pass.exit.nodes.push(Self::node_transition(
                node,
                node.position,
                source.current,
                visible,
                Appearance::HIDDEN,
            ));
        }

        for link in previous.links().filter(|l| !next.has_link(l.target)) {
            pass.exit.links.push(LinkTransition {
                source: link.source,
                target: link.target,
                from: link.segment,
                to: Segment::collapsed(source.current),
            });
        }

        pass
    }

    /// Diff and commit `next` as the new rendered set.
    pub fn reconcile(
        &self,
        rendered: &mut RenderedSet,
        next: &VisibleTree,
        source: &TransitionSource,
    ) -> RenderPass {
        let pass = self.plan(rendered, next, source);
        *rendered = RenderedSet::commit(next);
        pass
    }

    fn node_transition(
        node: &VisibleNode,
        from: Position,
        to: Position,
        from_appearance: Appearance,
        to_appearance: Appearance,
    ) -> NodeTransition {
        NodeTransition {
            id: node.id,
            label: node.label.clone(),
            value: node.value,
            expandable: node.expandable,
            collapsed: node.collapsed,
            from,
            to,
            from_appearance,
            to_appearance,
        }
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(10.0, 750)
    }
}
