//! Buchheim-Junger-Leipert tidy tree layout algorithm.
//!
//! Implements the O(n) algorithm from "Improving Walker's Algorithm to Run in
//! Linear Time" (Buchheim, Junger, Leipert, 2002) over the visible part of a
//! [`Hierarchy`]: children of collapsed nodes are left out before the walk.
//!
//! # Algorithm Overview
//!
//! 1. **First walk (bottom-up):** Assign preliminary x-coordinates by merging
//!    subtree contours. Threads give O(1) amortized contour traversal.
//! 2. **Second walk (top-down):** Apply accumulated modifiers to turn
//!    preliminary x-coordinates into relative positions.
//! 3. **Fit:** Scale the relative positions so the outermost nodes sit half a
//!    separation unit inside `[0, extent]`; `y = depth * depth_spacing`.
//!
//! Siblings keep table order, so an earlier child always gets a smaller `x`.
//! Leftmost/rightmost ties during the fit resolve to the first node in
//! pre-order.

use std::collections::HashMap;

use crate::hierarchy::{Hierarchy, NodeIndex};
use crate::render::Position;

/// Configuration for the tidy tree layout.
#[derive(Debug, Clone)]
pub struct TidyTreeConfig {
    /// Separation units between nodes sharing a parent.
    pub sibling_separation: f32,
    /// Separation units between neighbouring nodes with different parents.
    pub cousin_separation: f32,
    /// Distance between tree levels.
    pub depth_spacing: f32,
}

impl Default for TidyTreeConfig {
    fn default() -> Self {
        Self {
            sibling_separation: 1.0,
            cousin_separation: 2.0,
            depth_spacing: 180.0,
        }
    }
}

/// Internal node data used during the Buchheim algorithm.
#[derive(Debug)]
struct LayoutNode {
    /// Node in the hierarchy.
    node: NodeIndex,
    /// Depth in the tree (root = 0).
    depth: u32,
    /// Parent layout index (None for root).
    parent: Option<usize>,
    /// Visible children in table order.
    children: Vec<usize>,
    /// Left-to-right index among siblings.
    number: usize,
    /// Preliminary x-coordinate.
    prelim: f32,
    /// Subtree shift, accumulated in the first walk and applied in the second.
    modifier: f32,
    /// Contour thread for nodes without children.
    thread: Option<usize>,
    /// Greatest distinct ancestor pointer used by apportion.
    ancestor: usize,
    /// Default ancestor for this node's children while they are walked.
    default_ancestor: Option<usize>,
    /// Pending shift for even spacing of intermediate children.
    shift: f32,
    /// Pending change for even spacing of intermediate children.
    change: f32,
}

/// A visible node with its computed position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    pub node: NodeIndex,
    pub parent: Option<NodeIndex>,
    pub depth: u32,
    pub position: Position,
}

/// Result of a layout pass: visible nodes in pre-order.
#[derive(Debug, Clone, Default)]
pub struct TreeLayout {
    nodes: Vec<PlacedNode>,
    slot_of: HashMap<NodeIndex, usize>,
}

impl TreeLayout {
    fn new(nodes: Vec<PlacedNode>) -> Self {
        let slot_of = nodes.iter().enumerate().map(|(i, n)| (n.node, i)).collect();
        Self { nodes, slot_of }
    }

    pub fn nodes(&self) -> &[PlacedNode] {
        &self.nodes
    }

    pub fn get(&self, node: NodeIndex) -> Option<&PlacedNode> {
        self.slot_of.get(&node).map(|&i| &self.nodes[i])
    }

    pub fn position_of(&self, node: NodeIndex) -> Option<Position> {
        self.get(node).map(|n| n.position)
    }

    /// Parent→child pairs, one per non-root visible node.
    pub fn links(&self) -> impl Iterator<Item = (&PlacedNode, &PlacedNode)> + '_ {
        self.nodes
            .iter()
            .filter_map(|child| Some((self.get(child.parent?)?, child)))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// The tidy tree layout engine.
pub struct TidyTreeLayout {
    config: TidyTreeConfig,
}

impl TidyTreeLayout {
    /// Create a new tidy tree layout with the given configuration.
    pub fn new(config: TidyTreeConfig) -> Self {
        Self { config }
    }

    /// Create a tidy tree layout with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TidyTreeConfig::default())
    }

    /// Compute positions for every visible node.
    ///
    /// # Arguments
    ///
    /// * `hierarchy` - The tree to lay out
    /// * `extent` - Space available across siblings
    /// * `is_expanded` - Whether a node's children are shown
    pub fn compute(
        &self,
        hierarchy: &Hierarchy,
        extent: f32,
        is_expanded: impl Fn(NodeIndex) -> bool,
    ) -> TreeLayout {
        let mut layout_nodes = Self::build_layout_tree(hierarchy, &is_expanded);

        self.first_walk(&mut layout_nodes);
        let relative_x = Self::second_walk(&mut layout_nodes);

        // Fit the relative positions into [0, extent].
        let mut left = 0;
        let mut right = 0;
        for (i, &x) in relative_x.iter().enumerate() {
            if x < relative_x[left] {
                left = i;
            }
            if x > relative_x[right] {
                right = i;
            }
        }
        let tx = self.separation(left, right, &layout_nodes) / 2.0 - relative_x[left];
        let span = relative_x[right] + self.separation(right, left, &layout_nodes) / 2.0 + tx;
        let kx = if span > 0.0 { extent / span } else { 0.0 };

        let placed = layout_nodes
            .iter()
            .zip(&relative_x)
            .map(|(node, &x)| PlacedNode {
                node: node.node,
                parent: node.parent.map(|p| layout_nodes[p].node),
                depth: node.depth,
                position: Position::new(
                    (x + tx) * kx,
                    node.depth as f32 * self.config.depth_spacing,
                ),
            })
            .collect();

        TreeLayout::new(placed)
    }

    /// Build the layout arena in pre-order, skipping children of collapsed nodes.
    ///
    /// Walks with an explicit stack so deep chains cannot exhaust the call
    /// stack. Children are popped in table order, so each parent's child list
    /// ends up in table order too.
    fn build_layout_tree(
        hierarchy: &Hierarchy,
        is_expanded: &impl Fn(NodeIndex) -> bool,
    ) -> Vec<LayoutNode> {
        let mut layout_nodes: Vec<LayoutNode> = Vec::with_capacity(hierarchy.len());
        let mut stack = vec![(hierarchy.root(), None, 0)];

        while let Some((node, parent, number)) = stack.pop() {
            let layout_idx = layout_nodes.len();
            layout_nodes.push(LayoutNode {
                node,
                depth: hierarchy.node(node).depth,
                parent,
                children: Vec::new(),
                number,
                prelim: 0.0,
                modifier: 0.0,
                thread: None,
                ancestor: layout_idx,
                default_ancestor: None,
                shift: 0.0,
                change: 0.0,
            });
            if let Some(p) = parent {
                layout_nodes[p].children.push(layout_idx);
            }

            if is_expanded(node) {
                let children = hierarchy.children(node);
                stack.extend(
                    children
                        .iter()
                        .enumerate()
                        .rev()
                        .map(|(i, &child)| (child, Some(layout_idx), i)),
                );
            }
        }

        layout_nodes
    }

    /// Separation units between two nodes.
    fn separation(&self, a: usize, b: usize, nodes: &[LayoutNode]) -> f32 {
        if nodes[a].parent == nodes[b].parent {
            self.config.sibling_separation
        } else {
            self.config.cousin_separation
        }
    }

    fn left_sibling(v: usize, nodes: &[LayoutNode]) -> Option<usize> {
        let parent = nodes[v].parent?;
        let number = nodes[v].number;
        (number > 0).then(|| nodes[parent].children[number - 1])
    }

    /// Buchheim first walk: bottom-up assignment of preliminary x-coordinates.
    ///
    /// Visits nodes in left-to-right post-order, so every subtree is placed
    /// before its right siblings are apportioned against it.
    fn first_walk(&self, nodes: &mut [LayoutNode]) {
        let mut stack = vec![(0, false)];
        while let Some((v, children_done)) = stack.pop() {
            if children_done {
                self.place(v, nodes);
            } else {
                stack.push((v, true));
                stack.extend(
                    nodes[v]
                        .children
                        .iter()
                        .rev()
                        .map(|&child| (child, false)),
                );
            }
        }
    }

    /// First-walk step for `v` once all its children are placed.
    fn place(&self, v: usize, nodes: &mut [LayoutNode]) {
        let children = nodes[v].children.clone();
        let left_sibling = Self::left_sibling(v, nodes);
        if let (Some(&first), Some(&last)) = (children.first(), children.last()) {
            Self::execute_shifts(v, nodes);
            let midpoint = (nodes[first].prelim + nodes[last].prelim) / 2.0;
            match left_sibling {
                Some(w) => {
                    nodes[v].prelim = nodes[w].prelim + self.separation(v, w, nodes);
                    nodes[v].modifier = nodes[v].prelim - midpoint;
                }
                None => nodes[v].prelim = midpoint,
            }
        } else if let Some(w) = left_sibling {
            nodes[v].prelim = nodes[w].prelim + self.separation(v, w, nodes);
        }

        if let Some(parent) = nodes[v].parent {
            let default_ancestor = nodes[parent]
                .default_ancestor
                .unwrap_or(nodes[parent].children[0]);
            let next = self.apportion(v, left_sibling, default_ancestor, nodes);
            nodes[parent].default_ancestor = Some(next);
        }
    }

    /// Next node on the left contour of a subtree.
    fn next_left(v: usize, nodes: &[LayoutNode]) -> Option<usize> {
        nodes[v].children.first().copied().or(nodes[v].thread)
    }

    /// Next node on the right contour of a subtree.
    fn next_right(v: usize, nodes: &[LayoutNode]) -> Option<usize> {
        nodes[v].children.last().copied().or(nodes[v].thread)
    }

    /// Apportion: push `v`'s subtree clear of the subtrees to its left.
    /// This is the core of Buchheim's linear-time improvement over Walker's algorithm.
    fn apportion(
        &self,
        v: usize,
        left_sibling: Option<usize>,
        mut default_ancestor: usize,
        nodes: &mut [LayoutNode],
    ) -> usize {
        let Some(w) = left_sibling else {
            return default_ancestor;
        };
        let Some(parent) = nodes[v].parent else {
            return default_ancestor;
        };

        // "right" contours belong to v's subtree, "left" contours to the
        // forest of siblings before it; the inner ones face each other.
        let mut v_inner_right = v;
        let mut v_outer_right = v;
        let mut v_inner_left = w;
        let mut v_outer_left = nodes[parent].children[0];

        let mut s_inner_right = nodes[v_inner_right].modifier;
        let mut s_outer_right = nodes[v_outer_right].modifier;
        let mut s_inner_left = nodes[v_inner_left].modifier;
        let mut s_outer_left = nodes[v_outer_left].modifier;

        let mut next_inner_left = Self::next_right(v_inner_left, nodes);
        let mut next_inner_right = Self::next_left(v_inner_right, nodes);

        while let (Some(il), Some(ir)) = (next_inner_left, next_inner_right) {
            v_inner_left = il;
            v_inner_right = ir;
            v_outer_left = Self::next_left(v_outer_left, nodes).unwrap_or(v_outer_left);
            v_outer_right = Self::next_right(v_outer_right, nodes).unwrap_or(v_outer_right);
            nodes[v_outer_right].ancestor = v;

            let shift = (nodes[v_inner_left].prelim + s_inner_left)
                - (nodes[v_inner_right].prelim + s_inner_right)
                + self.separation(v_inner_left, v_inner_right, nodes);

            if shift > 0.0 {
                let ancestor = Self::ancestor(v_inner_left, v, default_ancestor, nodes);
                Self::move_subtree(ancestor, v, shift, nodes);
                s_inner_right += shift;
                s_outer_right += shift;
            }

            s_inner_left += nodes[v_inner_left].modifier;
            s_inner_right += nodes[v_inner_right].modifier;
            s_outer_left += nodes[v_outer_left].modifier;
            s_outer_right += nodes[v_outer_right].modifier;

            next_inner_left = Self::next_right(v_inner_left, nodes);
            next_inner_right = Self::next_left(v_inner_right, nodes);
        }

        // Set threads where one side ran out before the other.
        if let Some(il) = next_inner_left {
            if Self::next_right(v_outer_right, nodes).is_none() {
                nodes[v_outer_right].thread = Some(il);
                nodes[v_outer_right].modifier += s_inner_left - s_outer_right;
            }
        }
        if let Some(ir) = next_inner_right {
            if Self::next_left(v_outer_left, nodes).is_none() {
                nodes[v_outer_left].thread = Some(ir);
                nodes[v_outer_left].modifier += s_inner_right - s_outer_left;
                default_ancestor = v;
            }
        }

        default_ancestor
    }

    /// The sibling of `v` whose subtree contains `v_inner_left`, or the default.
    fn ancestor(
        v_inner_left: usize,
        v: usize,
        default_ancestor: usize,
        nodes: &[LayoutNode],
    ) -> usize {
        let candidate = nodes[v_inner_left].ancestor;
        if nodes[candidate].parent == nodes[v].parent {
            candidate
        } else {
            default_ancestor
        }
    }

    /// Shift subtree `wr` right by `shift`, spreading the gap over the
    /// siblings between `wl` and `wr`.
    fn move_subtree(wl: usize, wr: usize, shift: f32, nodes: &mut [LayoutNode]) {
        let subtrees = (nodes[wr].number - nodes[wl].number).max(1) as f32;
        let change = shift / subtrees;

        nodes[wr].change -= change;
        nodes[wr].shift += shift;
        nodes[wl].change += change;
        nodes[wr].prelim += shift;
        nodes[wr].modifier += shift;
    }

    /// Execute accumulated shifts for children of node v.
    fn execute_shifts(v: usize, nodes: &mut [LayoutNode]) {
        let children = nodes[v].children.clone();
        let mut shift = 0.0f32;
        let mut change = 0.0f32;

        for &child in children.iter().rev() {
            nodes[child].prelim += shift;
            nodes[child].modifier += shift;
            change += nodes[child].change;
            shift += nodes[child].shift + change;
        }
    }

    /// Second walk: apply accumulated modifiers to get relative x-coordinates.
    ///
    /// The arena is in pre-order, so a parent's modifier is final before any
    /// of its children are visited.
    fn second_walk(nodes: &mut [LayoutNode]) -> Vec<f32> {
        let root_prelim = nodes[0].prelim;
        let mut relative_x = vec![0.0f32; nodes.len()];

        for v in 0..nodes.len() {
            let parent_modifier = match nodes[v].parent {
                Some(p) => nodes[p].modifier,
                None => -root_prelim,
            };
            relative_x[v] = nodes[v].prelim + parent_modifier;
            nodes[v].modifier += parent_modifier;
        }

        relative_x
    }
}
