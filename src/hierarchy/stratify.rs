//! Stratifier: flat edge table to a validated rooted tree.
//!
//! Topology is held in a petgraph `StableGraph` with parent→child edges. The
//! ordered child list lives on each [`HierarchyNode`] because petgraph yields
//! neighbours most-recently-added first, and layout needs table order.
//!
//! Validation runs in table order and reports the first problem found:
//! 1. empty or duplicate child identifiers,
//! 2. a second rootless row, or a parent that names no row,
//! 3. no rootless row at all,
//! 4. rows unreachable from the root, which with one parent per node can
//!    only mean a parent chain that loops.

use std::collections::{HashMap, HashSet};

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{Dfs, VisitMap};
use petgraph::{Directed, Direction};

use super::edge::EdgeRecord;
use super::node::HierarchyNode;
use crate::error::StructuralError;

/// A validated rooted tree built from an edge table.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    graph: StableGraph<HierarchyNode, (), Directed>,
    by_identifier: HashMap<String, NodeIndex>,
    root: NodeIndex,
}

impl Hierarchy {
    /// Build a tree from `records`.
    pub fn stratify(records: &[EdgeRecord]) -> Result<Self, StructuralError> {
        let mut graph = StableGraph::with_capacity(records.len(), records.len());
        let mut by_identifier = HashMap::with_capacity(records.len());
        let mut row_nodes = Vec::with_capacity(records.len());

        for (row, record) in records.iter().enumerate() {
            if record.child.is_empty() {
                return Err(StructuralError::EmptyIdentifier { row });
            }
            let index = graph.add_node(HierarchyNode::new(record.child.clone(), record.value));
            if by_identifier.insert(record.child.clone(), index).is_some() {
                return Err(StructuralError::DuplicateNode {
                    id: record.child.clone(),
                });
            }
            row_nodes.push(index);
        }

        let mut root: Option<NodeIndex> = None;
        for (record, &child) in records.iter().zip(&row_nodes) {
            match record.parent_identifier() {
                None => {
                    if let Some(first) = root {
                        return Err(StructuralError::MultipleRoots {
                            first: graph[first].identifier.clone(),
                            second: record.child.clone(),
                        });
                    }
                    root = Some(child);
                }
                Some(parent_id) => {
                    let parent = by_identifier.get(parent_id).copied().ok_or_else(|| {
                        StructuralError::MissingParent {
                            child: record.child.clone(),
                            parent: parent_id.to_owned(),
                        }
                    })?;
                    graph.add_edge(parent, child, ());
                    graph[parent].children.push(child);
                }
            }
        }

        let root = root.ok_or(StructuralError::NoRoot)?;

        let mut dfs = Dfs::new(&graph, root);
        let mut reached = 0;
        while dfs.next(&graph).is_some() {
            reached += 1;
        }
        if reached < graph.node_count() {
            let stranded = graph
                .node_indices()
                .find(|index| !dfs.discovered.is_visited(index))
                .unwrap_or(root);
            let on_cycle = Self::first_revisited(&graph, stranded);
            return Err(StructuralError::Cycle {
                id: graph[on_cycle].identifier.clone(),
            });
        }

        let mut stack = vec![(root, 0u32)];
        while let Some((index, depth)) = stack.pop() {
            graph[index].depth = depth;
            stack.extend(graph[index].children.iter().map(|&child| (child, depth + 1)));
        }

        Ok(Self {
            graph,
            by_identifier,
            root,
        })
    }

    /// Walk parent links from `start` until a node repeats.
    ///
    /// Only called for nodes the root cannot reach, whose parent chain must
    /// therefore end in a loop.
    fn first_revisited(
        graph: &StableGraph<HierarchyNode, (), Directed>,
        start: NodeIndex,
    ) -> NodeIndex {
        let mut seen = HashSet::new();
        let mut current = start;
        while seen.insert(current) {
            match graph.neighbors_directed(current, Direction::Incoming).next() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    #[inline]
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Number of nodes (equal to the number of input rows).
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Get a node by index.
    ///
    /// Indices come from this hierarchy, so the lookup cannot miss.
    pub fn node(&self, index: NodeIndex) -> &HierarchyNode {
        &self.graph[index]
    }

    /// Children of `index` in table order.
    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        &self.graph[index].children
    }

    /// Parent of `index`, or `None` for the root.
    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.graph.neighbors_directed(index, Direction::Incoming).next()
    }

    /// Find a node by identifier.
    pub fn find(&self, identifier: &str) -> Option<NodeIndex> {
        self.by_identifier.get(identifier).copied()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.by_identifier.contains_key(identifier)
    }

    /// All nodes in pre-order (parents before children, siblings in table order).
    pub fn preorder(&self) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.len());
        let mut stack = vec![self.root];
        while let Some(index) = stack.pop() {
            order.push(index);
            stack.extend(self.children(index).iter().rev());
        }
        order
    }
}
