//! Hierarchy reconstruction.
//!
//! Turns the host's flat parent/child table into a validated rooted tree and
//! keeps the identifier → render id table that gives every node a stable
//! rendering key across rebuilds.

mod edge;
mod node;
mod stratify;

pub use edge::{Columns, EdgeRecord};
pub use node::{HierarchyNode, RenderId, RenderIds};
pub use stratify::Hierarchy;

pub use petgraph::stable_graph::NodeIndex;
