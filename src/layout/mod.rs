//! Layout algorithms for the tree visual.
//!
//! This module computes target positions for the visible nodes of a
//! hierarchy. The renderer animates elements toward these positions; the
//! layout itself knows nothing about transitions.

pub mod tidy_tree;

pub use tidy_tree::{PlacedNode, TidyTreeConfig, TidyTreeLayout, TreeLayout};
