//! Spatial indexing for click hit testing.
//!
//! Committed node positions go into an R-tree so a pointer event can be
//! resolved to a render id without scanning the whole tree.

mod rtree;

pub use rtree::SpatialIndex;
