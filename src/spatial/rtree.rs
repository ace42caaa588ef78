//! R-tree over committed node positions using the rstar crate.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::hierarchy::RenderId;

/// A committed node position keyed by render id.
#[derive(Debug, Clone, Copy, PartialEq)]
struct NodePoint {
    id: RenderId,
    x: f32,
    y: f32,
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Hit-test index for the rendered set, in layout space.
///
/// Rebuilt wholesale after every pass; trees here are small enough that
/// bulk loading beats tracking moves.
#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<NodePoint>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the index contents with `(id, x, y)` points.
    pub fn rebuild(&mut self, points: impl IntoIterator<Item = (RenderId, f32, f32)>) {
        let points: Vec<_> = points
            .into_iter()
            .map(|(id, x, y)| NodePoint { id, x, y })
            .collect();
        self.tree = RTree::bulk_load(points);
    }

    /// The nearest node no further than `max_distance` from `(x, y)`.
    pub fn nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<RenderId> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= max_distance_sq)
            .map(|point| point.id)
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(points: &[(u32, f32, f32)]) -> SpatialIndex {
        let mut index = SpatialIndex::new();
        index.rebuild(points.iter().map(|&(id, x, y)| (RenderId(id), x, y)));
        index
    }

    #[test]
    fn test_nearest_within() {
        let index = index(&[(1, 0.0, 0.0), (2, 10.0, 10.0)]);

        assert_eq!(index.nearest_within(0.0, 0.0, 5.0), Some(RenderId(1)));
        // Nothing within 1 of (5, 5)
        assert_eq!(index.nearest_within(5.0, 5.0, 1.0), None);
        // Node 1 is ~7.07 from (5, 5)
        assert_eq!(index.nearest_within(5.0, 5.0, 8.0), Some(RenderId(1)));
        assert_eq!(index.nearest_within(9.0, 9.5, 2.0), Some(RenderId(2)));
    }

    #[test]
    fn test_rebuild_replaces_contents() {
        let mut index = index(&[(1, 0.0, 0.0)]);
        index.rebuild([(RenderId(2), 50.0, 50.0), (RenderId(3), 60.0, 60.0)]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.nearest_within(0.0, 0.0, 5.0), None);
        assert_eq!(index.nearest_within(51.0, 51.0, 5.0), Some(RenderId(2)));
    }
}
