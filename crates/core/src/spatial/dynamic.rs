//! Dynamic R-tree index.

use rstar::RTree;
use rstar::primitives::GeomWithData;
use tracing::debug;

use super::{NeighborIndex, Point};

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// rstar R-tree over points, bulk loaded at construction.
pub struct DynamicIndex {
    points: Vec<Point>,
    tree: RTree<IndexedPoint>,
}

impl DynamicIndex {
    /// Bulk loads `(x[i], y[i])`.
    pub fn new(x: &[f64], y: &[f64]) -> Self {
        let points: Vec<Point> = x.iter().copied().zip(y.iter().copied()).collect();
        let nodes: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .map(|(id, &(px, py))| GeomWithData::new([px, py], id))
            .collect();
        let tree = RTree::bulk_load(nodes);
        debug!(points = points.len(), "bulk loaded dynamic R-tree");
        Self { points, tree }
    }
}

impl NeighborIndex for DynamicIndex {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn point(&self, id: usize) -> Point {
        self.points[id]
    }

    fn query_radius(&self, center: Point, radius: f64, out: &mut Vec<usize>) {
        out.clear();
        out.extend(
            self.tree
                .locate_within_distance([center.0, center.1], radius * radius)
                .map(|node| node.data),
        );
    }
}
