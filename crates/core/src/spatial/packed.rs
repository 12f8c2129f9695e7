//! Static packed R-tree index.

use geo_index::rtree::sort::HilbertSort;
use geo_index::rtree::{RTree as GeoRTree, RTreeBuilder, RTreeIndex};
use tracing::debug;

use super::{NeighborIndex, Point, distance_2, query_box};

/// Bulk-loaded R-tree over a fixed point set.
///
/// Ids are stable: id == position in the input sequences. The tree is built
/// once with Hilbert ordering and never modified.
pub struct PackedIndex {
    points: Vec<Point>,
    /// None when there are no points (the builder rejects empty trees)
    tree: Option<GeoRTree<f64>>,
}

impl PackedIndex {
    /// Builds the index over `(x[i], y[i])`.
    pub fn new(x: &[f64], y: &[f64]) -> Self {
        let points: Vec<Point> = x.iter().copied().zip(y.iter().copied()).collect();
        if points.is_empty() {
            return Self { points, tree: None };
        }

        let mut builder: RTreeBuilder<f64> = RTreeBuilder::new(points.len() as u32);
        for &(px, py) in &points {
            builder.add(px, py, px, py);
        }
        let tree = builder.finish::<HilbertSort>();
        debug!(points = points.len(), "built packed R-tree");

        Self {
            points,
            tree: Some(tree),
        }
    }
}

impl NeighborIndex for PackedIndex {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn point(&self, id: usize) -> Point {
        self.points[id]
    }

    fn query_radius(&self, center: Point, radius: f64, out: &mut Vec<usize>) {
        out.clear();
        let Some(tree) = &self.tree else {
            return;
        };
        let r2 = radius * radius;
        let (x0, y0, x1, y1) = query_box(center, radius);
        for id in tree.search(x0, y0, x1, y1) {
            let id = id as usize;
            if distance_2(self.points[id], center) <= r2 {
                out.push(id);
            }
        }
    }
}
