//! Spatial indexing for neighbour discovery.
//!
//! The neighbour graph between points is never materialized. Instead the
//! grouper asks an index for "all points within radius r of this point".
//!
//! - `cells` - uniform hash grid sized from the query radius
//! - `packed` - static Hilbert-packed R-tree, bulk loaded once (geo-index)
//! - `dynamic` - bulk-loaded R-tree (rstar)

mod cells;
mod dynamic;
mod packed;

pub use cells::{CellGrid, CellKey};
pub use dynamic::DynamicIndex;
pub use packed::PackedIndex;

use tracing::debug;

use crate::params::IndexKind;

/// A 2D point (x, y).
pub type Point = (f64, f64);

/// An axis-aligned rectangle (x0, y0, x1, y1).
pub type Rect = (f64, f64, f64, f64);

/// Relative padding applied to query boxes so that points lying exactly on the
/// radius survive rounding in `x +/- r`. The exact distance test runs afterwards.
const QUERY_PAD: f64 = 1e-9;

/// Radius queries over an indexed point set.
///
/// Point ids are positions in the sequence the index was built from.
pub trait NeighborIndex {
    /// Number of indexed points.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Coordinates of point `id`.
    fn point(&self, id: usize) -> Point;

    /// Replaces `out` with the ids of all points at Euclidean distance `<= radius`
    /// from `center`, in unspecified order.
    fn query_radius(&self, center: Point, radius: f64, out: &mut Vec<usize>);

    /// Replaces `out` with the neighbours of point `id` within `radius`,
    /// excluding `id` itself. Coincident points are neighbours.
    fn neighbors_of(&self, id: usize, radius: f64, out: &mut Vec<usize>) {
        self.query_radius(self.point(id), radius, out);
        out.retain(|&j| j != id);
    }
}

/// Builds the requested index over the points `(x[i], y[i])`.
///
/// `radius` is the typical query radius; the cell grid uses cells of half
/// that side and falls back to the packed R-tree when it cannot bin the points.
/// Callers must have checked that `x` and `y` have equal lengths.
pub fn build_index(
    kind: IndexKind,
    x: &[f64],
    y: &[f64],
    radius: f64,
) -> Box<dyn NeighborIndex> {
    match kind {
        IndexKind::Cells => match CellGrid::new(x, y, radius / 2.0) {
            Some(grid) => Box::new(grid),
            None => {
                debug!(radius, "points too spread for a cell grid, using packed R-tree");
                Box::new(PackedIndex::new(x, y))
            }
        },
        IndexKind::Packed => Box::new(PackedIndex::new(x, y)),
        IndexKind::Dynamic => Box::new(DynamicIndex::new(x, y)),
    }
}

/// Squared Euclidean distance between two points.
#[inline]
pub(crate) fn distance_2(a: Point, b: Point) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx * dx + dy * dy
}

/// Bounding box of a point set, `None` when empty.
pub fn bounding_box(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
    points.into_iter().fold(None, |acc, (px, py)| match acc {
        None => Some((px, py, px, py)),
        Some((x0, y0, x1, y1)) => Some((x0.min(px), y0.min(py), x1.max(px), y1.max(py))),
    })
}

/// Query box around `center` covering the radius with a little slack.
fn query_box(center: Point, radius: f64) -> Rect {
    let r = radius + radius * QUERY_PAD;
    (center.0 - r, center.1 - r, center.0 + r, center.1 + r)
}
