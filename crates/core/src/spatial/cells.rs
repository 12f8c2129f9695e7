//! Uniform grid of square cells.

use rustc_hash::FxHashMap;
use tracing::debug;

use super::{NeighborIndex, Point, bounding_box, distance_2, query_box};

/// Integer coordinates of a cell.
pub type CellKey = (i64, i64);

/// Cells per axis above which `f64` cell coordinates stop being exact.
const MAX_CELLS_PER_AXIS: f64 = (1u64 << 40) as f64;

/// Points binned into square cells of a fixed side.
///
/// Cell `(0, 0)` starts at the lower-left corner of the point set's bounding
/// box, so every occupied key is non-negative. Members of a cell are kept in
/// ascending id order.
pub struct CellGrid {
    points: Vec<Point>,
    origin: Point,
    side: f64,
    cells: FxHashMap<CellKey, Vec<usize>>,
    key_max: CellKey,
}

impl CellGrid {
    /// Bins `(x[i], y[i])` into cells of side `side`.
    ///
    /// Returns `None` if `side` is not positive and finite, or if the points
    /// span too many cells for exact integer keys.
    pub fn new(x: &[f64], y: &[f64], side: f64) -> Option<Self> {
        if !side.is_finite() || side <= 0.0 {
            return None;
        }
        let points: Vec<Point> = x.iter().copied().zip(y.iter().copied()).collect();
        let origin = match bounding_box(points.iter().copied()) {
            Some((x0, y0, x1, y1)) => {
                let fits = |extent: f64| extent / side <= MAX_CELLS_PER_AXIS;
                if !(fits(x1 - x0) && fits(y1 - y0)) {
                    return None;
                }
                (x0, y0)
            }
            None => (0.0, 0.0),
        };

        let mut grid = Self {
            points,
            origin,
            side,
            cells: FxHashMap::default(),
            key_max: (0, 0),
        };
        for id in 0..grid.points.len() {
            let key = grid.key_of(grid.points[id]);
            grid.key_max = (grid.key_max.0.max(key.0), grid.key_max.1.max(key.1));
            grid.cells.entry(key).or_default().push(id);
        }
        debug!(
            points = grid.points.len(),
            cells = grid.cells.len(),
            side,
            "binned points into cells"
        );
        Some(grid)
    }

    pub fn side(&self) -> f64 {
        self.side
    }

    /// Number of occupied cells.
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Key of the cell containing `p`.
    pub fn key_of(&self, p: Point) -> CellKey {
        (
            ((p.0 - self.origin.0) / self.side).floor() as i64,
            ((p.1 - self.origin.1) / self.side).floor() as i64,
        )
    }

    /// Member ids of cell `key`, `None` when the cell is empty.
    pub fn cell(&self, key: CellKey) -> Option<&[usize]> {
        self.cells.get(&key).map(Vec::as_slice)
    }

    /// Occupied cells with their members, in unspecified order.
    pub fn cells(&self) -> impl Iterator<Item = (CellKey, &[usize])> {
        self.cells.iter().map(|(&key, ids)| (key, ids.as_slice()))
    }

    fn push_within(&self, ids: &[usize], center: Point, r2: f64, out: &mut Vec<usize>) {
        out.extend(
            ids.iter()
                .copied()
                .filter(|&id| distance_2(self.points[id], center) <= r2),
        );
    }
}

impl NeighborIndex for CellGrid {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn point(&self, id: usize) -> Point {
        self.points[id]
    }

    fn query_radius(&self, center: Point, radius: f64, out: &mut Vec<usize>) {
        out.clear();
        if self.points.is_empty() {
            return;
        }
        let r2 = radius * radius;
        let (x0, y0, x1, y1) = query_box(center, radius);
        let lo = self.key_of((x0, y0));
        let hi = self.key_of((x1, y1));
        let (kx0, ky0) = (lo.0.max(0), lo.1.max(0));
        let (kx1, ky1) = (hi.0.min(self.key_max.0), hi.1.min(self.key_max.1));
        if kx0 > kx1 || ky0 > ky1 {
            return;
        }

        let span = (kx1 - kx0 + 1) as u128 * (ky1 - ky0 + 1) as u128;
        if span > self.cells.len() as u128 {
            for (&(kx, ky), ids) in &self.cells {
                if (kx0..=kx1).contains(&kx) && (ky0..=ky1).contains(&ky) {
                    self.push_within(ids, center, r2, out);
                }
            }
        } else {
            for kx in kx0..=kx1 {
                for ky in ky0..=ky1 {
                    if let Some(ids) = self.cells.get(&(kx, ky)) {
                        self.push_within(ids, center, r2, out);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_land_in_cells_from_the_lower_left_corner() {
        let x = [1.0, 1.4, 2.6, 1.0];
        let y = [5.0, 5.2, 5.0, 6.1];
        let grid = CellGrid::new(&x, &y, 0.5).unwrap();
        assert_eq!(grid.n_cells(), 3);
        assert_eq!(grid.cell((0, 0)), Some(&[0, 1][..]));
        assert_eq!(grid.cell((3, 0)), Some(&[2][..]));
        assert_eq!(grid.cell((0, 2)), Some(&[3][..]));
        assert_eq!(grid.cell((1, 0)), None);
    }

    #[test]
    fn rejects_unusable_cell_sizes() {
        assert!(CellGrid::new(&[0.0], &[0.0], 0.0).is_none());
        assert!(CellGrid::new(&[0.0], &[0.0], f64::NAN).is_none());
        assert!(CellGrid::new(&[0.0, 1e300], &[0.0, 0.0], 1e-300).is_none());
        assert!(CellGrid::new(&[], &[], 1.0).is_some());
    }

    #[test]
    fn wide_query_on_fine_grid_scans_occupied_cells() {
        let grid = CellGrid::new(&[0.0, 1e6], &[0.0, 1e6], 1e-3).unwrap();
        let mut out = Vec::new();
        grid.query_radius((0.0, 0.0), 1e7, &mut out);
        out.sort_unstable();
        assert_eq!(out, vec![0, 1]);
        grid.query_radius((-5.0, -5.0), 1.0, &mut out);
        assert!(out.is_empty());
    }
}
