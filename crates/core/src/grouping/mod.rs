//! Connectivity grouping of points ("blends").
//!
//! Two points are neighbours when their separation is at most `sep`. A group
//! is a maximal set of points linked by chains of neighbours. Points with no
//! neighbour at all are left ungrouped.
//!
//! Neighbours are discovered through a spatial index and merged in a
//! disjoint-set forest, so the neighbour graph is never stored. With the
//! cell grid, points sharing a cell are merged outright and each pair of
//! nearby cells is linked by the first pair of points found within `sep`.

mod union_find;

use union_find::UnionFind;

use std::time::Instant;

use tracing::{debug, info};

use crate::error::{ClusterError, Result, check_finite, check_lengths};
use crate::params::{GroupingParams, IndexKind};
use crate::spatial::{CellGrid, NeighborIndex, PackedIndex, build_index, distance_2};

/// Group id given to points with no neighbour within `sep`.
pub const UNGROUPED: i64 = -1;

/// Result of group identification.
///
/// `x`, `y` and `group_ids` are aligned: entry `i` of each describes the same
/// point. Coordinates are returned in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAssignment {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Group id per point, `UNGROUPED` for isolated points. Real ids are
    /// contiguous from 0, numbered by each group's lowest point index.
    pub group_ids: Vec<i64>,
}

impl GroupAssignment {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.group_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.group_ids.is_empty()
    }

    /// Number of real groups (`max(group_id) + 1`).
    pub fn n_groups(&self) -> usize {
        self.group_ids
            .iter()
            .copied()
            .max()
            .map_or(0, |max| (max + 1) as usize)
    }

    /// Number of points that belong to a real group.
    pub fn n_grouped(&self) -> usize {
        self.group_ids.iter().filter(|&&g| g != UNGROUPED).count()
    }

    /// Group id of point `i`, `None` if ungrouped.
    pub fn group_of(&self, i: usize) -> Option<usize> {
        match self.group_ids[i] {
            UNGROUPED => None,
            g => Some(g as usize),
        }
    }

    /// Number of members per group id.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.n_groups()];
        for g in self.group_ids.iter().filter(|&&g| g != UNGROUPED) {
            counts[*g as usize] += 1;
        }
        counts
    }

    /// Member indices per group id, each list in ascending order.
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.n_groups()];
        for (i, &g) in self.group_ids.iter().enumerate() {
            if g != UNGROUPED {
                groups[g as usize].push(i);
            }
        }
        groups
    }

    /// Coordinates with every grouped point moved to its group's centre of mass.
    pub fn merged_positions(&self) -> (Vec<f64>, Vec<f64>) {
        merge_positions(&self.x, &self.y, &self.group_ids, self.n_groups())
    }
}

/// Finds every group of points connected by separations `<= sep`.
///
/// Uses the default packed index. See [`identify_all_groups_with`].
pub fn identify_all_groups(x: &[f64], y: &[f64], sep: f64) -> Result<GroupAssignment> {
    identify_all_groups_with(x, y, &GroupingParams::new(sep))
}

/// Finds every group of points connected by separations `<= params.sep`.
///
/// # Errors
/// `InvalidArgument` if `x` and `y` differ in length, a coordinate is not
/// finite, or `sep` is not a positive finite number.
pub fn identify_all_groups_with(
    x: &[f64],
    y: &[f64],
    params: &GroupingParams,
) -> Result<GroupAssignment> {
    check_lengths(x, y)?;
    params.validate()?;
    check_finite(x, y)?;

    let t0 = Instant::now();
    let n = x.len();
    let sep = params.sep;

    let mut uf = UnionFind::new(n);
    let merges = match params.index {
        // Same-cell points are at most sep / sqrt(2) apart.
        IndexKind::Cells => match CellGrid::new(x, y, sep / 2.0) {
            Some(grid) => link_cells(&grid, sep, &mut uf),
            None => {
                debug!(sep, "points too spread for a cell grid, using packed R-tree");
                link_neighbors(&PackedIndex::new(x, y), sep, &mut uf)
            }
        },
        kind => link_neighbors(build_index(kind, x, y, sep).as_ref(), sep, &mut uf),
    };
    debug!(points = n, merges, index = ?params.index, "neighbour pass complete");

    let group_ids = label_components(&mut uf);
    let assignment = GroupAssignment {
        x: x.to_vec(),
        y: y.to_vec(),
        group_ids,
    };

    log_summary(&assignment, t0);
    Ok(assignment)
}

/// Unions every point with each of its neighbours. Returns the number of merges.
fn link_neighbors(index: &dyn NeighborIndex, sep: f64, uf: &mut UnionFind) -> usize {
    let mut neighbors = Vec::new();
    let mut merges = 0;
    for i in 0..index.len() {
        index.neighbors_of(i, sep, &mut neighbors);
        // Each pair is seen from both ends; merging from the lower id suffices.
        for &j in neighbors.iter().filter(|&&j| j > i) {
            if uf.union(i, j) {
                merges += 1;
            }
        }
    }
    merges
}

/// Unions points cell by cell. Returns the number of merges.
///
/// Requires a cell diagonal below `sep`. Two points within `sep` of each
/// other can then sit at most `ceil(sep / side) + 1` cells apart on either
/// axis once rounding is allowed for.
fn link_cells(grid: &CellGrid, sep: f64, uf: &mut UnionFind) -> usize {
    let mut merges = 0;
    for (_, ids) in grid.cells() {
        if let [first, rest @ ..] = ids {
            for &j in rest {
                if uf.union(*first, j) {
                    merges += 1;
                }
            }
        }
    }

    let reach = (sep / grid.side()).ceil() as i64 + 1;
    let sep_2 = sep * sep;
    for ((kx, ky), ids) in grid.cells() {
        // Visit each unordered pair of cells once.
        for dx in 0..=reach {
            for dy in -reach..=reach {
                if dx == 0 && dy <= 0 {
                    continue;
                }
                let Some(other) = grid.cell((kx + dx, ky + dy)) else {
                    continue;
                };
                if uf.find(ids[0]) == uf.find(other[0]) {
                    continue;
                }
                if let Some((a, b)) = first_link(grid, ids, other, sep_2) {
                    uf.union(a, b);
                    merges += 1;
                }
            }
        }
    }
    merges
}

/// First pair `(a, b)` with `a` in `left`, `b` in `right` and squared
/// distance `<= sep_2`.
fn first_link(
    grid: &CellGrid,
    left: &[usize],
    right: &[usize],
    sep_2: f64,
) -> Option<(usize, usize)> {
    left.iter().find_map(|&a| {
        let pa = grid.point(a);
        right
            .iter()
            .find(|&&b| distance_2(pa, grid.point(b)) <= sep_2)
            .map(|&b| (a, b))
    })
}

/// Turns the forest into contiguous group ids, `UNGROUPED` for singletons.
fn label_components(uf: &mut UnionFind) -> Vec<i64> {
    let n = uf.len();
    let mut root_label = vec![UNGROUPED; n];
    let mut next: i64 = 0;
    let mut labels = vec![UNGROUPED; n];
    for (i, label) in labels.iter_mut().enumerate() {
        if uf.set_size(i) < 2 {
            continue;
        }
        let root = uf.find(i);
        if root_label[root] == UNGROUPED {
            root_label[root] = next;
            next += 1;
        }
        *label = root_label[root];
    }
    labels
}

fn log_summary(assignment: &GroupAssignment, t0: Instant) {
    let n = assignment.len();
    let n_groups = assignment.n_groups();
    let n_grouped = assignment.n_grouped();
    let fraction = if n == 0 {
        0.0
    } else {
        n_grouped as f64 / n as f64
    };
    let mean_size = if n_groups == 0 {
        0.0
    } else {
        n_grouped as f64 / n_groups as f64
    };
    info!(
        elapsed_s = t0.elapsed().as_secs_f64(),
        n_groups,
        n_grouped,
        fraction,
        mean_size,
        "identified groups"
    );
}

/// Moves every member of a real group to its group's centre of mass.
///
/// Ungrouped points (`UNGROUPED`) keep their coordinates.
///
/// # Errors
/// `InvalidArgument` if the three sequences differ in length, or a group id
/// is negative but not `UNGROUPED`, or is not below the number of points.
pub fn merge_group_positions(
    x: &[f64],
    y: &[f64],
    group_ids: &[i64],
) -> Result<(Vec<f64>, Vec<f64>)> {
    check_lengths(x, y)?;
    if group_ids.len() != x.len() {
        return Err(ClusterError::invalid(format!(
            "group_ids must have one entry per point (got {} for {} points)",
            group_ids.len(),
            x.len()
        )));
    }
    // Contiguous ids over n points never reach n.
    let n = group_ids.len();
    if let Some(&bad) = group_ids
        .iter()
        .find(|&&g| g < UNGROUPED || usize::try_from(g).is_ok_and(|g| g >= n))
    {
        return Err(ClusterError::invalid(format!(
            "invalid group id {bad} for {n} points"
        )));
    }
    let n_groups = group_ids.iter().copied().max().map_or(0, |m| (m + 1) as usize);
    Ok(merge_positions(x, y, group_ids, n_groups))
}

fn merge_positions(
    x: &[f64],
    y: &[f64],
    group_ids: &[i64],
    n_groups: usize,
) -> (Vec<f64>, Vec<f64>) {
    let mut sums = vec![(0.0, 0.0, 0usize); n_groups];
    for ((&px, &py), &g) in x.iter().zip(y).zip(group_ids) {
        if g != UNGROUPED {
            let s = &mut sums[g as usize];
            s.0 += px;
            s.1 += py;
            s.2 += 1;
        }
    }

    let mut xs = x.to_vec();
    let mut ys = y.to_vec();
    for ((px, py), &g) in xs.iter_mut().zip(ys.iter_mut()).zip(group_ids) {
        if g != UNGROUPED {
            let (sx, sy, count) = sums[g as usize];
            *px = sx / count as f64;
            *py = sy / count as f64;
        }
    }
    (xs, ys)
}
