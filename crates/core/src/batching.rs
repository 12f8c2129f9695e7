//! Partitioning of points into processing batches.
//!
//! Points are split by recursive coordinate bisection: a cell that owes points
//! to a run of batches is cut along its wider axis so that the first half of
//! the batches gets exactly the points it is owed. Spatially close points
//! therefore tend to share a batch, and batch sizes never differ by more than
//! one.
//!
//! Target sizes follow the largest-remainder rule. With `n = k * q + r`, the
//! first `r` batches hold `q + 1` points and the remaining `k - r` hold `q`.

use std::time::Instant;

use tracing::{debug, info};

use crate::error::{ClusterError, Result, check_finite, check_lengths};
use crate::params::BatchTarget;
use crate::spatial::{Point, Rect, bounding_box};

/// Summary of one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchCell {
    /// Number of points in the batch.
    pub count: usize,
    /// Mean position of the batch members, `None` for an empty batch.
    pub centroid: Option<Point>,
    /// Bounding box of the batch members, `None` for an empty batch.
    pub bbox: Option<Rect>,
}

/// Result of batch partitioning.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchAssignment {
    /// Per-batch diagnostics, indexed by batch id.
    pub cells: Vec<BatchCell>,
    /// Batch id per point, contiguous from 0.
    pub batch_ids: Vec<usize>,
    /// Number of points per batch id. Sums to the number of points.
    pub n_per_batch: Vec<usize>,
}

impl BatchAssignment {
    pub fn n_batches(&self) -> usize {
        self.n_per_batch.len()
    }

    /// Point indices of batch `batch`, in ascending order.
    pub fn members(&self, batch: usize) -> Vec<usize> {
        self.batch_ids
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b == batch)
            .map(|(i, _)| i)
            .collect()
    }

    /// Point indices of every batch, each list in ascending order.
    pub fn batches(&self) -> Vec<Vec<usize>> {
        let mut batches: Vec<Vec<usize>> = self
            .n_per_batch
            .iter()
            .map(|&n| Vec::with_capacity(n))
            .collect();
        for (i, &b) in self.batch_ids.iter().enumerate() {
            batches[b].push(i);
        }
        batches
    }
}

/// Splits points into batches, given exactly one of `nbatches` or `batchsize`.
///
/// With `nbatches` the result has exactly that many batches (for non-empty
/// input). With `batchsize` it has `ceil(n / batchsize)` batches, none larger
/// than `batchsize`. Zero points give zero batches.
///
/// # Errors
/// `InvalidArgument` if both or neither option is given, either is zero,
/// `x` and `y` differ in length or a coordinate is not finite.
pub fn partition_into_batches(
    x: &[f64],
    y: &[f64],
    nbatches: Option<usize>,
    batchsize: Option<usize>,
) -> Result<BatchAssignment> {
    let target = BatchTarget::from_options(nbatches, batchsize)?;
    partition_with_target(x, y, target)
}

/// Splits points into batches according to `target`.
pub fn partition_with_target(x: &[f64], y: &[f64], target: BatchTarget) -> Result<BatchAssignment> {
    check_lengths(x, y)?;
    check_finite(x, y)?;

    let t0 = Instant::now();
    let n = x.len();
    let k = target.batch_count(n);
    info!(k, ?target, "splitting into batches");

    let sizes = target_sizes(n, k);
    let mut order: Vec<usize> = (0..n).collect();
    let mut batch_ids = vec![0usize; n];
    bisect(x, y, &mut order, &sizes, 0, &mut batch_ids);

    let mut n_per_batch = vec![0usize; k];
    for &b in &batch_ids {
        n_per_batch[b] += 1;
    }
    if n_per_batch != sizes {
        return Err(ClusterError::inconsistent(format!(
            "batch sizes {n_per_batch:?} differ from targets {sizes:?}"
        )));
    }
    if let BatchTarget::Size(limit) = target
        && let Some(&largest) = n_per_batch.iter().max()
        && largest > limit
    {
        return Err(ClusterError::inconsistent(format!(
            "batch of {largest} points exceeds batchsize {limit}"
        )));
    }

    let cells = batch_cells(x, y, &batch_ids, k);
    log_summary(&n_per_batch, t0);

    Ok(BatchAssignment {
        cells,
        batch_ids,
        n_per_batch,
    })
}

/// Largest-remainder split of `n` points over `k` batches.
pub fn target_sizes(n: usize, k: usize) -> Vec<usize> {
    if k == 0 {
        return Vec::new();
    }
    let q = n / k;
    let r = n % k;
    (0..k).map(|i| if i < r { q + 1 } else { q }).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Assigns `ids` to batches `first..first + sizes.len()`.
///
/// Requires `ids.len() == sizes.iter().sum()`.
fn bisect(
    x: &[f64],
    y: &[f64],
    ids: &mut [usize],
    sizes: &[usize],
    first: usize,
    batch_ids: &mut [usize],
) {
    match sizes.len() {
        0 => return,
        1 => {
            for &i in ids.iter() {
                batch_ids[i] = first;
            }
            return;
        }
        _ => {}
    }

    let half = sizes.len() / 2;
    let n_left: usize = sizes[..half].iter().sum();

    if n_left > 0 && n_left < ids.len() {
        let axis = wider_axis(x, y, ids);
        let coord = |i: usize| match axis {
            Axis::X => x[i],
            Axis::Y => y[i],
        };
        // Ties on the coordinate fall back to the point index so the split is
        // fully determined by the input.
        ids.select_nth_unstable_by(n_left, |&a, &b| {
            coord(a).total_cmp(&coord(b)).then(a.cmp(&b))
        });
    }

    let (left, right) = ids.split_at_mut(n_left);
    bisect(x, y, left, &sizes[..half], first, batch_ids);
    bisect(x, y, right, &sizes[half..], first + half, batch_ids);
}

/// Axis with the larger extent over `ids`; x on ties.
fn wider_axis(x: &[f64], y: &[f64], ids: &[usize]) -> Axis {
    match bounding_box(ids.iter().map(|&i| (x[i], y[i]))) {
        Some((x0, y0, x1, y1)) if y1 - y0 > x1 - x0 => Axis::Y,
        _ => Axis::X,
    }
}

fn batch_cells(x: &[f64], y: &[f64], batch_ids: &[usize], k: usize) -> Vec<BatchCell> {
    let mut members: Vec<Vec<Point>> = vec![Vec::new(); k];
    for (i, &b) in batch_ids.iter().enumerate() {
        members[b].push((x[i], y[i]));
    }
    members
        .into_iter()
        .map(|pts| {
            let count = pts.len();
            let centroid = (count > 0).then(|| {
                let (sx, sy) = pts
                    .iter()
                    .fold((0.0, 0.0), |(sx, sy), &(px, py)| (sx + px, sy + py));
                (sx / count as f64, sy / count as f64)
            });
            BatchCell {
                count,
                centroid,
                bbox: bounding_box(pts),
            }
        })
        .collect()
}

fn log_summary(n_per_batch: &[usize], t0: Instant) {
    let k = n_per_batch.len();
    if k == 0 {
        debug!("no points to batch");
        return;
    }
    let mean = n_per_batch.iter().sum::<usize>() as f64 / k as f64;
    let var = n_per_batch
        .iter()
        .map(|&c| (c as f64 - mean).powi(2))
        .sum::<f64>()
        / k as f64;
    let min = n_per_batch.iter().copied().min().unwrap_or(0);
    let max = n_per_batch.iter().copied().max().unwrap_or(0);
    info!(
        elapsed_s = t0.elapsed().as_secs_f64(),
        mean,
        min,
        max,
        std = var.sqrt(),
        "batching complete"
    );
}
