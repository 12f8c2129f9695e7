//! Grouping and batching parameters.
//!
//! Contains GroupingParams and BatchTarget for controlling how points are
//! grouped into blends and split into processing batches.

use crate::error::{ClusterError, Result};

/// Default separation threshold, in the units of the input coordinates.
pub const DEFAULT_SEP: f64 = 10.0;

/// Which spatial index backs neighbour discovery.
///
/// The R-tree backends visit every neighbour of every point, which grows
/// quadratically when `sep` covers most of the field. The cell grid links
/// whole cells at once and stays near-linear on dense input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexKind {
    /// Hash grid with cells of side `sep / 2`.
    #[default]
    Cells,
    /// Static, Hilbert-packed R-tree built once from all points.
    Packed,
    /// Bulk-loaded rstar R-tree.
    Dynamic,
}

/// Parameters for group identification.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingParams {
    /// Two points closer than or exactly at this distance are neighbours.
    pub sep: f64,

    /// Spatial index used for radius queries.
    pub index: IndexKind,
}

impl Default for GroupingParams {
    fn default() -> Self {
        Self {
            sep: DEFAULT_SEP,
            index: IndexKind::default(),
        }
    }
}

impl GroupingParams {
    /// Creates grouping parameters with the given separation and the default index.
    pub fn new(sep: f64) -> Self {
        Self {
            sep,
            ..Self::default()
        }
    }

    /// Returns a copy using the given index backend.
    pub fn with_index(mut self, index: IndexKind) -> Self {
        self.index = index;
        self
    }

    /// Checks the separation is positive and finite.
    pub fn validate(&self) -> Result<()> {
        if !self.sep.is_finite() || self.sep <= 0.0 {
            return Err(ClusterError::invalid(format!(
                "sep must be positive and finite (got {})",
                self.sep
            )));
        }
        Ok(())
    }
}

/// How many batches to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchTarget {
    /// Exactly this many batches.
    Count(usize),
    /// As many batches as needed so none holds more than this many points.
    Size(usize),
}

impl BatchTarget {
    /// Resolves the `nbatches` / `batchsize` option pair.
    ///
    /// Exactly one must be given and it must be non-zero.
    pub fn from_options(nbatches: Option<usize>, batchsize: Option<usize>) -> Result<Self> {
        match (nbatches, batchsize) {
            (Some(_), Some(_)) => Err(ClusterError::invalid(
                "only one of nbatches and batchsize may be given",
            )),
            (None, None) => Err(ClusterError::invalid(
                "one of nbatches and batchsize must be given",
            )),
            (Some(0), None) => Err(ClusterError::invalid("nbatches must be positive")),
            (None, Some(0)) => Err(ClusterError::invalid("batchsize must be positive")),
            (Some(k), None) => Ok(Self::Count(k)),
            (None, Some(size)) => Ok(Self::Size(size)),
        }
    }

    /// Number of batches for `n` points. Zero points always gives zero batches.
    pub fn batch_count(self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        match self {
            Self::Count(k) => k,
            Self::Size(size) => n.div_ceil(size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grouping_params_match_pipeline_default() {
        let params = GroupingParams::default();
        assert_eq!(params.sep, 10.0);
        assert_eq!(params.index, IndexKind::Cells);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn non_positive_sep_is_invalid() {
        for sep in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(GroupingParams::new(sep).validate().is_err(), "sep={sep}");
        }
    }

    #[test]
    fn batch_target_requires_exactly_one_option() {
        assert!(BatchTarget::from_options(None, None).is_err());
        assert!(BatchTarget::from_options(Some(3), Some(4)).is_err());
        assert!(BatchTarget::from_options(Some(0), None).is_err());
        assert!(BatchTarget::from_options(None, Some(0)).is_err());
        assert_eq!(
            BatchTarget::from_options(Some(3), None),
            Ok(BatchTarget::Count(3))
        );
        assert_eq!(
            BatchTarget::from_options(None, Some(20)),
            Ok(BatchTarget::Size(20))
        );
    }

    #[test]
    fn batch_count_rounds_up_for_size_target() {
        assert_eq!(BatchTarget::Size(20).batch_count(10_000), 500);
        assert_eq!(BatchTarget::Size(20).batch_count(10_001), 501);
        assert_eq!(BatchTarget::Size(20).batch_count(1), 1);
        assert_eq!(BatchTarget::Count(7).batch_count(3), 7);
        assert_eq!(BatchTarget::Count(7).batch_count(0), 0);
    }
}
