//! sheclust - spatial grouping and batching of object catalogs.
//!
//! Groups objects whose separations chain together under a threshold
//! ("blends") and splits large catalogs into balanced, spatially compact
//! batches for parallel shear measurement.

pub mod batching;
pub mod coordinates;
pub mod error;
pub mod grouping;
pub mod params;
pub mod spatial;

pub use batching::{BatchAssignment, BatchCell, partition_into_batches, partition_with_target};
pub use error::{ClusterError, Result};
pub use grouping::{
    GroupAssignment, UNGROUPED, identify_all_groups, identify_all_groups_with,
    merge_group_positions,
};
pub use params::{BatchTarget, GroupingParams, IndexKind};
