//! Python bindings for sheclust
//!
//! Exposes group identification, batch partitioning and the coordinate
//! helpers to the Python pipeline under their familiar names.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use sheclust_core::coordinates::{self, Region};
use sheclust_core::params::DEFAULT_SEP;
use sheclust_core::{ClusterError, UNGROUPED};

fn to_py_err(err: ClusterError) -> PyErr {
    match err {
        ClusterError::InvalidArgument(msg) => PyValueError::new_err(msg),
        ClusterError::InternalInconsistency(msg) => PyRuntimeError::new_err(msg),
    }
}

/// Converts an optional count from Python, rejecting zero and negative values.
fn positive_option(name: &str, value: Option<i64>) -> Result<Option<usize>, ClusterError> {
    value
        .map(|v| match usize::try_from(v) {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(ClusterError::InvalidArgument(format!(
                "{name} must be positive (got {v})"
            ))),
        })
        .transpose()
}

/// Finds groups of objects whose separations chain together under `sep`.
///
/// Returns `(x, y, group_ids)`; ungrouped objects have group id -1.
#[pyfunction]
#[pyo3(signature = (x, y, sep = DEFAULT_SEP))]
fn identify_all_groups(
    py: Python<'_>,
    x: Vec<f64>,
    y: Vec<f64>,
    sep: f64,
) -> PyResult<(Vec<f64>, Vec<f64>, Vec<i64>)> {
    let groups = py
        .detach(|| sheclust_core::identify_all_groups(&x, &y, sep))
        .map_err(to_py_err)?;
    Ok((groups.x, groups.y, groups.group_ids))
}

/// Splits objects into batches, given exactly one of `nbatches` or `batchsize`.
///
/// Returns `(centres, batch_ids, n_per_batch)` where `centres` holds the
/// `(x, y)` centroid of every batch (None for an empty batch).
#[pyfunction]
#[pyo3(signature = (x, y, nbatches = None, batchsize = None))]
#[allow(clippy::type_complexity)]
fn partition_into_batches(
    py: Python<'_>,
    x: Vec<f64>,
    y: Vec<f64>,
    nbatches: Option<i64>,
    batchsize: Option<i64>,
) -> PyResult<(Vec<Option<(f64, f64)>>, Vec<usize>, Vec<usize>)> {
    let nbatches = positive_option("nbatches", nbatches).map_err(to_py_err)?;
    let batchsize = positive_option("batchsize", batchsize).map_err(to_py_err)?;
    let batches = py
        .detach(|| sheclust_core::partition_into_batches(&x, &y, nbatches, batchsize))
        .map_err(to_py_err)?;
    let centres = batches.cells.iter().map(|cell| cell.centroid).collect();
    Ok((centres, batches.batch_ids, batches.n_per_batch))
}

/// Moves grouped objects to the centre of mass of their group.
#[pyfunction]
fn merge_group_positions(
    x: Vec<f64>,
    y: Vec<f64>,
    group_ids: Vec<i64>,
) -> PyResult<(Vec<f64>, Vec<f64>)> {
    sheclust_core::merge_group_positions(&x, &y, &group_ids).map_err(to_py_err)
}

/// Rotates RA/Dec (degrees) so the field's centre of mass is at (0, 0).
#[pyfunction]
fn reproject_to_equator(ras: Vec<f64>, decs: Vec<f64>) -> PyResult<(Vec<f64>, Vec<f64>)> {
    coordinates::reproject_to_equator(&ras, &decs).map_err(to_py_err)
}

/// Selects objects strictly inside the rectangle, returning `(x, y, indices)`.
#[pyfunction]
fn get_subregion(
    x: Vec<f64>,
    y: Vec<f64>,
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
) -> PyResult<(Vec<f64>, Vec<f64>, Vec<usize>)> {
    let sub = coordinates::subregion(&x, &y, &Region::new(xmin, xmax, ymin, ymax))
        .map_err(to_py_err)?;
    Ok((sub.x, sub.y, sub.indices))
}

/// Great-circle distance in degrees between two sky positions in degrees.
#[pyfunction]
fn haversine_metric_deg(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    coordinates::haversine_metric_deg(lon1, lat1, lon2, lat2)
}

#[pymodule]
fn _sheclust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("UNGROUPED", UNGROUPED)?;
    m.add("DEFAULT_SEP", DEFAULT_SEP)?;
    m.add_function(wrap_pyfunction!(identify_all_groups, m)?)?;
    m.add_function(wrap_pyfunction!(partition_into_batches, m)?)?;
    m.add_function(wrap_pyfunction!(merge_group_positions, m)?)?;
    m.add_function(wrap_pyfunction!(reproject_to_equator, m)?)?;
    m.add_function(wrap_pyfunction!(get_subregion, m)?)?;
    m.add_function(wrap_pyfunction!(haversine_metric_deg, m)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_options_must_be_positive() {
        assert_eq!(positive_option("nbatches", None), Ok(None));
        assert_eq!(positive_option("nbatches", Some(4)), Ok(Some(4)));
        for bad in [0, -1, i64::MIN] {
            assert!(matches!(
                positive_option("batchsize", Some(bad)),
                Err(ClusterError::InvalidArgument(_))
            ));
        }
    }
}
