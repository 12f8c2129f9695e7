//! JSON catalogs in and assignments out.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use sheclust_core::{BatchAssignment, BatchCell};

/// Object positions, `{"x": [...], "y": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Catalog {
    /// Reads a catalog from `path`, or stdin when `path` is `-`.
    pub fn load(path: &Path) -> Result<Self> {
        let reader: Box<dyn Read> = if path.as_os_str() == "-" {
            Box::new(io::stdin().lock())
        } else {
            let file = File::open(path)
                .with_context(|| format!("failed to open catalog {}", path.display()))?;
            Box::new(BufReader::new(file))
        };
        let catalog: Self = serde_json::from_reader(reader)
            .with_context(|| format!("failed to parse catalog {}", path.display()))?;
        ensure!(
            catalog.x.len() == catalog.y.len(),
            "catalog {} has {} x values but {} y values",
            path.display(),
            catalog.x.len(),
            catalog.y.len()
        );
        Ok(catalog)
    }
}

#[derive(Debug, Serialize)]
pub struct GroupsOutput {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub group_ids: Vec<i64>,
    pub n_groups: usize,
    /// Catalog row of each output point when a region was selected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indices: Option<Vec<usize>>,
}

#[derive(Debug, Serialize)]
pub struct CellOutput {
    pub count: usize,
    pub centroid: Option<[f64; 2]>,
    pub bbox: Option<[f64; 4]>,
}

impl From<&BatchCell> for CellOutput {
    fn from(cell: &BatchCell) -> Self {
        Self {
            count: cell.count,
            centroid: cell.centroid.map(|(x, y)| [x, y]),
            bbox: cell.bbox.map(|(x0, y0, x1, y1)| [x0, y0, x1, y1]),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchesOutput {
    pub batch_ids: Vec<usize>,
    pub n_per_batch: Vec<usize>,
    pub cells: Vec<CellOutput>,
}

impl From<BatchAssignment> for BatchesOutput {
    fn from(batches: BatchAssignment) -> Self {
        Self {
            cells: batches.cells.iter().map(CellOutput::from).collect(),
            batch_ids: batches.batch_ids,
            n_per_batch: batches.n_per_batch,
        }
    }
}

/// Writes `value` as JSON to `outfile`, or stdout when `outfile` is `-`.
pub fn write_json<T: Serialize>(outfile: &str, value: &T) -> Result<()> {
    let mut output: Box<dyn Write> = if outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(outfile)
            .with_context(|| format!("failed to create output file {outfile}"))?;
        Box::new(BufWriter::new(file))
    };
    serde_json::to_writer(&mut output, value).context("failed to write JSON output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_parses_from_json() {
        let catalog: Catalog = serde_json::from_str(r#"{"x": [1.0, 2.5], "y": [0, 3]}"#).unwrap();
        assert_eq!(catalog.x, vec![1.0, 2.5]);
        assert_eq!(catalog.y, vec![0.0, 3.0]);
    }

    #[test]
    fn empty_batch_serializes_nulls() {
        let cell = BatchCell {
            count: 0,
            centroid: None,
            bbox: None,
        };
        let json = serde_json::to_string(&CellOutput::from(&cell)).unwrap();
        assert_eq!(json, r#"{"count":0,"centroid":null,"bbox":null}"#);
    }

    #[test]
    fn group_output_omits_indices_without_region() {
        let out = GroupsOutput {
            x: vec![0.0],
            y: vec![1.0],
            group_ids: vec![-1],
            n_groups: 0,
            indices: None,
        };
        let json = serde_json::to_string(&out).unwrap();
        assert_eq!(json, r#"{"x":[0.0],"y":[1.0],"group_ids":[-1],"n_groups":0}"#);
    }
}
