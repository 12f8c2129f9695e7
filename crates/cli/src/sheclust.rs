//! sheclust - group and batch object catalogs
//!
//! Reads a JSON catalog of object positions and writes either group
//! assignments (objects whose separations chain together under a threshold)
//! or batch assignments for distributing work over parallel jobs.

mod catalog;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use sheclust_core::coordinates::{Region, reproject_to_equator, subregion};
use sheclust_core::params::DEFAULT_SEP;
use sheclust_core::{GroupingParams, IndexKind, identify_all_groups_with, partition_into_batches};
use tracing::info;
use tracing_subscriber::EnvFilter;

use catalog::{BatchesOutput, Catalog, GroupsOutput, write_json};

/// Spatial index used for neighbour queries.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum IndexArg {
    /// Hash grid of cells (default)
    #[default]
    Cells,
    /// Static packed R-tree
    Packed,
    /// Dynamic R-tree
    Dynamic,
}

impl From<IndexArg> for IndexKind {
    fn from(arg: IndexArg) -> Self {
        match arg {
            IndexArg::Cells => Self::Cells,
            IndexArg::Packed => Self::Packed,
            IndexArg::Dynamic => Self::Dynamic,
        }
    }
}

/// Group and batch object catalogs for shear measurement.
#[derive(Parser, Debug)]
#[command(name = "sheclust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Identify groups of objects closer than a separation threshold
    Groups(GroupsArgs),
    /// Partition objects into processing batches
    Batches(BatchesArgs),
}

#[derive(Args, Debug)]
struct GroupsArgs {
    /// Path to a JSON catalog {"x": [...], "y": [...]}, or - for stdin
    catalog: PathBuf,

    /// Separation threshold, in catalog units (degrees with --sky)
    #[arg(short = 's', long, default_value_t = DEFAULT_SEP)]
    sep: f64,

    /// Spatial index backend
    #[arg(long, value_enum, default_value_t = IndexArg::Cells)]
    index: IndexArg,

    /// Treat x/y as RA/Dec in degrees and reproject the field to the equator
    /// before grouping. Output coordinates are the reprojected ones.
    #[arg(long, action = ArgAction::SetTrue)]
    sky: bool,

    /// Move grouped objects to the centre of mass of their group
    #[arg(long, action = ArgAction::SetTrue)]
    merge: bool,

    /// Only consider objects strictly inside xmin,xmax,ymin,ymax
    #[arg(long, value_parser = parse_region)]
    region: Option<Region>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,
}

#[derive(Args, Debug)]
struct BatchesArgs {
    /// Path to a JSON catalog {"x": [...], "y": [...]}, or - for stdin
    catalog: PathBuf,

    /// Number of batches to produce
    #[arg(short = 'n', long, conflicts_with = "batchsize")]
    nbatches: Option<usize>,

    /// Maximum number of objects per batch
    #[arg(short = 'b', long)]
    batchsize: Option<usize>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,
}

/// Parse a region given as four comma-separated numbers.
fn parse_region(s: &str) -> std::result::Result<Region, String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid float value: {}", v.trim()))
        })
        .collect::<std::result::Result<_, _>>()?;
    match values[..] {
        [xmin, xmax, ymin, ymax] if xmin < xmax && ymin < ymax => {
            Ok(Region::new(xmin, xmax, ymin, ymax))
        }
        [_, _, _, _] => Err(format!("region must satisfy xmin < xmax and ymin < ymax: {s}")),
        _ => Err(format!("region needs 4 values xmin,xmax,ymin,ymax, got {}", values.len())),
    }
}

fn run_groups(args: &GroupsArgs) -> Result<()> {
    let Catalog { mut x, mut y } = Catalog::load(&args.catalog)?;

    let indices = match &args.region {
        Some(region) => {
            let sub = subregion(&x, &y, region)?;
            info!(selected = sub.indices.len(), total = x.len(), "selected subregion");
            x = sub.x;
            y = sub.y;
            Some(sub.indices)
        }
        None => None,
    };

    if args.sky && !x.is_empty() {
        (x, y) = reproject_to_equator(&x, &y).context("failed to reproject catalog")?;
    }

    let params = GroupingParams::new(args.sep).with_index(args.index.into());
    let groups = identify_all_groups_with(&x, &y, &params)?;
    let n_groups = groups.n_groups();
    let (x, y) = if args.merge {
        groups.merged_positions()
    } else {
        (groups.x, groups.y)
    };

    write_json(
        &args.outfile,
        &GroupsOutput {
            x,
            y,
            group_ids: groups.group_ids,
            n_groups,
            indices,
        },
    )
}

fn run_batches(args: &BatchesArgs) -> Result<()> {
    let catalog = Catalog::load(&args.catalog)?;
    let batches = partition_into_batches(&catalog.x, &catalog.y, args.nbatches, args.batchsize)?;
    write_json(&args.outfile, &BatchesOutput::from(batches))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();

    match &cli.command {
        Command::Groups(args) => run_groups(args),
        Command::Batches(args) => run_batches(args),
    }
}
