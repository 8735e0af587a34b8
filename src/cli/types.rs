use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::array::Layer;
use crate::commands::OpWarning;
use crate::mapping::Granularity;
use crate::model::PixelType;

#[derive(Debug, Parser)]
#[command(
    name = "segcorrect",
    version,
    about = "Headless correction tools for n-dimensional label images"
)]
pub(super) struct Cli {
    #[command(subcommand)]
    pub(super) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(super) enum Commands {
    /// Prints shape, pixel type and dimension info of a file or slice directory.
    Info {
        input: PathBuf,
    },
    Ops {
        #[command(subcommand)]
        command: OpsCommand,
    },
    /// Runs one registered operation and writes the resulting layer.
    Apply {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        op: String,
        /// Operation parameters as a JSON object.
        #[arg(long, default_value = "{}")]
        params: String,
        /// Second image for mask filters and arithmetic.
        #[arg(long)]
        operand: Option<PathBuf>,
        /// Indices along the first axis; defaults depend on the layer.
        #[arg(long, value_delimiter = ',')]
        slices: Option<Vec<usize>>,
        /// Time point used by a single-frame mask.
        #[arg(long, default_value_t = 0)]
        current_step: usize,
        /// Apply a single-frame mask to every time point.
        #[arg(long)]
        all_time_points: bool,
        #[arg(long)]
        output: PathBuf,
    },
    /// Runs a JSON/YAML recipe.
    Run {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        recipe: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Interpolates a binary mask between its populated slices.
    Interpolate {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    Save(SaveArgs),
    /// Copies the label under a position from one layer into another.
    Copy(CopyArgs),
}

#[derive(Debug, Subcommand)]
pub(super) enum OpsCommand {
    List,
}

#[derive(Debug, Args)]
pub(super) struct SaveArgs {
    #[arg(long)]
    pub(super) input: PathBuf,
    #[arg(long)]
    pub(super) output: PathBuf,
    #[arg(long)]
    pub(super) file_name: Option<String>,
    #[arg(long, default_value = "u16")]
    pub(super) pixel_type: PixelType,
    /// Write one file per index along the first axis.
    #[arg(long)]
    pub(super) split_time_points: bool,
}

#[derive(Debug, Args)]
pub(super) struct CopyArgs {
    #[arg(long)]
    pub(super) source: PathBuf,
    #[arg(long)]
    pub(super) target: PathBuf,
    /// World coordinates of the click, one per viewer axis.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub(super) position: Vec<f64>,
    /// Viewer axes on screen; the last two axes when omitted.
    #[arg(long, value_delimiter = ',')]
    pub(super) dims_displayed: Option<Vec<usize>>,
    /// Viewer navigation index per axis.
    #[arg(long, value_delimiter = ',')]
    pub(super) current_step: Option<Vec<usize>>,
    #[arg(long, default_value = "slice")]
    pub(super) granularity: Granularity,
    #[arg(long)]
    pub(super) preserve_source_value: bool,
    #[arg(long)]
    pub(super) preserve_target_labels: bool,
    /// Answer yes to data type conversion and slow copy prompts.
    #[arg(long)]
    pub(super) yes: bool,
    #[arg(long)]
    pub(super) output: PathBuf,
}

#[derive(Debug, Serialize)]
pub(super) struct LayerInfo {
    pub(super) name: String,
    pub(super) shape: Vec<usize>,
    pub(super) ndim: usize,
    pub(super) pixel_type: PixelType,
    pub(super) lazy: bool,
    pub(super) axes: Vec<String>,
    pub(super) scale: Vec<f64>,
    pub(super) max_label: f64,
    pub(super) granularities: Vec<Granularity>,
}

#[derive(Debug, Serialize)]
pub(super) struct RunSummary {
    pub(super) layer: String,
    pub(super) shape: Vec<usize>,
    pub(super) written: Vec<PathBuf>,
    pub(super) warnings: Vec<String>,
}

impl RunSummary {
    pub(super) fn new(layer: &Layer, written: Vec<PathBuf>, warnings: &[OpWarning]) -> Self {
        Self {
            layer: layer.name.clone(),
            shape: layer.shape(),
            written,
            warnings: warnings.iter().map(ToString::to_string).collect(),
        }
    }
}
