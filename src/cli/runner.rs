use std::path::{Path, PathBuf};

use clap::Parser;
use serde_json::{Value, json};

use crate::array::Layer;
use crate::commands::{Arithmetic, get_points};
use crate::copy::{AutoConfirm, ClickEvent, CopyOptions, CopyOutcome, CopyPrompt, LabelCopier};
use crate::engine::{FixedDirectory, SliceSelection};
use crate::mapping::Granularity;
use crate::runtime::{AppContext, MaskFilterRequest, SaveOptions};

use super::types::{Cli, Commands, CopyArgs, LayerInfo, OpsCommand, RunSummary, SaveArgs};

fn load(app: &AppContext, path: &Path) -> Result<Layer, String> {
    app.io_service().load(path).map_err(|error| error.to_string())
}

/// Writes `layer` into `output` unless a transform already left it on disk in `output_dir`.
fn write_result(
    app: &AppContext,
    layer: &Layer,
    output_dir: Option<PathBuf>,
    output: &Path,
) -> Result<Vec<PathBuf>, String> {
    if let Some(dir) = output_dir {
        return Ok(vec![dir]);
    }
    let options = SaveOptions {
        pixel_type: layer.pixel_type(),
        ..SaveOptions::default()
    };
    app.io_service()
        .save_labels(layer, output, &options)
        .map_err(|error| error.to_string())
}

fn print_json(value: &impl serde::Serialize) -> Result<(), String> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).map_err(|error| error.to_string())?
    );
    Ok(())
}

fn mask_filter_keep(op: &str) -> Option<bool> {
    match op {
        "filter.mask.keep" => Some(true),
        "filter.mask.delete" => Some(false),
        _ => None,
    }
}

fn point_filter_keep(op: &str) -> Option<bool> {
    match op {
        "filter.points.keep" => Some(true),
        "filter.points.delete" => Some(false),
        _ => None,
    }
}

pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    let app = AppContext::new();

    match cli.command {
        Commands::Info { input } => {
            let mut layer = load(&app, &input)?;
            let dims = app
                .layer_service()
                .inspect(&mut layer)
                .map_err(|error| error.to_string())?;
            let info = LayerInfo {
                name: layer.name.clone(),
                shape: layer.shape(),
                ndim: layer.ndim(),
                pixel_type: layer.pixel_type(),
                lazy: layer.data.is_chunked(),
                axes: dims.axis_names.iter().map(ToString::to_string).collect(),
                scale: dims.axis_scale.clone(),
                max_label: layer.data.max_value().map_err(|error| error.to_string())?,
                granularities: Granularity::available(layer.ndim(), layer.ndim()),
            };
            print_json(&info)?;
        }
        Commands::Ops { command } => match command {
            OpsCommand::List => {
                print_json(&app.ops_service().list())?;
            }
        },
        Commands::Apply {
            input,
            op,
            params,
            operand,
            slices,
            current_step,
            all_time_points,
            output,
        } => {
            let params: Value = serde_json::from_str(&params).map_err(|error| error.to_string())?;
            let layer = load(&app, &input)?;
            let operand = operand.map(|path| load(&app, &path)).transpose()?;
            let need_operand = || {
                operand
                    .as_ref()
                    .ok_or_else(|| format!("`{op}` needs --operand"))
            };
            let picker = FixedDirectory(output.clone());
            let ops = app.ops_service();

            let result = if let Some(operation) = Arithmetic::from_op_name(&op) {
                let adjust = params
                    .get("adjust_dtype")
                    .and_then(Value::as_bool)
                    .unwrap_or(true);
                ops.combine(&layer, need_operand()?, operation, adjust, &picker)
            } else if let Some(keep) = mask_filter_keep(&op) {
                let request = MaskFilterRequest {
                    keep,
                    current_step,
                    all_time_points,
                };
                ops.filter_by_mask(&layer, need_operand()?, request, &picker)
            } else if let Some(keep) = point_filter_keep(&op) {
                let points = get_points(&params, "points").map_err(|error| error.to_string())?;
                ops.filter_by_points(&layer, &points, keep)
            } else if op == "mask.interpolate" {
                ops.interpolate(&layer, &picker)
            } else if let Some(slices) = slices {
                ops.run(&layer, &op, &params, SliceSelection::Many(slices), &picker)
            } else {
                ops.run_segmentation(&layer, &op, &params, &picker)
            };
            let run = result.map_err(|error| error.to_string())?;

            let written = write_result(&app, &run.layer, run.output_dir.clone(), &output)?;
            print_json(&RunSummary::new(&run.layer, written, &run.warnings))?;
        }
        Commands::Run {
            input,
            recipe,
            output,
            report,
        } => {
            let layer = load(&app, &input)?;
            let spec = app
                .pipeline_service()
                .load_spec(&recipe)
                .map_err(|error| error.to_string())?;
            let (result, run_report) = app
                .pipeline_service()
                .run(&spec, &layer, &FixedDirectory(output.clone()))
                .map_err(|error| error.to_string())?;
            let last_dir = run_report
                .steps
                .last()
                .and_then(|step| step.output_dir.clone());
            write_result(&app, &result, last_dir, &output)?;
            if let Some(report_path) = report {
                app.pipeline_service()
                    .save_report(report_path, &run_report)
                    .map_err(|error| error.to_string())?;
            }
            print_json(&run_report)?;
        }
        Commands::Interpolate { input, output } => {
            let layer = load(&app, &input)?;
            let run = app
                .ops_service()
                .interpolate(&layer, &FixedDirectory(output.clone()))
                .map_err(|error| error.to_string())?;
            let written = write_result(&app, &run.layer, run.output_dir.clone(), &output)?;
            print_json(&RunSummary::new(&run.layer, written, &run.warnings))?;
        }
        Commands::Save(args) => save(&app, args)?,
        Commands::Copy(args) => copy_label(&app, args)?,
    }

    Ok(())
}

fn save(app: &AppContext, args: SaveArgs) -> Result<(), String> {
    let layer = load(app, &args.input)?;
    let options = SaveOptions {
        file_name: args.file_name,
        pixel_type: args.pixel_type,
        split_time_points: args.split_time_points,
    };
    let written = app
        .io_service()
        .save_labels(&layer, &args.output, &options)
        .map_err(|error| error.to_string())?;
    print_json(&RunSummary::new(&layer, written, &[]))
}

#[cfg(feature = "dialogs")]
fn interactive_prompt() -> &'static dyn CopyPrompt {
    &crate::runtime::NativePrompt
}

/// Without native dialogs every prompt is answered with no.
#[cfg(not(feature = "dialogs"))]
fn interactive_prompt() -> &'static dyn CopyPrompt {
    &crate::copy::AutoDecline
}

fn copy_label(app: &AppContext, args: CopyArgs) -> Result<(), String> {
    let source = load(app, &args.source)?;
    let mut target = load(app, &args.target)?;
    let viewer_rank = args.position.len();
    let dims_displayed = args.dims_displayed.unwrap_or_else(|| {
        vec![viewer_rank.saturating_sub(2), viewer_rank.saturating_sub(1)]
    });
    let mut event = ClickEvent::new(args.position, dims_displayed);
    if let Some(step) = args.current_step {
        event = event.with_current_step(step);
    }
    let mut copier = LabelCopier::new(CopyOptions {
        granularity: args.granularity,
        preserve_source_value: args.preserve_source_value,
        preserve_target_labels: args.preserve_target_labels,
    });
    let prompt: &dyn CopyPrompt = if args.yes {
        &AutoConfirm
    } else {
        interactive_prompt()
    };
    let outcome = copier
        .copy_label(&event, &source, &mut target, prompt)
        .map_err(|error| error.to_string())?;

    let summary = match outcome {
        CopyOutcome::Copied { label, promoted } => {
            let written = write_result(app, &target, None, &args.output)?;
            json!({ "copied": label, "promoted": promoted, "written": written })
        }
        CopyOutcome::Ignored => json!({ "copied": null, "reason": "background or no copy modifier" }),
        CopyOutcome::Declined => json!({ "copied": null, "reason": "declined" }),
    };
    print_json(&summary)
}
