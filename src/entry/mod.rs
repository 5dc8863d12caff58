mod pipeline;
mod plan;


use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::info;

use crate::args::LatencyArgs;
use crate::config::{DEFAULT_CONFIG_FILES, apply_config, load_config};
use crate::error::AppResult;
use crate::http::HttpTrigger;
use crate::inputs::{load_stream_descriptors, load_work_items};
use crate::servicebus::ServiceBusSource;
use crate::shutdown::shutdown_channel;
use crate::system::shutdown_handlers::{
    setup_duration_shutdown_handler, setup_signal_shutdown_handler,
};
use crate::system::summary_lines;

pub use pipeline::{Collaborators, PipelineReport, PipelineSettings, run_pipeline};
pub use plan::RunPlan;

/// Parses the command line, runs the harness until shutdown and prints the
/// summary.
///
/// # Errors
///
/// Returns an error when arguments, config or startup inputs are invalid, or
/// when the outcome logs cannot be created.
pub fn run() -> AppResult<()> {
    let Some((mut args, matches)) = parse_args()? else {
        return Ok(());
    };
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    crate::system::logger::init_logging(args.verbose, args.no_color);

    let plan = RunPlan::from_args(args)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(plan))
}

fn parse_args() -> AppResult<Option<(LatencyArgs, ArgMatches)>> {
    let mut cmd = LatencyArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = LatencyArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

async fn run_async(plan: RunPlan) -> AppResult<()> {
    let work_items = load_work_items(&plan.work_items)?;
    let streams = load_stream_descriptors(&plan.streams)?;
    info!(
        "Loaded {} work items and {} streams.",
        work_items.len(),
        streams.len()
    );

    let collaborators = Collaborators {
        trigger: Arc::new(HttpTrigger::new(plan.trigger)?),
        source: Arc::new(ServiceBusSource::new(plan.service_bus)?),
    };

    let (shutdown_tx, _) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);
    let timer_handle = plan
        .run_for
        .map(|run_for| setup_duration_shutdown_handler(&shutdown_tx, run_for));

    let report = run_pipeline(
        &plan.pipeline,
        work_items,
        streams,
        collaborators,
        &shutdown_tx,
    )
    .await;

    drop(shutdown_tx.send(()));
    signal_handle.await?;
    if let Some(handle) = timer_handle {
        handle.await?;
    }

    let report = report?;
    for line in summary_lines(&report.snapshot, &report.latency) {
        println!("{}", line);
    }
    Ok(())
}
