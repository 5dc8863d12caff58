use std::path::PathBuf;
use std::time::Duration;

use crate::args::LatencyArgs;
use crate::correlation::CorrelatorConfig;
use crate::dispatch::{DispatchConfig, JitterRange};
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::TriggerSpec;
use crate::servicebus::ServiceBusConfig;
use crate::streams::FanInConfig;

use super::pipeline::PipelineSettings;

/// Everything a run needs, resolved from CLI and config.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub work_items: PathBuf,
    pub streams: PathBuf,
    pub trigger: TriggerSpec,
    pub service_bus: ServiceBusConfig,
    pub pipeline: PipelineSettings,
    /// Total run time; `None` runs until interrupted.
    pub run_for: Option<Duration>,
}

impl RunPlan {
    /// # Errors
    ///
    /// Returns an error when a required input is missing or the delay range
    /// is inverted.
    pub fn from_args(args: LatencyArgs) -> AppResult<Self> {
        let work_items = args.work_items.ok_or_else(|| {
            tracing::error!("Missing work items file (set --work-items or provide in config).");
            AppError::validation(ValidationError::MissingWorkItems)
        })?;
        let streams = args.streams.ok_or_else(|| {
            tracing::error!("Missing streams file (set --streams or provide in config).");
            AppError::validation(ValidationError::MissingStreams)
        })?;
        let trigger_url = args
            .trigger_url
            .ok_or_else(|| AppError::validation(ValidationError::MissingTriggerUrl))?;
        let jitter = JitterRange::new(args.min_delay, args.max_delay)?;

        Ok(Self {
            work_items: PathBuf::from(work_items),
            streams: PathBuf::from(streams),
            trigger: TriggerSpec {
                method: args.trigger_method,
                url: trigger_url,
                body: args.trigger_body,
                headers: args.trigger_headers,
                timeout: args.trigger_timeout,
                insecure: args.insecure,
            },
            service_bus: ServiceBusConfig {
                receive_timeout: args.receive_timeout,
                ..ServiceBusConfig::default()
            },
            pipeline: PipelineSettings {
                dispatch: DispatchConfig {
                    concurrency: args.concurrency.get(),
                    jitter,
                    rate: args.rate.map(|rate| rate.get()),
                    max_dispatches: args.max_dispatches.map(|limit| limit.get()),
                },
                correlator: CorrelatorConfig {
                    confirmation_kind: args.confirmation_kind,
                    late_threshold: args.threshold,
                },
                fan_in: FanInConfig {
                    channel_capacity: args.channel_capacity.get(),
                    reconnect_delay: args.reconnect_delay,
                },
                on_time_log: PathBuf::from(args.on_time_log),
                late_log: PathBuf::from(args.late_log),
                store_ttl: args.store_ttl,
                sweep_interval: args.sweep_interval,
            },
            run_for: args.duration,
        })
    }
}
