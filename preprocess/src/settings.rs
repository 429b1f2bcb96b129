//! Resolve run settings from the settings file and the command line.

use anyhow::{anyhow, Result};
use answer_mining::MinerConfig;
use common::utils::config::AppConfig;
use tracing::info;

use crate::args::Config;

/// Fully resolved settings for one preprocessing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub workers: usize,
    pub ordered: bool,
    pub progress: bool,
    pub miner: MinerConfig,
}

impl PipelineSettings {
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            ordered: false,
            progress: false,
            miner: MinerConfig::default(),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

/// Command-line flags win over settings-file values; the worker count falls
/// back to the number of available CPUs.
pub fn resolve_settings(config: &Config, file: &AppConfig) -> Result<PipelineSettings> {
    let workers = match (config.max_workers, file.max_workers) {
        (Some(cli), Some(from_file)) if cli != from_file => {
            info!(
                workers = cli,
                configured = from_file,
                "Overriding configured worker count for this run"
            );
            cli
        }
        (Some(cli), _) => cli,
        (None, Some(from_file)) => from_file,
        (None, None) => default_workers(),
    };
    if workers == 0 {
        return Err(anyhow!("max_workers must be greater than zero"));
    }

    let span_window = match config.span_window {
        Some(cli) => {
            if cli != file.span_window {
                info!(
                    span_window = cli,
                    configured = file.span_window,
                    "Overriding configured span window for this run"
                );
            }
            cli
        }
        None => file.span_window,
    };
    if span_window == 0 {
        return Err(anyhow!("span_window must be greater than zero"));
    }

    Ok(PipelineSettings {
        workers,
        ordered: config.ordered || file.ordered,
        progress: file.progress && !config.no_progress,
        miner: MinerConfig {
            span_window,
            question_fallback: config.question_fallback || file.question_fallback,
        },
    })
}
