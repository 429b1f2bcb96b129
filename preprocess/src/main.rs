use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
};

use anyhow::{anyhow, Context};
use common::utils::config::{get_config, get_config_from};
use preprocess::{
    args::{self, Config},
    pipeline::run_preprocess,
    settings::{resolve_settings, PipelineSettings},
};
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .try_init();

    let parsed = args::parse()?;
    let file_config = match parsed.config.config.as_deref() {
        Some(path) => get_config_from(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => get_config().context("loading preprocess settings")?,
    };
    let settings = resolve_settings(&parsed.config, &file_config)?;

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .max_blocking_threads(settings.workers)
        .thread_name("preprocess-worker")
        .build()
        .context("failed to create tokio runtime")?;

    info!(
        workers = settings.workers,
        ordered = settings.ordered,
        "Started multi-threaded tokio runtime"
    );

    runtime.block_on(async_main(parsed.config, settings))
}

async fn async_main(config: Config, settings: PipelineSettings) -> anyhow::Result<()> {
    let input: Box<dyn BufRead> = if config.reads_stdin() {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(&config.input)
            .with_context(|| format!("opening input corpus {}", config.input.display()))?;
        Box::new(BufReader::new(file))
    };

    let output: Box<dyn Write> = if config.writes_stdout() {
        Box::new(BufWriter::new(io::stdout().lock()))
    } else {
        Box::new(BufWriter::new(args::open_append(&config.output)?))
    };

    info!(
        input = %config.input.display(),
        output = %config.output.display(),
        "Preprocessing DuReader corpus"
    );
    let summary = run_preprocess(input, output, &settings, shutdown_signal())
        .await
        .with_context(|| format!("preprocessing {}", config.input.display()))?;

    if summary.interrupted {
        return Err(anyhow!(
            "interrupted after writing {} of {} records",
            summary.written,
            summary.parsed
        ));
    }

    info!(
        parsed = summary.parsed,
        skipped = summary.skipped.len(),
        written = summary.written,
        load_ms = summary.stage_timings.load_records_ms,
        drain_ms = summary.stage_timings.drain_results_ms,
        "Wrote preprocessed corpus to {}",
        config.output.display()
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Unable to listen for Ctrl-C, interrupts will not be handled");
        std::future::pending::<()>().await;
    }
}
