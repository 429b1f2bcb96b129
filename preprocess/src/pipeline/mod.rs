mod context;
mod stages;
mod state;
mod workers;

use std::{
    future::Future,
    io::{BufRead, Write},
};

use anyhow::Result;
use serde::Serialize;

use crate::{records::SkippedRecord, settings::PipelineSettings};

pub use context::StageTimings;
use context::PreprocessContext;

/// What a preprocessing run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreprocessSummary {
    pub parsed: usize,
    pub skipped: Vec<SkippedRecord>,
    pub written: usize,
    pub interrupted: bool,
    pub stage_timings: StageTimings,
}

/// Mine fake answers for every JSON line of `input` and append the annotated
/// records to `output` as they complete.
///
/// Malformed lines are skipped and reported in the summary. A failed mining
/// task aborts the run with an error; records written before it stay in
/// `output`. When `shutdown` resolves first, draining stops and the summary
/// is returned with `interrupted` set.
pub async fn run_preprocess<R, W, F>(
    input: R,
    mut output: W,
    settings: &PipelineSettings,
    shutdown: F,
) -> Result<PreprocessSummary>
where
    R: BufRead,
    W: Write,
    F: Future<Output = ()>,
{
    let mut ctx = PreprocessContext::new(settings, &mut output);
    let machine = state::ready();

    let machine = stages::load_records(machine, &mut ctx, input).await?;
    let machine = stages::submit_tasks(machine, &mut ctx).await?;
    let machine = stages::drain_results(machine, &mut ctx, shutdown).await?;
    let machine = stages::finalize(machine, &mut ctx).await?;

    drop(machine);

    Ok(PreprocessSummary {
        parsed: ctx.parsed,
        skipped: ctx.skipped,
        written: ctx.written,
        interrupted: ctx.interrupted,
        stage_timings: ctx.stage_timings,
    })
}
