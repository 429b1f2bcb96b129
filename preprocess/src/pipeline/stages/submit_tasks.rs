use std::{io::Write, time::Instant};

use anyhow::Context;
use tracing::info;

use super::super::{
    context::{PreprocessContext, PreprocessStage},
    state::{Loaded, PreprocessMachine, Submitted},
    workers::WorkerPool,
};
use super::{map_guard_error, StageResult};

pub(crate) async fn submit_tasks<W: Write>(
    machine: PreprocessMachine<(), Loaded>,
    ctx: &mut PreprocessContext<'_, W>,
) -> StageResult<Submitted> {
    let stage = PreprocessStage::SubmitTasks;
    info!(preprocess_stage = stage.label(), "starting preprocess stage");
    let started = Instant::now();

    let settings = ctx.settings();
    let records = std::mem::take(&mut ctx.records);
    info!(
        tasks = records.len(),
        workers = settings.workers,
        ordered = settings.ordered,
        span_window = settings.miner.span_window,
        question_fallback = settings.miner.question_fallback,
        "Submitting mining tasks"
    );
    let pool = WorkerPool::spawn(records, settings.workers, settings.miner)
        .context("starting mining workers")?;
    ctx.pool = Some(pool);

    let elapsed = started.elapsed();
    ctx.record_stage_duration(stage, elapsed);
    info!(
        preprocess_stage = stage.label(),
        duration_ms = elapsed.as_millis(),
        "completed preprocess stage"
    );

    machine
        .submit_tasks()
        .map_err(|(_, guard)| map_guard_error("submit_tasks", guard))
}
