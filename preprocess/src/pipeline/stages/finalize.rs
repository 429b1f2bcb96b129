use std::{io::Write, time::Instant};

use anyhow::Context;
use tracing::{info, warn};

use super::super::{
    context::{PreprocessContext, PreprocessStage},
    state::{Completed, Drained, PreprocessMachine},
};
use super::{map_guard_error, StageResult};

pub(crate) async fn finalize<W: Write>(
    machine: PreprocessMachine<(), Drained>,
    ctx: &mut PreprocessContext<'_, W>,
) -> StageResult<Completed> {
    let stage = PreprocessStage::Finalize;
    info!(preprocess_stage = stage.label(), "starting preprocess stage");
    let started = Instant::now();

    ctx.output().flush().context("flushing preprocessed output")?;

    if ctx.interrupted {
        warn!(
            written = ctx.written,
            parsed = ctx.parsed,
            "Preprocessing interrupted, output holds the records written so far"
        );
    } else {
        info!(
            parsed = ctx.parsed,
            skipped = ctx.skipped.len(),
            written = ctx.written,
            "Preprocessing complete"
        );
    }

    let elapsed = started.elapsed();
    ctx.record_stage_duration(stage, elapsed);
    info!(
        preprocess_stage = stage.label(),
        duration_ms = elapsed.as_millis(),
        "completed preprocess stage"
    );

    machine
        .finalize()
        .map_err(|(_, guard)| map_guard_error("finalize", guard))
}
