use std::{io::BufRead, io::Write, time::Instant};

use anyhow::Context;
use tracing::info;

use crate::records::read_records;

use super::super::{
    context::{PreprocessContext, PreprocessStage},
    state::{Loaded, PreprocessMachine, Ready},
};
use super::{map_guard_error, StageResult};

pub(crate) async fn load_records<R: BufRead, W: Write>(
    machine: PreprocessMachine<(), Ready>,
    ctx: &mut PreprocessContext<'_, W>,
    input: R,
) -> StageResult<Loaded> {
    let stage = PreprocessStage::LoadRecords;
    info!(preprocess_stage = stage.label(), "starting preprocess stage");
    let started = Instant::now();

    let (records, skipped) = read_records(input).context("reading input records")?;
    info!(
        records = records.len(),
        skipped = skipped.len(),
        "Input records decoded"
    );
    ctx.parsed = records.len();
    ctx.records = records;
    ctx.skipped = skipped;

    let elapsed = started.elapsed();
    ctx.record_stage_duration(stage, elapsed);
    info!(
        preprocess_stage = stage.label(),
        duration_ms = elapsed.as_millis(),
        "completed preprocess stage"
    );

    machine
        .load_records()
        .map_err(|(_, guard)| map_guard_error("load_records", guard))
}
