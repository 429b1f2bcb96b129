use std::{collections::BTreeMap, future::Future, io::Write, time::Instant};

use anyhow::{anyhow, Context};
use answer_mining::Sample;
use common::error::AppError;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};

use crate::records::write_record;

use super::super::{
    context::{PreprocessContext, PreprocessStage},
    state::{Drained, PreprocessMachine, Submitted},
};
use super::{map_guard_error, StageResult};

fn progress_bar(total: usize, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total as u64);
    if let Ok(style) =
        ProgressStyle::with_template("{elapsed_precise} [{bar:40}] {pos}/{len} ({per_sec}, eta {eta})")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

/// Holds completed samples until every earlier sample has been written.
struct Reassembly {
    next_seq: usize,
    pending: BTreeMap<usize, Sample>,
}

impl Reassembly {
    fn new() -> Self {
        Self {
            next_seq: 0,
            pending: BTreeMap::new(),
        }
    }

    fn push(&mut self, seq: usize, sample: Sample) -> Vec<Sample> {
        self.pending.insert(seq, sample);
        let mut ready = Vec::new();
        while let Some(sample) = self.pending.remove(&self.next_seq) {
            ready.push(sample);
            self.next_seq += 1;
        }
        ready
    }
}

pub(crate) async fn drain_results<W: Write, F: Future<Output = ()>>(
    machine: PreprocessMachine<(), Submitted>,
    ctx: &mut PreprocessContext<'_, W>,
    shutdown: F,
) -> StageResult<Drained> {
    let stage = PreprocessStage::DrainResults;
    info!(preprocess_stage = stage.label(), "starting preprocess stage");
    let started = Instant::now();

    let settings = ctx.settings();
    let mut pool = ctx
        .pool
        .take()
        .ok_or_else(|| anyhow!("mining workers were not started before draining"))?;
    let progress = progress_bar(ctx.parsed, settings.progress);
    let mut reassembly = settings.ordered.then(Reassembly::new);
    let mut remaining = ctx.parsed;
    tokio::pin!(shutdown);

    while remaining > 0 {
        let outcome = tokio::select! {
            biased;
            () = &mut shutdown => {
                progress.abandon();
                warn!(
                    outstanding = remaining,
                    "Interrupt received, abandoning outstanding mining tasks"
                );
                ctx.interrupted = true;
                break;
            }
            outcome = pool.next() => outcome,
        };
        let Some(outcome) = outcome else {
            pool.abort();
            ctx.output().flush().context("flushing preprocessed output")?;
            return Err(anyhow!(
                "mining workers stopped with {remaining} results outstanding"
            ));
        };
        remaining -= 1;

        let sample = match outcome.result {
            Ok(sample) => sample,
            Err(err) => {
                progress.abandon();
                error!(
                    line = outcome.line,
                    record = %outcome.raw,
                    error = %err,
                    "Mining task failed, aborting the run"
                );
                pool.abort();
                ctx.output().flush().context("flushing preprocessed output")?;
                return Err(AppError::TaskFailed {
                    line: outcome.line,
                    message: err.to_string(),
                }
                .into());
            }
        };

        let ready = match reassembly.as_mut() {
            Some(reassembly) => reassembly.push(outcome.seq, sample),
            None => vec![sample],
        };
        for sample in &ready {
            write_record(ctx.output(), sample).context("writing preprocessed record")?;
            ctx.written += 1;
        }
        progress.inc(1);
    }

    if ctx.interrupted {
        pool.abort();
    } else {
        progress.finish_and_clear();
    }
    ctx.output().flush().context("flushing preprocessed output")?;

    let elapsed = started.elapsed();
    ctx.record_stage_duration(stage, elapsed);
    info!(
        preprocess_stage = stage.label(),
        duration_ms = elapsed.as_millis(),
        written = ctx.written,
        "completed preprocess stage"
    );

    machine
        .drain_results()
        .map_err(|(_, guard)| map_guard_error("drain_results", guard))
}
