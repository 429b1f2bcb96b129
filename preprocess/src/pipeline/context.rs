use std::{io::Write, time::Duration};

use serde::Serialize;

use crate::{
    records::{ParsedRecord, SkippedRecord},
    settings::PipelineSettings,
};

use super::workers::WorkerPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PreprocessStage {
    LoadRecords,
    SubmitTasks,
    DrainResults,
    Finalize,
}

impl PreprocessStage {
    pub fn label(self) -> &'static str {
        match self {
            Self::LoadRecords => "load_records",
            Self::SubmitTasks => "submit_tasks",
            Self::DrainResults => "drain_results",
            Self::Finalize => "finalize",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageTimings {
    pub load_records_ms: u128,
    pub submit_tasks_ms: u128,
    pub drain_results_ms: u128,
    pub finalize_ms: u128,
}

pub(super) struct PreprocessContext<'a, W: Write> {
    settings: &'a PipelineSettings,
    output: &'a mut W,
    pub records: Vec<ParsedRecord>,
    pub skipped: Vec<SkippedRecord>,
    pub parsed: usize,
    pub pool: Option<WorkerPool>,
    pub written: usize,
    pub interrupted: bool,
    pub stage_timings: StageTimings,
}

impl<'a, W: Write> PreprocessContext<'a, W> {
    pub fn new(settings: &'a PipelineSettings, output: &'a mut W) -> Self {
        Self {
            settings,
            output,
            records: Vec::new(),
            skipped: Vec::new(),
            parsed: 0,
            pool: None,
            written: 0,
            interrupted: false,
            stage_timings: StageTimings::default(),
        }
    }

    pub fn settings(&self) -> &'a PipelineSettings {
        self.settings
    }

    pub fn output(&mut self) -> &mut W {
        self.output
    }

    pub fn record_stage_duration(&mut self, stage: PreprocessStage, duration: Duration) {
        let elapsed = duration.as_millis();
        match stage {
            PreprocessStage::LoadRecords => self.stage_timings.load_records_ms = elapsed,
            PreprocessStage::SubmitTasks => self.stage_timings.submit_tasks_ms = elapsed,
            PreprocessStage::DrainResults => self.stage_timings.drain_results_ms = elapsed,
            PreprocessStage::Finalize => self.stage_timings.finalize_ms = elapsed,
        }
    }
}
