mod drain_results;
mod finalize;
mod load_records;
mod submit_tasks;

pub(crate) use drain_results::drain_results;
pub(crate) use finalize::finalize;
pub(crate) use load_records::load_records;
pub(crate) use submit_tasks::submit_tasks;

use anyhow::Result;
use state_machines::core::GuardError;

use super::state::PreprocessMachine;

fn map_guard_error(event: &str, guard: GuardError) -> anyhow::Error {
    anyhow::anyhow!("invalid preprocess pipeline transition during {event}: {guard:?}")
}

type StageResult<S> = Result<PreprocessMachine<(), S>>;
