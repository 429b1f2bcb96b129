use std::sync::Arc;

use anyhow::{anyhow, Result};
use answer_mining::{mine_answer, MinerConfig, Sample};
use common::error::AppError;
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinSet,
};
use tracing::debug;

use crate::records::ParsedRecord;

/// Result of mining one record, tagged with where the record came from.
#[derive(Debug)]
pub(super) struct TaskOutcome {
    pub seq: usize,
    pub line: usize,
    pub raw: String,
    pub result: Result<Sample, AppError>,
}

type JobQueue = Arc<Mutex<mpsc::UnboundedReceiver<ParsedRecord>>>;

/// Fixed number of workers pulling records from a shared FIFO queue.
///
/// Every record is enqueued up front. Workers hand the CPU-bound mining to
/// the blocking thread pool and report outcomes in completion order, so a
/// single worker reproduces the input order.
pub(super) struct WorkerPool {
    workers: JoinSet<()>,
    results: mpsc::UnboundedReceiver<TaskOutcome>,
}

impl WorkerPool {
    pub fn spawn(records: Vec<ParsedRecord>, size: usize, miner: MinerConfig) -> Result<Self> {
        let (job_tx, job_rx) = mpsc::unbounded_channel();
        for record in records {
            job_tx
                .send(record)
                .map_err(|_| anyhow!("job queue closed before submission finished"))?;
        }
        drop(job_tx);

        let queue: JobQueue = Arc::new(Mutex::new(job_rx));
        let (result_tx, results) = mpsc::unbounded_channel();
        let mut workers = JoinSet::new();
        for worker in 0..size.max(1) {
            workers.spawn(run_worker(worker, Arc::clone(&queue), result_tx.clone(), miner));
        }
        Ok(Self { workers, results })
    }

    pub async fn next(&mut self) -> Option<TaskOutcome> {
        self.results.recv().await
    }

    /// Stop handing out work. Mining already running on the blocking pool is
    /// left to finish and its result is dropped.
    pub fn abort(&mut self) {
        self.workers.abort_all();
        self.results.close();
    }
}

async fn run_worker(
    worker: usize,
    queue: JobQueue,
    results: mpsc::UnboundedSender<TaskOutcome>,
    miner: MinerConfig,
) {
    loop {
        let next = queue.lock().await.recv().await;
        let Some(ParsedRecord {
            seq,
            line,
            raw,
            sample,
        }) = next
        else {
            break;
        };

        let result = match tokio::task::spawn_blocking(move || mine_answer(sample, &miner)).await {
            Ok(result) => result,
            Err(err) => Err(AppError::Join(err)),
        };
        if results
            .send(TaskOutcome {
                seq,
                line,
                raw,
                result,
            })
            .is_err()
        {
            break;
        }
    }
    debug!(worker, "Mining worker finished");
}
