//! Parallel fixed-hand statistics.
//!
//! A fixed pool of scoped worker threads each draws its own random hands and
//! evaluates them with a private RNG. Results travel over a bounded channel to
//! the calling thread, which is the only writer to the sink.

use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use thiserror::Error;
use tracing::{Level, event};

use crate::config::StatsConfig;
use crate::evaluator::{HandStatistics, evaluate_fixed_hand};
use crate::hands::RandomHands;
use crate::output::{CsvSink, HandSink};

const TARGET: &str = "ddhearts::stats";

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to write CSV output: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },
    #[error("sink rejected hand {hand_index}: {source}")]
    Sink {
        hand_index: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("worker {worker} panicked outside hand evaluation")]
    WorkerPanic { worker: usize },
}

/// Totals for a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub seed: u64,
    pub workers: usize,
    pub hands_requested: usize,
    pub hands_written: usize,
    /// Hands whose evaluation returned an error or panicked.
    pub failures: usize,
    pub elapsed: Duration,
}

enum WorkerMessage {
    Finished(HandStatistics),
    Failed,
}

/// Runs `hands` evaluations of `samples_per_hand` playouts across `workers` threads.
pub struct StatsRunner {
    seed: u64,
    hands: usize,
    samples_per_hand: usize,
    workers: usize,
    channel_capacity: usize,
}

impl StatsRunner {
    /// Build a runner from a validated configuration. A missing seed is drawn
    /// from the thread RNG.
    pub fn new(config: &StatsConfig) -> Self {
        Self {
            seed: config.seed.unwrap_or_else(|| rand::thread_rng().r#gen()),
            hands: config.hands,
            samples_per_hand: config.samples_per_hand,
            workers: config.workers.max(1),
            channel_capacity: config.channel_capacity.max(1),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Evaluates every hand and hands the results to `sink` as they arrive.
    ///
    /// Hand `i` belongs to worker `i % workers`, and each worker's RNG is seeded
    /// from the master seed, so a seed reproduces the same set of rows in any
    /// arrival order.
    pub fn run<S: HandSink>(&self, sink: &mut S) -> Result<RunSummary, RunnerError> {
        let started = Instant::now();
        let mut master = StdRng::seed_from_u64(self.seed);
        let worker_seeds: Vec<u64> = (0..self.workers).map(|_| master.next_u64()).collect();

        event!(
            target: TARGET,
            Level::INFO,
            seed = self.seed,
            workers = self.workers,
            hands = self.hands,
            samples = self.samples_per_hand,
            "starting statistics run"
        );

        let (collected, panicked) = thread::scope(|scope| {
            let (tx, rx) = mpsc::sync_channel(self.channel_capacity);
            let handles: Vec<_> = worker_seeds
                .iter()
                .enumerate()
                .map(|(worker, &seed)| {
                    let tx = tx.clone();
                    scope.spawn(move || self.work(worker, seed, tx))
                })
                .collect();
            drop(tx);

            let collected = collect(rx, sink);
            let panicked = handles
                .into_iter()
                .enumerate()
                .find_map(|(worker, handle)| handle.join().is_err().then_some(worker));
            (collected, panicked)
        });

        let (hands_written, failures) = collected?;
        if let Some(worker) = panicked {
            return Err(RunnerError::WorkerPanic { worker });
        }

        let summary = RunSummary {
            seed: self.seed,
            workers: self.workers,
            hands_requested: self.hands,
            hands_written,
            failures,
            elapsed: started.elapsed(),
        };
        event!(
            target: TARGET,
            Level::INFO,
            written = summary.hands_written,
            failures = summary.failures,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "statistics run finished"
        );
        Ok(summary)
    }

    fn work(&self, worker: usize, seed: u64, tx: SyncSender<WorkerMessage>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut hands = RandomHands::new();

        for hand_index in (worker..self.hands).step_by(self.workers) {
            let hand = hands.next_hand(&mut rng);
            let started = Instant::now();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                evaluate_fixed_hand(&hand, self.samples_per_hand, &mut rng)
            }));

            let message = match outcome {
                Ok(Ok(evaluation)) => {
                    event!(
                        target: TARGET,
                        Level::DEBUG,
                        worker,
                        hand_index,
                        mean = evaluation.mean,
                        stddev = evaluation.stddev,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "hand evaluated"
                    );
                    WorkerMessage::Finished(HandStatistics::new(hand_index, hand, evaluation))
                }
                Ok(Err(err)) => {
                    event!(
                        target: TARGET,
                        Level::ERROR,
                        worker,
                        hand_index,
                        error = %err,
                        "hand evaluation failed"
                    );
                    WorkerMessage::Failed
                }
                Err(payload) => {
                    event!(
                        target: TARGET,
                        Level::ERROR,
                        worker,
                        hand_index,
                        panic = panic_message(payload.as_ref()),
                        "hand evaluation panicked"
                    );
                    WorkerMessage::Failed
                }
            };

            // The collector hangs up only after a sink error; nothing left to do.
            if tx.send(message).is_err() {
                break;
            }
        }
    }
}

fn collect<S: HandSink>(
    rx: Receiver<WorkerMessage>,
    sink: &mut S,
) -> Result<(usize, usize), RunnerError> {
    let mut written = 0;
    let mut failures = 0;
    for message in rx {
        match message {
            WorkerMessage::Finished(stats) => {
                sink.accept(&stats).map_err(|source| RunnerError::Sink {
                    hand_index: stats.hand_index,
                    source: Box::new(source),
                })?;
                written += 1;
            }
            WorkerMessage::Failed => failures += 1,
        }
    }
    Ok((written, failures))
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload")
}

/// Runs `config` and returns every hand's statistics, ordered by hand index.
pub fn run_stats(config: &StatsConfig) -> Result<Vec<HandStatistics>, RunnerError> {
    let mut rows: Vec<HandStatistics> = Vec::with_capacity(config.hands);
    StatsRunner::new(config).run(&mut rows)?;
    rows.sort_by_key(|stats| stats.hand_index);
    Ok(rows)
}

/// Runs `config` into the CSV file named by its `output` template.
pub fn run_to_csv(config: &StatsConfig) -> Result<(RunSummary, PathBuf), RunnerError> {
    let path = config.resolved_output();
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let mut sink = CsvSink::create(&path)?;
    let summary = StatsRunner::new(config).run(&mut sink)?;
    Ok((summary, path))
}
