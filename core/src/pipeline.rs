use crate::distribute::{distribute, Batch};
use crate::source::{extract_pages, PageSource};
use crate::table::{FrequencyTable, Position};
use crate::tokenizer::normalize;
use crate::{AnalyzeError, AnalyzerConfig, Page};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::mpsc::{self, Sender};
use thiserror::Error;

/// Turns page text into tokens for the batch counter.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, page: &Page) -> Result<Vec<String>, BatchError>;
}

/// The default normalizer: [`crate::tokenizer::normalize`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphabetNormalizer;

impl Normalizer for AlphabetNormalizer {
    fn normalize(&self, page: &Page) -> Result<Vec<String>, BatchError> {
        Ok(normalize(page.text()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("tokenization failed on page {page}: {reason}")]
    Tokenize { page: usize, reason: String },
    #[error("worker panicked: {0}")]
    Panicked(String),
}

/// Observational progress, delivered in arrival order which is not
/// stable across workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    PageCounted { batch: usize, page: usize, tokens: usize },
    BatchCompleted { batch: usize, pages: usize, tokens: u64 },
    BatchFailed { batch: usize, error: BatchError },
}

pub trait ProgressSink {
    fn on_event(&mut self, event: &ProgressEvent);
}

impl<F: FnMut(&ProgressEvent)> ProgressSink for F {
    fn on_event(&mut self, event: &ProgressEvent) { self(event) }
}

/// Sink that drops every event.
pub fn no_progress() -> impl ProgressSink { |_: &ProgressEvent| {} }

/// How finished batch tables reach the global table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Collect tables as workers finish, fold them after the join.
    #[default]
    Sequential,
    /// Workers fold their own table into a mutex-guarded global table.
    Locked,
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(MergeStrategy::Sequential),
            "locked" => Ok(MergeStrategy::Locked),
            other => Err(format!("unknown merge strategy {other:?} (expected sequential or locked)")),
        }
    }
}

/// Count every page of `batch` into a fresh local table, reporting each page.
pub fn count_batch<N, F>(batch: Batch<'_>, normalizer: &N, mut on_page: F) -> Result<FrequencyTable, BatchError>
where
    N: Normalizer + ?Sized,
    F: FnMut(ProgressEvent),
{
    let mut table = FrequencyTable::new();
    for page in batch.pages {
        let tokens = normalizer.normalize(page)?;
        for (i, token) in tokens.iter().enumerate() {
            table.record(token, Position::new(page.index(), i));
        }
        tracing::debug!(batch = batch.id, page = page.index(), tokens = tokens.len(), "page counted");
        on_page(ProgressEvent::PageCounted { batch: batch.id, page: page.index(), tokens: tokens.len() });
    }
    Ok(table)
}

/// Owner of the global table. Absorbs one complete batch table at a time.
#[derive(Debug, Default)]
pub struct Aggregator {
    table: FrequencyTable,
}

impl Aggregator {
    pub fn new() -> Self { Self::default() }

    pub fn absorb(&mut self, table: FrequencyTable) {
        self.table.merge(table);
    }

    pub fn finish(self) -> FrequencyTable { self.table }
}

/// Result of one analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub pages: Vec<Page>,
    pub table: FrequencyTable,
    pub workers: usize,
    pub batches: usize,
    /// Batches whose counts were dropped, by batch id.
    pub failed_batches: Vec<(usize, BatchError)>,
}

impl Analysis {
    pub fn unique_tokens(&self) -> usize { self.table.len() }

    pub fn total_tokens(&self) -> u64 { self.table.total() }
}

enum Completion {
    Table(FrequencyTable),
    Merged { tokens: u64 },
}

enum WorkerMessage {
    Progress(ProgressEvent),
    Done { batch: usize, pages: usize, outcome: Result<Completion, BatchError> },
}

/// Parallel word counter over a fixed-size worker pool.
pub struct Analyzer<N = AlphabetNormalizer> {
    workers: usize,
    strategy: MergeStrategy,
    normalizer: N,
}

impl Analyzer<AlphabetNormalizer> {
    pub fn new(config: &AnalyzerConfig) -> Result<Self, AnalyzeError> {
        Self::with_normalizer(config.workers, config.merge_strategy, AlphabetNormalizer)
    }
}

impl<N: Normalizer> Analyzer<N> {
    pub fn with_normalizer(workers: usize, strategy: MergeStrategy, normalizer: N) -> Result<Self, AnalyzeError> {
        if workers == 0 {
            return Err(AnalyzeError::InvalidConfig("worker count must be positive".into()));
        }
        Ok(Self { workers, strategy, normalizer })
    }

    pub fn workers(&self) -> usize { self.workers }

    /// Extract every page of `source`, then [`Analyzer::run`].
    pub fn run_source(&self, source: &dyn PageSource, sink: &mut dyn ProgressSink) -> Result<Analysis, AnalyzeError> {
        let pages = extract_pages(source);
        self.run(pages, sink)
    }

    /// Count `pages` in parallel and merge the batch tables.
    ///
    /// Returns only after every batch has finished. A batch that fails or
    /// panics contributes nothing and is listed in `failed_batches`.
    pub fn run(&self, pages: Vec<Page>, sink: &mut dyn ProgressSink) -> Result<Analysis, AnalyzeError> {
        let batches = distribute(&pages, self.workers);
        let batch_count = batches.len();
        tracing::info!(pages = pages.len(), batches = batch_count, workers = self.workers, "pages distributed");

        let mut aggregator = Aggregator::new();
        let mut failed_batches = Vec::new();
        if !batches.is_empty() {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.workers)
                .thread_name(|i| format!("pagefreq-worker-{i}"))
                .build()
                .map_err(|e| AnalyzeError::WorkerPool(e.to_string()))?;

            let shared = Mutex::new(Aggregator::new());
            let (tx, rx) = mpsc::channel();
            pool.scope(|scope| {
                for batch in &batches {
                    let batch = *batch;
                    let tx = tx.clone();
                    let shared = &shared;
                    let normalizer = &self.normalizer;
                    let strategy = self.strategy;
                    scope.spawn(move |_| run_batch(batch, normalizer, strategy, shared, &tx));
                }
            });
            // every worker has returned; close our sender so the drain ends
            drop(tx);

            for message in rx {
                match message {
                    WorkerMessage::Progress(event) => sink.on_event(&event),
                    WorkerMessage::Done { batch, pages, outcome } => {
                        let event = match outcome {
                            Ok(completion) => {
                                let tokens = match completion {
                                    Completion::Table(table) => {
                                        let tokens = table.total();
                                        aggregator.absorb(table);
                                        tokens
                                    }
                                    Completion::Merged { tokens } => tokens,
                                };
                                tracing::info!(batch, pages, tokens, "batch completed");
                                ProgressEvent::BatchCompleted { batch, pages, tokens }
                            }
                            Err(error) => {
                                tracing::warn!(batch, error = %error, "batch failed, its counts are dropped");
                                failed_batches.push((batch, error.clone()));
                                ProgressEvent::BatchFailed { batch, error }
                            }
                        };
                        sink.on_event(&event);
                    }
                }
            }
            aggregator.absorb(shared.into_inner().finish());
        }

        let table = aggregator.finish();
        failed_batches.sort_by_key(|(batch, _)| *batch);
        tracing::info!(unique = table.len(), total = table.total(), failed = failed_batches.len(), "analysis complete");
        Ok(Analysis { pages, table, workers: self.workers, batches: batch_count, failed_batches })
    }
}

fn run_batch<N: Normalizer>(
    batch: Batch<'_>,
    normalizer: &N,
    strategy: MergeStrategy,
    shared: &Mutex<Aggregator>,
    tx: &Sender<WorkerMessage>,
) {
    // A send only fails once the receiver is gone, which cannot happen
    // before the scope ends.
    let counted = panic::catch_unwind(AssertUnwindSafe(|| {
        count_batch(batch, normalizer, |event| {
            let _ = tx.send(WorkerMessage::Progress(event));
        })
    }))
    .unwrap_or_else(|payload| Err(BatchError::Panicked(panic_message(payload))));

    let outcome = counted.map(|table| match strategy {
        MergeStrategy::Sequential => Completion::Table(table),
        MergeStrategy::Locked => {
            let tokens = table.total();
            shared.lock().absorb(table);
            Completion::Merged { tokens }
        }
    });
    let _ = tx.send(WorkerMessage::Done { batch: batch.id, pages: batch.pages.len(), outcome });
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
