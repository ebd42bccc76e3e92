//! Parallel word-frequency analysis of paged documents.
//!
//! Pages are extracted up front, split into contiguous batches, counted on a
//! fixed-size worker pool and merged into one [`FrequencyTable`]. The table
//! and the retained page text then answer top-K and phrase queries.

pub mod config;
pub mod distribute;
pub mod error;
pub mod page;
pub mod pipeline;
pub mod query;
pub mod report;
pub mod source;
pub mod table;
pub mod tokenizer;

pub use config::AnalyzerConfig;
pub use distribute::{distribute, Batch};
pub use error::AnalyzeError;
pub use page::Page;
pub use pipeline::{Analysis, Analyzer, MergeStrategy, ProgressEvent, ProgressSink};
pub use query::{search, top_k, QueryError, SearchHit, SearchQuery, TopK};
pub use source::{MemorySource, PageSource, PdfSource};
pub use table::{FrequencyTable, Position};
