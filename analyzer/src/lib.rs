use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pagefreq_core::pipeline::{Analysis, ProgressEvent};
use pagefreq_core::report::{render_rows, save_summary, write_report, AnalysisSummary};
use pagefreq_core::source::extract_pages;
use pagefreq_core::{search, top_k, Analyzer, AnalyzerConfig, MergeStrategy, PdfSource, SearchHit, SearchQuery, TopK};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "pagefreq")]
#[command(about = "Count word frequencies in a PDF using a pool of workers", long_about = None)]
pub struct Cli {
    /// JSON config file; flags given on the command line take precedence
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Count words and print/write the most frequent ones
    Analyze {
        /// Input PDF
        #[arg(long)]
        input: PathBuf,
        /// Worker threads (default: available parallelism)
        #[arg(long, env = "PAGEFREQ_WORKERS")]
        workers: Option<usize>,
        /// How many words to print, or "all"
        #[arg(long)]
        top: Option<TopK>,
        /// Drop common Spanish words and words shorter than three letters
        #[arg(long, overrides_with = "no_exclude_common")]
        exclude_common: bool,
        /// Keep common words even if the config file excludes them
        #[arg(long, overrides_with = "exclude_common")]
        no_exclude_common: bool,
        /// sequential | locked
        #[arg(long)]
        strategy: Option<MergeStrategy>,
        /// Plain-text report path
        #[arg(long, default_value = "word_frequencies.txt")]
        output: PathBuf,
        /// Optional JSON summary path
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Find paragraphs containing up to three words close together
    Search {
        /// Input PDF
        #[arg(long)]
        input: PathBuf,
        /// One to three words, in order
        #[arg(long)]
        query: String,
    },
}

/// File config (or defaults) with command-line overrides applied.
pub fn resolve_config(
    file: Option<&Path>,
    workers: Option<usize>,
    top: Option<TopK>,
    exclude_common: Option<bool>,
    strategy: Option<MergeStrategy>,
) -> Result<AnalyzerConfig> {
    let mut config = match file {
        Some(path) => AnalyzerConfig::load(path)?,
        None => AnalyzerConfig::default(),
    };
    if let Some(w) = workers { config.workers = w; }
    if let Some(k) = top { config.top_k = k; }
    if let Some(e) = exclude_common { config.exclude_common = e; }
    if let Some(s) = strategy { config.merge_strategy = s; }
    config.validate()?;
    Ok(config)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze { input, workers, top, exclude_common, no_exclude_common, strategy, output, json } => {
            let exclude_common = match (exclude_common, no_exclude_common) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let config = resolve_config(cli.config.as_deref(), workers, top, exclude_common, strategy)?;
            let analysis = analyze(&input, &config)?;
            print_summary(&analysis, &config);
            write_report(&output, &analysis, config.report_top)
                .with_context(|| format!("writing report {}", output.display()))?;
            println!("\nResults saved to {}", output.display());
            if let Some(json_path) = json {
                let summary = AnalysisSummary::from_analysis(
                    &input.to_string_lossy(),
                    &analysis,
                    config.top_k,
                    config.exclude_common,
                );
                save_summary(&json_path, &summary)
                    .with_context(|| format!("writing summary {}", json_path.display()))?;
            }
            Ok(())
        }
        Commands::Search { input, query } => {
            // reject the query before touching the document
            let query = SearchQuery::parse(&query)?;
            let hits = search_document(&input, &query)?;
            print_hits(&query, &hits);
            Ok(())
        }
    }
}

/// Open `input` and count it with `config`.
pub fn analyze(input: &Path, config: &AnalyzerConfig) -> Result<Analysis> {
    let source = PdfSource::open(input)?;
    tracing::info!(path = %source.path().display(), workers = config.workers, "opened document");
    let analyzer = Analyzer::new(config)?;
    let analysis = analyzer.run_source(&source, &mut print_progress)?;
    Ok(analysis)
}

/// Extract the pages of `input` and search them; nothing is counted.
pub fn search_document(input: &Path, query: &SearchQuery) -> Result<Vec<SearchHit>> {
    let source = PdfSource::open(input)?;
    let pages = extract_pages(&source);
    tracing::info!(path = %source.path().display(), pages = pages.len(), "searching document");
    Ok(search(&pages, query))
}

fn print_progress(event: &ProgressEvent) {
    match event {
        ProgressEvent::PageCounted { page, tokens, .. } => {
            println!("page {} counted: {} words", page + 1, tokens);
        }
        ProgressEvent::BatchCompleted { batch, .. } => println!("batch {} completed", batch + 1),
        ProgressEvent::BatchFailed { batch, error } => eprintln!("batch {} failed: {}", batch + 1, error),
    }
}

fn print_summary(analysis: &Analysis, config: &AnalyzerConfig) {
    println!("\nAnalysis complete");
    println!("Unique words: {}", analysis.unique_tokens());
    println!("Total words: {}", analysis.total_tokens());
    println!("\nTop {} words:", config.top_k);
    println!("{}", "-".repeat(40));
    print!("{}", render_rows(&top_k(&analysis.table, config.top_k, config.exclude_common), 20, 5));
}

fn print_hits(query: &SearchQuery, hits: &[SearchHit]) {
    println!("{} paragraph(s) match {:?}", hits.len(), query.terms());
    for hit in hits {
        println!("\npage {}, paragraph {}:\n  {}", hit.page + 1, hit.paragraph, hit.snippet);
    }
}
