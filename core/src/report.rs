use crate::pipeline::Analysis;
use crate::query::{top_k, TopK};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::Path;

pub const SUMMARY_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedToken {
    pub word: String,
    pub count: u64,
}

/// Machine-readable outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub source: String,
    pub workers: usize,
    pub pages: usize,
    pub batches: usize,
    pub failed_batches: Vec<usize>,
    pub unique_tokens: usize,
    pub total_tokens: u64,
    pub exclude_common: bool,
    pub top: Vec<RankedToken>,
    pub created_at: String,
    pub version: u32,
}

impl AnalysisSummary {
    pub fn from_analysis(source: &str, analysis: &Analysis, k: TopK, exclude_common: bool) -> Self {
        let top = top_k(&analysis.table, k, exclude_common)
            .into_iter()
            .map(|(word, count)| RankedToken { word, count })
            .collect();
        Self {
            source: source.to_string(),
            workers: analysis.workers,
            pages: analysis.pages.len(),
            batches: analysis.batches,
            failed_batches: analysis.failed_batches.iter().map(|(b, _)| *b).collect(),
            unique_tokens: analysis.unique_tokens(),
            total_tokens: analysis.total_tokens(),
            exclude_common,
            top,
            created_at: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_default(),
            version: SUMMARY_VERSION,
        }
    }
}

/// `word` left-aligned in `word_width`, `count` right-aligned in `count_width`.
pub fn render_rows(rows: &[(String, u64)], word_width: usize, count_width: usize) -> String {
    rows.iter()
        .map(|(word, count)| format!("{word:<word_width$} {count:>count_width$}\n"))
        .collect()
}

/// Plain-text report: totals followed by the `top` most frequent words.
///
/// The ranking is always unfiltered; common words are only hidden on screen.
pub fn render_report(analysis: &Analysis, top: usize) -> String {
    let failed = if analysis.failed_batches.is_empty() {
        String::new()
    } else {
        let ids: Vec<String> = analysis.failed_batches.iter().map(|(b, _)| b.to_string()).collect();
        format!("Failed batches (not counted): {}\n", ids.join(", "))
    };
    let mut out = format!(
        "WORD FREQUENCY ANALYSIS\n{rule}\n\n\
         Workers used: {workers}\n\
         Pages: {pages}\n\
         {failed}\
         Unique words: {unique}\n\
         Total words: {total}\n\n\
         MOST FREQUENT WORDS:\n{thin}\n",
        rule = "=".repeat(50),
        thin = "-".repeat(50),
        workers = analysis.workers,
        pages = analysis.pages.len(),
        unique = analysis.unique_tokens(),
        total = analysis.total_tokens(),
    );
    out.push_str(&render_rows(&top_k(&analysis.table, TopK::Limit(top), false), 30, 10));
    out
}

pub fn write_report<P: AsRef<Path>>(path: P, analysis: &Analysis, top: usize) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir)?;
    }
    let mut f = File::create(path)?;
    f.write_all(render_report(analysis, top).as_bytes())?;
    Ok(())
}

pub fn save_summary<P: AsRef<Path>>(path: P, summary: &AnalysisSummary) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir)?;
    }
    let mut f = File::create(path)?;
    let json = serde_json::to_string_pretty(summary)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_summary<P: AsRef<Path>>(path: P) -> Result<AnalysisSummary> {
    let mut f = File::open(path)?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let summary: AnalysisSummary = serde_json::from_str(&buf)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::BatchError;
    use crate::{FrequencyTable, Page};

    #[test]
    fn rows_are_fixed_width() {
        let rows = vec![("datos".to_string(), 12u64)];
        let out = render_rows(&rows, 30, 10);
        assert_eq!(out, format!("{}{}12\n", "datos", " ".repeat(25 + 1 + 8)));
    }

    fn sample(failed: Vec<(usize, BatchError)>) -> Analysis {
        Analysis {
            pages: vec![Page::new(0, "el dato el de")],
            table: FrequencyTable::from_counts([("el", 2), ("dato", 1), ("de", 1)]),
            workers: 3,
            batches: 1,
            failed_batches: failed,
        }
    }

    #[test]
    fn report_lists_common_words_too() {
        let report = render_report(&sample(Vec::new()), 50);
        assert!(report.starts_with("WORD FREQUENCY ANALYSIS\n"));
        assert!(report.contains("Workers used: 3\nPages: 1\nUnique words: 3\nTotal words: 4\n"));
        assert!(report.contains(&format!("{:<30} {:>10}\n", "el", 2)));
        assert!(report.contains(&format!("{:<30} {:>10}\n", "de", 1)));
        assert!(!report.contains("Failed batches"));
    }

    #[test]
    fn report_names_failed_batches() {
        let failed = vec![(0, BatchError::Panicked("boom".into())), (2, BatchError::Panicked("bang".into()))];
        let report = render_report(&sample(failed), 1);
        assert!(report.contains("Failed batches (not counted): 0, 2\n"));
        // only the single top row
        assert!(report.ends_with(&format!("{}\n{:<30} {:>10}\n", "-".repeat(50), "el", 2)));
    }
}
