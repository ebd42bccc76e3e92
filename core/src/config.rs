use crate::pipeline::MergeStrategy;
use crate::query::TopK;
use crate::AnalyzeError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Entries written to the report file unless configured otherwise.
pub const DEFAULT_REPORT_TOP: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Worker threads; defaults to the host's available parallelism.
    pub workers: usize,
    pub top_k: TopK,
    pub exclude_common: bool,
    pub merge_strategy: MergeStrategy,
    pub report_top: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            top_k: TopK::default(),
            exclude_common: false,
            merge_strategy: MergeStrategy::default(),
            report_top: DEFAULT_REPORT_TOP,
        }
    }
}

pub fn default_workers() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

impl AnalyzerConfig {
    /// Read a JSON config; missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
        let config: AnalyzerConfig = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalyzeError> {
        if self.workers == 0 {
            return Err(AnalyzeError::InvalidConfig("workers must be at least 1".into()));
        }
        if self.top_k == TopK::Limit(0) {
            return Err(AnalyzeError::InvalidConfig("top_k must be positive or \"all\"".into()));
        }
        if self.report_top == 0 {
            return Err(AnalyzeError::InvalidConfig("report_top must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"workers": 3, "top_k": "all", "merge_strategy": "locked"}}"#).unwrap();
        let config = AnalyzerConfig::load(f.path()).unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.top_k, TopK::All);
        assert_eq!(config.merge_strategy, MergeStrategy::Locked);
        assert_eq!(config.report_top, DEFAULT_REPORT_TOP);
        assert!(!config.exclude_common);
    }

    #[test]
    fn limit_round_trips_through_json() {
        let config = AnalyzerConfig { top_k: TopK::Limit(25), ..AnalyzerConfig::default() };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""top_k":{"limit":25}"#));
    }

    #[test]
    fn zero_workers_invalid() {
        let config = AnalyzerConfig { workers: 0, ..AnalyzerConfig::default() };
        assert!(matches!(config.validate(), Err(AnalyzeError::InvalidConfig(_))));
        assert!(AnalyzerConfig::default().validate().is_ok());
    }
}
