//! @ai:module:intent Report generation for batch grading results
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportGenerator, JsonReporter, MarkdownReporter

pub mod json_report;
pub mod markdown_report;

pub use json_report::{JsonReporter, JsonReporterTrait, RESULTS_FILE, SCORES_FILE};
pub use markdown_report::{MarkdownReporter, MarkdownReporterTrait};

use crate::metrics::BatchResults;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// @ai:intent Combined report generator
pub struct ReportGenerator {
    json: JsonReporter,
    markdown: MarkdownReporter,
}

impl ReportGenerator {
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            json: JsonReporter::new(),
            markdown: MarkdownReporter::new(),
        }
    }

    /// @ai:intent Generate results.json, scores.jsonl and results.md in output_dir
    /// @ai:effects fs:write
    pub fn generate_all(&self, results: &BatchResults, output_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(output_dir)?;

        let written = self.json.write(results, output_dir)?;
        self.markdown
            .generate(results, &output_dir.join("results.md"))?;

        tracing::info!(
            "Reports generated in {} ({} JSON artifacts)",
            output_dir.display(),
            written.len()
        );
        Ok(())
    }

    /// @ai:intent Load results written by a previous run
    /// @ai:effects fs:read
    pub fn load_results(&self, path: &Path) -> Result<BatchResults> {
        self.json.load(path)
    }

    /// @ai:intent Create a fresh timestamped run directory under base
    /// @ai:effects fs:write, time
    pub fn timestamped_dir(base: &Path) -> Result<PathBuf> {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S");
        let dir = base.join(timestamp.to_string());
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{MetricsAggregator, MetricsAggregatorTrait};
    use tempfile::TempDir;

    #[test]
    fn test_generate_all_writes_both_reports() {
        let temp = TempDir::new().unwrap();
        let dir = ReportGenerator::timestamped_dir(temp.path()).unwrap();
        let results = MetricsAggregator::new().aggregate(&[], "empty.jsonl");

        ReportGenerator::new().generate_all(&results, &dir).unwrap();
        assert!(dir.join(RESULTS_FILE).exists());
        assert!(dir.join(SCORES_FILE).exists());
        assert!(dir.join("results.md").exists());
        assert!(dir.starts_with(temp.path()));
    }
}
