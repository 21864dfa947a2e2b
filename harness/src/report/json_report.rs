//! @ai:module:intent Persist batch results as JSON and per-line score JSONL, and read them back
//! @ai:module:layer infrastructure
//! @ai:module:public_api JsonReporter, JsonReporterTrait, RESULTS_FILE, SCORES_FILE
//! @ai:module:stateless true

use crate::metrics::BatchResults;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Full run summary, reloadable with `rft-harness report`.
pub const RESULTS_FILE: &str = "results.json";
/// One `{"line", "score", "outcome", "error"?}` object per graded input line.
pub const SCORES_FILE: &str = "scores.jsonl";

/// @ai:intent Trait for the machine-readable run artifacts
pub trait JsonReporterTrait: Send + Sync {
    /// @ai:intent Write the run artifacts into `output_dir`, returning the paths written
    fn write(&self, results: &BatchResults, output_dir: &Path) -> Result<Vec<PathBuf>>;

    /// @ai:intent Load a previously written results file
    fn load(&self, path: &Path) -> Result<BatchResults>;
}

/// @ai:intent Writes results.json and scores.jsonl
#[derive(Debug, Default)]
pub struct JsonReporter;

impl JsonReporter {
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:effects fs:write
    fn write_scores(results: &BatchResults, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = std::io::BufWriter::new(file);
        for record in &results.records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl JsonReporterTrait for JsonReporter {
    /// @ai:effects fs:write
    fn write(&self, results: &BatchResults, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let results_path = output_dir.join(RESULTS_FILE);
        let mut json = serde_json::to_string_pretty(results)?;
        json.push('\n');
        std::fs::write(&results_path, json)
            .with_context(|| format!("Failed to write {}", results_path.display()))?;

        let scores_path = output_dir.join(SCORES_FILE);
        Self::write_scores(results, &scores_path)?;

        Ok(vec![results_path, scores_path])
    }

    /// @ai:effects fs:read
    fn load(&self, path: &Path) -> Result<BatchResults> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("{} is not a batch results file", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{GradedRecord, MetricsAggregator, MetricsAggregatorTrait};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn results() -> BatchResults {
        let records = vec![
            GradedRecord {
                line: 1,
                score: 5,
                outcome: "compare".to_string(),
                error: None,
            },
            GradedRecord::unreadable(3, "expected a JSON object"),
        ];
        MetricsAggregator::new().aggregate(&records, "samples.jsonl")
    }

    #[test]
    fn test_written_results_load_back() {
        let temp = TempDir::new().unwrap();
        let reporter = JsonReporter::new();

        let written = reporter.write(&results(), temp.path()).unwrap();
        assert_eq!(written.len(), 2);

        let loaded = reporter.load(&temp.path().join(RESULTS_FILE)).unwrap();
        assert_eq!(loaded.input, "samples.jsonl");
        assert_eq!(loaded.distribution.counts[5], 1);
        assert_eq!(loaded.records, results().records);
    }

    #[test]
    fn test_scores_file_has_one_line_per_record() {
        let temp = TempDir::new().unwrap();
        JsonReporter::new().write(&results(), temp.path()).unwrap();

        let content = std::fs::read_to_string(temp.path().join(SCORES_FILE)).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                r#"{"line":1,"score":5,"outcome":"compare"}"#,
                r#"{"line":3,"score":0,"outcome":"unreadable","error":"expected a JSON object"}"#,
            ]
        );
    }

    #[test]
    fn test_load_rejects_other_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("other.json");
        std::fs::write(&path, "{\"score\": 5}").unwrap();
        assert!(JsonReporter::new().load(&path).is_err());
    }
}
