//! @ai:module:intent Grade JSONL files of {sample, item} requests concurrently
//! @ai:module:layer application
//! @ai:module:public_api BatchGrader, GradeRequest, read_request_lines
//! @ai:module:depends_on countdown_grader, metrics
//! @ai:module:stateless true

use crate::metrics::GradedRecord;
use anyhow::{Context, Result};
use countdown_grader::grade_report;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// @ai:intent One request as the endpoint grader receives it
#[derive(Debug, Clone, Deserialize)]
pub struct GradeRequest {
    pub sample: Value,
    pub item: Value,
}

impl GradeRequest {
    /// @ai:intent Parse a request document
    /// @ai:effects pure
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("expected a JSON object with `sample` and `item`")
    }

    /// @ai:intent Read a single request document from a file
    /// @ai:effects fs:read
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid request in {}", path.display()))
    }
}

/// @ai:intent Non-blank lines of a JSONL file with their 1-based line numbers
/// @ai:effects fs:read
pub fn read_request_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| (index + 1, line.to_string()))
        .collect())
}

/// @ai:intent Grades many requests across a bounded number of tokio tasks
pub struct BatchGrader {
    concurrency: usize,
    semaphore: Arc<Semaphore>,
}

impl BatchGrader {
    /// @ai:intent Create a grader running at most `concurrency` gradings at once
    /// @ai:effects pure
    pub fn new(concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            concurrency,
            semaphore: Arc::new(Semaphore::new(concurrency)),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// @ai:intent Grade one line; unreadable lines score 0
    /// @ai:effects pure
    pub fn grade_line(line: usize, text: &str) -> GradedRecord {
        match GradeRequest::parse(text) {
            Ok(request) => GradedRecord::from_report(line, &grade_report(&request.sample, &request.item)),
            Err(e) => {
                tracing::warn!("Line {} is not a grading request: {:#}", line, e);
                GradedRecord::unreadable(line, format!("{:#}", e))
            }
        }
    }

    /// @ai:intent Grade numbered lines concurrently
    /// @ai:post output order matches input order
    /// @ai:effects spawn
    pub async fn grade_lines(&self, lines: Vec<(usize, String)>) -> Vec<GradedRecord> {
        tracing::debug!(
            total = lines.len(),
            concurrency = self.concurrency,
            "Starting batch grading"
        );

        let mut handles = Vec::with_capacity(lines.len());
        for (line, text) in lines {
            let semaphore = Arc::clone(&self.semaphore);
            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                Self::grade_line(line, &text)
            });
            handles.push((line, handle));
        }

        let mut records = Vec::with_capacity(handles.len());
        for (line, handle) in handles {
            match handle.await {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::error!("Grading task for line {} failed: {}", line, e);
                    records.push(GradedRecord::unreadable(line, e.to_string()));
                }
            }
        }

        records
    }

    /// @ai:intent Grade every request line in a JSONL file
    /// @ai:effects fs:read, spawn
    pub async fn grade_file(&self, path: &Path) -> Result<Vec<GradedRecord>> {
        let lines = read_request_lines(path)?;
        tracing::info!("Grading {} samples from {}", lines.len(), path.display());
        Ok(self.grade_lines(lines).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn request_line(expression: &str, result: i64, target: i64) -> String {
        json!({
            "sample": {"output_json": {"expression": expression, "result": result}},
            "item": {"nums": [4, 9, 10, 2], "target": target}
        })
        .to_string()
    }

    #[test]
    fn test_grade_line_unreadable() {
        let record = BatchGrader::grade_line(7, "{\"sample\": {}}");
        assert_eq!(record.line, 7);
        assert_eq!(record.score, 0);
        assert_eq!(record.outcome, "unreadable");
    }

    #[tokio::test]
    async fn test_grade_lines_preserves_order() {
        let lines: Vec<(usize, String)> = (0..40)
            .map(|i| {
                let text = if i % 2 == 0 {
                    request_line("(10-4)*(9-2)", 42, 42)
                } else {
                    request_line("(10-4)*(9-2)", 41, 42)
                };
                (i + 1, text)
            })
            .collect();

        let records = BatchGrader::new(3).grade_lines(lines).await;
        assert_eq!(records.len(), 40);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.line, i + 1);
            let expected = if i % 2 == 0 { 5 } else { 1 };
            assert_eq!(record.score, expected);
        }
    }

    #[tokio::test]
    async fn test_grade_file_skips_blank_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("samples.jsonl");
        let content = format!(
            "{}\n\n{}\nnot json\n",
            request_line("4+9+10+2", 25, 25),
            request_line("4+9+10+2", 25, 26)
        );
        std::fs::write(&path, content).unwrap();

        let records = BatchGrader::new(8).grade_file(&path).await.unwrap();
        let scores: Vec<u8> = records.iter().map(|r| r.score).collect();
        let lines: Vec<usize> = records.iter().map(|r| r.line).collect();
        assert_eq!(scores, vec![5, 4, 0]);
        assert_eq!(lines, vec![1, 3, 4]);
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        assert_eq!(BatchGrader::new(0).concurrency(), 1);
    }
}
