//! @ai:module:intent Markdown report generation
//! @ai:module:layer infrastructure
//! @ai:module:public_api MarkdownReporter
//! @ai:module:stateless true

use crate::metrics::{BatchResults, ScoreDistribution};
use anyhow::Result;
use std::fmt::Write as FmtWrite;
use std::path::Path;

/// Width of the longest histogram bar.
const BAR_WIDTH: u64 = 40;

/// Failed records listed individually before the list is truncated.
const MAX_LISTED_FAILURES: usize = 20;

/// @ai:intent Trait for Markdown report generation
pub trait MarkdownReporterTrait: Send + Sync {
    /// @ai:intent Generate Markdown report from results
    fn generate(&self, results: &BatchResults, output_path: &Path) -> Result<()>;
}

/// @ai:intent Generates Markdown reports from batch results
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:effects pure
    fn generate_summary(results: &BatchResults) -> String {
        let mut output = String::new();
        let d = &results.distribution;

        writeln!(output, "# Countdown Grading Results").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "**Date:** {}", results.timestamp).unwrap();
        writeln!(output, "**Input:** {}", results.input).unwrap();
        writeln!(output).unwrap();

        writeln!(output, "## Summary").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "| Metric | Value |").unwrap();
        writeln!(output, "|--------|-------|").unwrap();
        writeln!(output, "| Samples | {} |", d.total).unwrap();
        writeln!(output, "| Mean Score | {:.2} |", d.mean_score).unwrap();
        writeln!(output, "| Exact Match Rate | {:.1}% |", d.exact_rate).unwrap();
        writeln!(output, "| Graded Rate | {:.1}% |", d.graded_rate).unwrap();
        writeln!(output, "| Result Mismatch Rate | {:.1}% |", d.mismatch_rate).unwrap();
        writeln!(output).unwrap();

        output
    }

    /// @ai:intent Score histogram as a table with text bars
    /// @ai:effects pure
    fn generate_histogram(distribution: &ScoreDistribution) -> String {
        let mut output = String::new();
        let max = distribution.counts.iter().copied().max().unwrap_or(0);

        writeln!(output, "## Score Distribution").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "| Score | Count | Share | |").unwrap();
        writeln!(output, "|-------|-------|-------|---|").unwrap();

        for (score, count) in distribution.counts.iter().enumerate().rev() {
            let share = if distribution.total == 0 {
                0.0
            } else {
                *count as f64 / distribution.total as f64 * 100.0
            };
            let bar_len = if max == 0 { 0 } else { count * BAR_WIDTH / max };
            writeln!(
                output,
                "| {} | {} | {:.1}% | {} |",
                score,
                count,
                share,
                "#".repeat(bar_len as usize)
            )
            .unwrap();
        }

        writeln!(output).unwrap();
        output
    }

    /// @ai:intent List the lines that scored zero and why
    /// @ai:effects pure
    fn generate_failures(results: &BatchResults) -> String {
        let mut output = String::new();
        let failures: Vec<_> = results.records.iter().filter(|r| r.score == 0).collect();

        if failures.is_empty() {
            return output;
        }

        writeln!(output, "## Ungraded Samples").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "| Line | Stage | Error |").unwrap();
        writeln!(output, "|------|-------|-------|").unwrap();

        for record in failures.iter().take(MAX_LISTED_FAILURES) {
            writeln!(
                output,
                "| {} | {} | {} |",
                record.line,
                record.outcome,
                record.error.as_deref().unwrap_or("").replace('|', "\\|")
            )
            .unwrap();
        }

        if failures.len() > MAX_LISTED_FAILURES {
            writeln!(output).unwrap();
            writeln!(
                output,
                "_{} more not shown._",
                failures.len() - MAX_LISTED_FAILURES
            )
            .unwrap();
        }

        writeln!(output).unwrap();
        output
    }
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownReporterTrait for MarkdownReporter {
    /// @ai:effects fs:write
    fn generate(&self, results: &BatchResults, output_path: &Path) -> Result<()> {
        let mut content = Self::generate_summary(results);
        content.push_str(&Self::generate_histogram(&results.distribution));
        content.push_str(&Self::generate_failures(results));

        std::fs::write(output_path, content)?;
        Ok(())
    }
}
