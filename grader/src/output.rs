//! @ai:module:intent Format grading output for different formats (JSON, text)
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_grade_report, format_evaluation, format_usage
//! @ai:module:depends_on scorer, validator, ast
//! @ai:module:stateless true

use crate::ast::Number;
use crate::scorer::{GradeReport, Score};
use crate::validator::LiteralScan;
use colored::Colorize;
use serde_json::json;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

fn render_json(value: &serde_json::Value, format: OutputFormat) -> String {
    match format {
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value).unwrap_or_default(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// @ai:intent Format a grade report as a string
/// @ai:effects pure
pub fn format_grade_report(report: &GradeReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(report).unwrap_or_default(),
        OutputFormat::JsonPretty => serde_json::to_string_pretty(report).unwrap_or_default(),
        OutputFormat::Text => format_grade_report_text(report),
    }
}

/// @ai:intent Format a grade report as human-readable text
/// @ai:effects pure
fn format_grade_report_text(report: &GradeReport) -> String {
    let mut output = String::new();

    let score = report.score.to_string();
    let score = match report.score {
        Score::EXACT => score.green().bold(),
        Score::NEAR | Score::CLOSE => score.yellow().bold(),
        Score::ZERO => score.red().bold(),
        _ => score.normal().bold(),
    };
    output.push_str(&format!("score: {} / {}\n", score, Score::MAX));

    if let Some(expression) = &report.expression {
        output.push_str(&format!("  expression: {}\n", expression));
    }
    if let Some(value) = &report.value {
        output.push_str(&format!("  value:      {}\n", value));
    }
    if let (Some(reported), Some(target)) = (report.reported, report.target) {
        output.push_str(&format!("  reported:   {}\n", reported));
        output.push_str(&format!("  target:     {}\n", target));
    }

    match &report.error {
        Some(error) => output.push_str(&format!(
            "  {} at {}: {}\n",
            "failed".red(),
            report.stage.to_string().dimmed(),
            error
        )),
        None => output.push_str(&format!("  {}\n", "graded".green())),
    }

    output
}

/// @ai:intent Format the outcome of evaluating a bare expression
/// @ai:effects pure
pub fn format_evaluation(
    expression: &str,
    result: &crate::error::Result<Number>,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Text => match result {
            Ok(value) => format!("{} = {}", expression, value.to_string().bold()),
            Err(e) => format!("{} {}", "invalid:".red().bold(), e),
        },
        _ => {
            let value = match result {
                Ok(value) => json!({"expression": expression, "value": value.to_json()}),
                Err(e) => json!({"expression": expression, "error": e.to_string()}),
            };
            render_json(&value, format)
        }
    }
}

/// @ai:intent Format a number-usage check
/// @ai:effects pure
pub fn format_usage(scan: &LiteralScan, nums: &[i128], passed: bool, format: OutputFormat) -> String {
    let mut expected = nums.to_vec();
    expected.sort_unstable();
    let found = scan.sorted_values();

    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str(&format!("expected: {:?}\n", expected));
            output.push_str(&format!("found:    {:?}\n", found));
            if !scan.extraneous.is_empty() {
                output.push_str(&format!("extraneous: {}\n", scan.extraneous.join(", ").yellow()));
            }
            if passed {
                output.push_str(&format!("{} numbers used exactly once\n", "OK".green().bold()));
            } else {
                output.push_str(&format!("{} number usage mismatch\n", "FAIL".red().bold()));
            }
            output
        }
        _ => {
            let expected: Vec<String> = expected.iter().map(i128::to_string).collect();
            let found: Vec<String> = found.iter().map(i128::to_string).collect();
            render_json(
                &json!({
                    "passed": passed,
                    "expected": expected,
                    "found": found,
                    "extraneous": scan.extraneous,
                }),
                format,
            )
        }
    }
}
