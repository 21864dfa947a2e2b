//! @ai:module:intent Metric types for batch grading results
//! @ai:module:layer domain
//! @ai:module:public_api GradedRecord, ScoreDistribution, BatchResults
//! @ai:module:stateless true

use countdown_grader::{GradeReport, Score};
use serde::{Deserialize, Serialize};

/// Number of distinct scores, 0 through 5.
pub const SCORE_LEVELS: usize = Score::MAX as usize + 1;

/// @ai:intent Outcome of grading one input line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedRecord {
    /// 1-based line number in the input file
    pub line: usize,
    pub score: u8,
    /// Stage where grading ended ("compare" when fully graded)
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GradedRecord {
    /// @ai:intent Summarise a grade report for one line
    /// @ai:effects pure
    pub fn from_report(line: usize, report: &GradeReport) -> Self {
        Self {
            line,
            score: report.score.value(),
            outcome: report.stage.as_str().to_string(),
            error: report.error.clone(),
        }
    }

    /// @ai:intent Record for a line that was not a {sample, item} request
    /// @ai:effects pure
    pub fn unreadable(line: usize, error: impl Into<String>) -> Self {
        Self {
            line,
            score: Score::ZERO.value(),
            outcome: "unreadable".to_string(),
            error: Some(error.into()),
        }
    }
}

/// @ai:intent Histogram and rates over a set of scores
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    /// counts[s] = number of records scoring s
    pub counts: [u64; SCORE_LEVELS],
    pub total: u64,
    pub mean_score: f64,
    /// percentage scoring 5
    pub exact_rate: f64,
    /// percentage scoring above 0
    pub graded_rate: f64,
    /// percentage scoring 1 (self-reported result disagrees with the expression)
    pub mismatch_rate: f64,
}

impl ScoreDistribution {
    /// @ai:intent Count of records with the given score
    /// @ai:effects pure
    pub fn count(&self, score: Score) -> u64 {
        self.counts[score.value() as usize]
    }
}

/// @ai:intent Complete results of one batch grading run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    pub timestamp: String,
    pub input: String,
    pub distribution: ScoreDistribution,
    pub records: Vec<GradedRecord>,
}
