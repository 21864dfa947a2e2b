//! @ai:module:intent Statistical aggregation of graded records
//! @ai:module:layer application
//! @ai:module:public_api MetricsAggregator, MetricsAggregatorTrait
//! @ai:module:stateless true

use crate::metrics::types::{BatchResults, GradedRecord, ScoreDistribution, SCORE_LEVELS};
use countdown_grader::Score;

/// @ai:intent Trait for metrics aggregation
pub trait MetricsAggregatorTrait: Send + Sync {
    /// @ai:intent Aggregate graded records into batch results
    fn aggregate(&self, records: &[GradedRecord], input: &str) -> BatchResults;
}

/// @ai:intent Aggregates graded records into a score distribution
pub struct MetricsAggregator;

impl MetricsAggregator {
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Build the histogram and rates for a set of scores
    /// @ai:pre every score is in 0..=5
    /// @ai:effects pure
    pub fn distribution<I: IntoIterator<Item = u8>>(scores: I) -> ScoreDistribution {
        let mut counts = [0u64; SCORE_LEVELS];
        for score in scores {
            let bucket = (score as usize).min(SCORE_LEVELS - 1);
            counts[bucket] += 1;
        }

        let total: u64 = counts.iter().sum();
        if total == 0 {
            return ScoreDistribution::default();
        }

        let weighted: u64 = counts
            .iter()
            .enumerate()
            .map(|(score, count)| score as u64 * count)
            .sum();

        ScoreDistribution {
            counts,
            total,
            mean_score: weighted as f64 / total as f64,
            exact_rate: percentage(counts[Score::EXACT.value() as usize], total),
            graded_rate: percentage(total - counts[Score::ZERO.value() as usize], total),
            mismatch_rate: percentage(counts[Score::MISMATCH.value() as usize], total),
        }
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

impl MetricsAggregatorTrait for MetricsAggregator {
    /// @ai:effects time
    fn aggregate(&self, records: &[GradedRecord], input: &str) -> BatchResults {
        BatchResults {
            timestamp: chrono::Utc::now().to_rfc3339(),
            input: input.to_string(),
            distribution: Self::distribution(records.iter().map(|r| r.score)),
            records: records.to_vec(),
        }
    }
}
