//! @ai:module:intent Score distribution metrics for batch grading
//! @ai:module:layer application
//! @ai:module:public_api GradedRecord, ScoreDistribution, BatchResults, MetricsAggregator

pub mod aggregator;
pub mod types;

pub use aggregator::{MetricsAggregator, MetricsAggregatorTrait};
pub use types::{BatchResults, GradedRecord, ScoreDistribution, SCORE_LEVELS};
