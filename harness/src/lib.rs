//! @ai:module:intent Countdown RFT harness library
//! @ai:module:layer application
//! @ai:module:public_api config, trace, service, dataset, runner, metrics, report

pub mod config;
pub mod dataset;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod service;
pub mod trace;

pub use config::HarnessConfig;
pub use dataset::{DatasetFormat, DatasetLoader, PuzzleRecord};
pub use metrics::{BatchResults, GradedRecord, MetricsAggregator, ScoreDistribution};
pub use report::ReportGenerator;
pub use runner::{BatchGrader, EndpointClient, EndpointClientTrait, GradeRequest};
pub use service::{create_router, AppState};
pub use trace::{TraceStore, TraceStoreTrait};
