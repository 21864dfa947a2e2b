//! @ai:module:intent Batch grading and remote endpoint probing
//! @ai:module:layer application
//! @ai:module:public_api BatchGrader, GradeRequest, EndpointClient, RateLimiter

pub mod batch;
pub mod client;
pub mod rate_limiter;

pub use batch::{read_request_lines, BatchGrader, GradeRequest};
pub use client::{
    probe_requests, EndpointClient, EndpointClientTrait, MockEndpointClient, ProbeResult,
};
pub use rate_limiter::{RateLimiter, RateLimiterTrait};
