//! @ai:module:intent HTTP client for checking a deployed endpoint grader against the local one
//! @ai:module:layer infrastructure
//! @ai:module:public_api EndpointClient, EndpointClientTrait, MockEndpointClient, ProbeResult, probe_requests
//! @ai:module:stateless false

use crate::config::ProbeConfig;
use crate::runner::batch::GradeRequest;
use crate::runner::rate_limiter::{RateLimiter, RateLimiterTrait};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// @ai:intent Trait for a remote grader endpoint
#[allow(async_fn_in_trait)]
pub trait EndpointClientTrait: Send + Sync {
    /// @ai:intent Ask the endpoint to score one sample
    async fn score(&self, sample: &Value, item: &Value) -> Result<f64>;
}

#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    sample: &'a Value,
    item: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    score: f64,
}

/// @ai:intent reqwest client for a grader endpoint, rate limited
pub struct EndpointClient {
    client: reqwest::Client,
    url: String,
    rate_limiter: Arc<RateLimiter>,
}

impl EndpointClient {
    /// @ai:intent Create a client for the configured endpoint
    /// @ai:effects pure
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: config.url.clone(),
            rate_limiter: Arc::new(RateLimiter::new(config.requests_per_minute)),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl EndpointClientTrait for EndpointClient {
    /// @ai:effects network
    async fn score(&self, sample: &Value, item: &Value) -> Result<f64> {
        self.rate_limiter.acquire().await;

        let response = self
            .client
            .post(&self.url)
            .json(&ScoreRequest { sample, item })
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Endpoint error ({}): {}", status, error_text);
        }

        let body: ScoreResponse = response
            .json()
            .await
            .context("Failed to parse endpoint response")?;
        Ok(body.score)
    }
}

/// @ai:intent Client returning a fixed score, for tests
pub struct MockEndpointClient {
    score: f64,
}

impl MockEndpointClient {
    /// @ai:effects pure
    pub fn new(score: f64) -> Self {
        Self { score }
    }
}

impl EndpointClientTrait for MockEndpointClient {
    async fn score(&self, _sample: &Value, _item: &Value) -> Result<f64> {
        Ok(self.score)
    }
}

/// @ai:intent Local and remote score for one request line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    pub line: usize,
    pub local: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeResult {
    /// @ai:intent Whether the endpoint returned the same score as the local grader
    /// @ai:effects pure
    pub fn agrees(&self) -> bool {
        self.remote
            .map(|remote| (remote - f64::from(self.local)).abs() < f64::EPSILON)
            .unwrap_or(false)
    }
}

/// @ai:intent Score each request remotely and locally, in order
/// @ai:effects network
pub async fn probe_requests<C: EndpointClientTrait>(
    client: &C,
    lines: &[(usize, String)],
) -> Vec<ProbeResult> {
    let mut results = Vec::with_capacity(lines.len());

    for (line, text) in lines {
        let request = match GradeRequest::parse(text) {
            Ok(request) => request,
            Err(e) => {
                results.push(ProbeResult {
                    line: *line,
                    local: 0,
                    remote: None,
                    error: Some(format!("{:#}", e)),
                });
                continue;
            }
        };

        let local = countdown_grader::grade(&request.sample, &request.item).value();
        let result = match client.score(&request.sample, &request.item).await {
            Ok(remote) => ProbeResult {
                line: *line,
                local,
                remote: Some(remote),
                error: None,
            },
            Err(e) => {
                tracing::warn!("Probe of line {} failed: {:#}", line, e);
                ProbeResult {
                    line: *line,
                    local,
                    remote: None,
                    error: Some(format!("{:#}", e)),
                }
            }
        };

        if result.remote.is_some() && !result.agrees() {
            tracing::warn!(
                "Line {}: endpoint scored {:?}, local grader scored {}",
                line,
                result.remote,
                local
            );
        }
        results.push(result);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn exact_line() -> String {
        json!({
            "sample": {"output_json": {"expression": "2*3*4*1", "result": 24}},
            "item": {"nums": [2, 3, 4, 1], "target": 24}
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_mock_client() {
        let client = MockEndpointClient::new(3.0);
        let score = client.score(&json!({}), &json!({})).await.unwrap();
        assert_eq!(score, 3.0);
    }

    #[tokio::test]
    async fn test_probe_reports_agreement() {
        let lines = vec![(1, exact_line()), (2, "garbage".to_string())];

        let agreeing = probe_requests(&MockEndpointClient::new(5.0), &lines).await;
        assert!(agreeing[0].agrees());
        assert_eq!(agreeing[0].local, 5);
        assert!(agreeing[1].error.is_some());
        assert!(!agreeing[1].agrees());

        let disagreeing = probe_requests(&MockEndpointClient::new(0.0), &lines).await;
        assert!(!disagreeing[0].agrees());
    }

    #[test]
    fn test_client_uses_configured_url() {
        let config = ProbeConfig {
            url: "http://localhost:9999/score".to_string(),
            ..Default::default()
        };
        let client = EndpointClient::new(&config).unwrap();
        assert_eq!(client.url(), "http://localhost:9999/score");
    }
}
