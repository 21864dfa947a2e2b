//! @ai:module:intent Route table for the grader service
//! @ai:module:layer presentation
//! @ai:module:public_api create_router

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// @ai:intent Build the service router with request tracing
/// @ai:effects pure
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/grader", post(handlers::grade_sample))
        .route("/score", post(handlers::grade_sample))
        .route("/tool/evaluate", post(handlers::evaluate_tool))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn post_json(app: &Router, uri: &str, body: String) -> (StatusCode, Value) {
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn exact_answer() -> Value {
        json!({
            "sample": {"output_text": "{\"expression\": \"(10-4)*(9-2)\", \"result\": \"42\"}"},
            "item": {"nums": "[4, 9, 10, 2]", "target": "42"}
        })
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let app = create_router(AppState::default());
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn grader_scores_exact_answer() {
        let app = create_router(AppState::default());
        let (status, body) = post_json(&app, "/grader", exact_answer().to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"score": 5.0}));
    }

    #[tokio::test]
    async fn score_alias_matches_grader() {
        let app = create_router(AppState::default());
        let request = json!({
            "sample": {"output_json": {"expression": "4+9+10+2", "result": 25}},
            "item": {"nums": [4, 9, 10, 2], "target": 30}
        });
        let (_, grader) = post_json(&app, "/grader", request.to_string()).await;
        let (_, score) = post_json(&app, "/score", request.to_string()).await;
        assert_eq!(grader, score);
        assert_eq!(score["score"], 3.0);
    }

    #[tokio::test]
    async fn ungradeable_sample_scores_zero() {
        let app = create_router(AppState::default());
        let request = json!({"sample": {"output_text": "no idea"}, "item": {}});
        let (status, body) = post_json(&app, "/grader", request.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], 0.0);
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let app = create_router(AppState::default());
        let (status, body) = post_json(&app, "/grader", "{not json".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].is_string());

        let (status, _) = post_json(&app, "/grader", json!({"sample": {}}).to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn tool_call_marks_trace_for_grader() {
        let app = create_router(AppState::default());

        let mut request = exact_answer();
        request["trace_id"] = json!("trace-42");
        let (_, before) = post_json(&app, "/grader", request.to_string()).await;
        assert_eq!(before["tool_called"], false);

        let tool_call = json!({
            "type": "function_call",
            "call_id": "call_abc",
            "name": "evaluate",
            "arguments": "{\"expression\": \"(10-4)*(9-2)\"}",
            "trace_id": "trace-42"
        });
        let (status, output) = post_json(&app, "/tool/evaluate", tool_call.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(output["type"], "function_call_output");
        assert_eq!(output["call_id"], "call_abc");
        assert_eq!(output["id"], "fc_abc");

        let result: Value = serde_json::from_str(output["output"].as_str().unwrap()).unwrap();
        assert_eq!(result, json!({"value": 42}));

        let (_, after) = post_json(&app, "/grader", request.to_string()).await;
        assert_eq!(after["tool_called"], true);
        assert_eq!(after["score"], 5.0);
    }

    #[tokio::test]
    async fn tool_call_defaults_ids_and_reports_errors() {
        let app = create_router(AppState::default());
        let (_, output) =
            post_json(&app, "/tool/evaluate", json!({"expression": "1/0"}).to_string()).await;
        assert_eq!(output["call_id"], "call_evaluate_1");
        assert_eq!(output["id"], "fc_evaluate_1");

        let result: Value = serde_json::from_str(output["output"].as_str().unwrap()).unwrap();
        assert!(result["error"].as_str().unwrap().contains("division by zero"));
    }
}
