//! @ai:module:intent Request handlers for the endpoint grader and calculator tool
//! @ai:module:layer presentation
//! @ai:module:public_api health, grade_sample, evaluate_tool, GraderRequest, GraderResponse, ToolCallRequest, ToolCallOutput
//! @ai:module:depends_on countdown_grader, trace, service::state

use super::error::{ApiError, ApiResult};
use super::state::AppState;
use crate::trace::TraceStoreTrait;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use countdown_grader::{evaluate, numbers_used_correctly, scorer::coerce_nums};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const DEFAULT_CALL_ID: &str = "call_evaluate_1";

/// @ai:intent Body posted by the evaluation service for one sample
#[derive(Debug, Clone, Deserialize)]
pub struct GraderRequest {
    pub sample: Value,
    pub item: Value,
    #[serde(default)]
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraderResponse {
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_called: Option<bool>,
}

/// @ai:intent Function-call wrapper sent by agentic RFT, or direct arguments for local use
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolCallRequest {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub call_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// JSON-encoded arguments object
    #[serde(default)]
    pub arguments: Option<String>,
    #[serde(default)]
    pub item: Option<Value>,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub expression: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallOutput {
    #[serde(rename = "type")]
    pub kind: String,
    pub call_id: String,
    pub id: String,
    /// JSON-encoded result object
    pub output: String,
}

/// @ai:intent Liveness probe
/// @ai:effects pure
pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// @ai:intent Grade one sample; always answers with a score for well-formed bodies
/// @ai:effects state:read
pub async fn grade_sample(
    State(state): State<AppState>,
    payload: Result<Json<GraderRequest>, JsonRejection>,
) -> ApiResult<Json<GraderResponse>> {
    let Json(request) = payload?;

    let score = countdown_grader::grade(&request.sample, &request.item);

    let tool_called = match request.trace_id.as_deref() {
        Some(trace_id) => Some(state.traces.was_tool_called(trace_id).await),
        None => None,
    };

    tracing::info!(
        score = score.value(),
        trace_id = request.trace_id.as_deref().unwrap_or(""),
        "graded sample"
    );

    Ok(Json(GraderResponse {
        score: score.as_f64(),
        tool_called,
    }))
}

/// @ai:intent Calculator tool: evaluate an expression safely and record the trace
/// @ai:effects state:write
pub async fn evaluate_tool(
    State(state): State<AppState>,
    payload: Result<Json<ToolCallRequest>, JsonRejection>,
) -> ApiResult<Json<ToolCallOutput>> {
    let Json(request) = payload?;

    if let Some(trace_id) = request.trace_id.as_deref() {
        state.traces.mark_tool_called(trace_id).await;
    }

    let args = parse_arguments(request.arguments.as_deref());
    let expression = request
        .expression
        .clone()
        .or_else(|| args.get("expression").and_then(Value::as_str).map(str::to_string));

    let output = match expression {
        Some(expression) => run_calculator(&expression, request.item.as_ref()),
        None => json!({"error": "missing expression"}),
    };

    let call_id = request
        .call_id
        .clone()
        .unwrap_or_else(|| DEFAULT_CALL_ID.to_string());
    let id = request
        .id
        .clone()
        .unwrap_or_else(|| format!("fc_{}", call_id.replace("call_", "")));

    tracing::debug!(
        tool = request.name.as_deref().unwrap_or("evaluate"),
        call_id = %call_id,
        "tool call served"
    );

    let output = serde_json::to_string(&output).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(ToolCallOutput {
        kind: "function_call_output".to_string(),
        call_id,
        id,
        output,
    }))
}

/// Unparseable or non-object arguments count as no arguments.
fn parse_arguments(arguments: Option<&str>) -> Map<String, Value> {
    match arguments.map(serde_json::from_str::<Value>) {
        Some(Ok(Value::Object(map))) => map,
        _ => Map::new(),
    }
}

/// @ai:intent Evaluate and, when the puzzle is known, report whether its numbers were used
/// @ai:effects pure
fn run_calculator(expression: &str, item: Option<&Value>) -> Value {
    let mut output = match evaluate(expression) {
        Ok(value) => json!({"value": value.to_json()}),
        Err(e) => json!({"error": e.to_string()}),
    };

    let nums = item
        .and_then(|item| item.get("nums"))
        .and_then(|nums| coerce_nums(nums).ok());
    if let (Some(nums), Some(map)) = (nums, output.as_object_mut()) {
        map.insert(
            "numbers_ok".to_string(),
            Value::Bool(numbers_used_correctly(expression, &nums)),
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_must_be_an_object() {
        assert!(parse_arguments(None).is_empty());
        assert!(parse_arguments(Some("not json")).is_empty());
        assert!(parse_arguments(Some("[1, 2]")).is_empty());
        assert_eq!(
            parse_arguments(Some(r#"{"expression": "1+2"}"#))["expression"],
            "1+2"
        );
    }

    #[test]
    fn test_calculator_reports_value_or_error() {
        assert_eq!(run_calculator("6*7", None), json!({"value": 42}));
        assert_eq!(run_calculator("7/2", None), json!({"value": 3.5}));

        let failed = run_calculator("__import__('os')", None);
        assert!(failed["error"].as_str().unwrap().contains("invalid expression"));
    }

    #[test]
    fn test_calculator_checks_numbers_when_item_given() {
        let item = json!({"nums": "[4, 9, 10, 2]", "target": "42"});
        let out = run_calculator("(10-4)*(9-2)", Some(&item));
        assert_eq!(out["numbers_ok"], true);

        let out = run_calculator("10*4+2", Some(&item));
        assert_eq!(out["numbers_ok"], false);
    }
}
