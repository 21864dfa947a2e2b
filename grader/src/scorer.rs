//! @ai:module:intent Grade a model sample against a Countdown puzzle on a 0..=5 scale
//! @ai:module:layer application
//! @ai:module:public_api grade, try_grade, grade_report, grade_puzzle, Score, PuzzleItem, Stage, Graded, GradeReport
//! @ai:module:depends_on payload, evaluator, validator, error
//! @ai:module:stateless true

use crate::ast::{Number, I128_F64_LIMIT};
use crate::error::{Error, Result};
use crate::evaluator::evaluate;
use crate::payload::{extract_payload, ModelSample};
use crate::validator::check_number_usage;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;

/// @ai:intent Discrete reward on the ordinal scale 0..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    /// Ungradable or invalid sample.
    pub const ZERO: Score = Score(0);
    /// The model's reported result disagrees with its own expression.
    pub const MISMATCH: Score = Score(1);
    /// Correct arithmetic, more than 5 away from the target.
    pub const FAR: Score = Score(2);
    /// Within 5 of the target.
    pub const CLOSE: Score = Score(3);
    /// Within 1 of the target.
    pub const NEAR: Score = Score(4);
    /// Exactly the target.
    pub const EXACT: Score = Score(5);

    pub const MAX: u8 = 5;

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    /// @ai:intent Map the distance to target onto the closeness tiers
    /// @ai:effects pure
    /// @ai:example (0) -> EXACT
    /// @ai:example (1) -> NEAR
    /// @ai:example (5) -> CLOSE
    /// @ai:example (6) -> FAR
    pub fn from_distance(distance: u128) -> Self {
        match distance {
            0 => Score::EXACT,
            1 => Score::NEAR,
            2..=5 => Score::CLOSE,
            _ => Score::FAR,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl TryFrom<u8> for Score {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        if value <= Score::MAX {
            Ok(Score(value))
        } else {
            Err(value)
        }
    }
}

/// @ai:intent One Countdown puzzle instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PuzzleItem {
    pub nums: Vec<i128>,
    pub target: i128,
}

impl PuzzleItem {
    /// @ai:intent Create a puzzle from numbers and target
    /// @ai:effects pure
    pub fn new(nums: Vec<i128>, target: i128) -> Self {
        Self { nums, target }
    }

    /// @ai:intent Read a puzzle from a loosely typed item mapping
    ///            nums may be a list or a string encoding a list; target may be numeric text
    /// @ai:effects pure
    pub fn from_value(item: &Value) -> Result<Self> {
        let nums = coerce_nums(item.get("nums").unwrap_or(&Value::Null))?;
        let target = coerce_truncated(item.get("target").unwrap_or(&Value::Null), "target")?;
        Ok(Self { nums, target })
    }

    /// @ai:intent Render the puzzle as an item mapping
    /// @ai:effects pure
    pub fn to_value(&self) -> Value {
        json!({
            "nums": self.nums.iter().map(|n| Number::Int(*n).to_json()).collect::<Vec<_>>(),
            "target": Number::Int(self.target).to_json(),
        })
    }
}

/// @ai:intent States of the grading state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ExtractPayload,
    CheckFields,
    Evaluate,
    ValidateUsage,
    Compare,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ExtractPayload => "extract_payload",
            Stage::CheckFields => "check_fields",
            Stage::Evaluate => "evaluate",
            Stage::ValidateUsage => "validate_usage",
            Stage::Compare => "compare",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// @ai:intent Successful pass through every stage
#[derive(Debug, Clone, PartialEq)]
pub struct Graded {
    pub score: Score,
    pub expression: String,
    pub value: Number,
    pub reported: i128,
    pub target: i128,
}

/// @ai:intent Diagnostic description of one grading call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeReport {
    pub score: Score,
    /// last state entered before reaching the terminal state
    pub stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported: Option<i128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<i128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// @ai:intent Grade a sample; total over all inputs, failures score 0
/// @ai:post result is in 0..=5
/// @ai:effects pure
pub fn grade(sample: &Value, item: &Value) -> Score {
    match try_grade(sample, item) {
        Ok(graded) => graded.score,
        Err(_) => Score::ZERO,
    }
}

/// @ai:intent Grade a typed sample against a typed puzzle
/// @ai:effects pure
pub fn grade_puzzle(sample: &ModelSample, puzzle: &PuzzleItem) -> Score {
    grade(sample.as_value(), &puzzle.to_value())
}

/// @ai:intent Grade a sample, surfacing the error that ended grading early
/// @ai:effects pure
pub fn try_grade(sample: &Value, item: &Value) -> Result<Graded> {
    run(sample, item).map_err(|(_, e)| e)
}

/// @ai:intent Grade a sample and describe where the state machine terminated
/// @ai:effects pure
pub fn grade_report(sample: &Value, item: &Value) -> GradeReport {
    match run(sample, item) {
        Ok(graded) => GradeReport {
            score: graded.score,
            stage: Stage::Compare,
            expression: Some(graded.expression),
            value: Some(graded.value.to_json()),
            reported: Some(graded.reported),
            target: Some(graded.target),
            error_kind: None,
            error: None,
        },
        Err((stage, err)) => GradeReport {
            score: Score::ZERO,
            stage,
            expression: extract_payload(sample)
                .ok()
                .and_then(|p| p.get("expression").and_then(Value::as_str).map(str::to_string)),
            value: None,
            reported: None,
            target: None,
            error_kind: Some(err.kind()),
            error: Some(err.to_string()),
        },
    }
}

type StageResult<T> = std::result::Result<T, (Stage, Error)>;

/// @ai:intent Run ExtractPayload -> CheckFields -> Evaluate -> ValidateUsage -> Compare
/// @ai:effects pure
fn run(sample: &Value, item: &Value) -> StageResult<Graded> {
    let at = |stage: Stage| move |e: Error| (stage, e);

    let payload = extract_payload(sample).map_err(|e| {
        tracing::error!("failed to find JSON output in sample: {}", e);
        (Stage::ExtractPayload, e)
    })?;

    let (expression, result) = check_fields(&payload).map_err(|e| {
        tracing::warn!("{}", e);
        (Stage::CheckFields, e)
    })?;

    let value = evaluate(expression).map_err(|e| {
        tracing::error!("error evaluating expression {:?}: {}", expression, e);
        (Stage::Evaluate, e)
    })?;

    let nums = coerce_nums(item.get("nums").unwrap_or(&Value::Null)).map_err(|e| {
        tracing::error!("exception while grading: {}", e);
        (Stage::ValidateUsage, e)
    })?;
    check_number_usage(expression, &nums).map_err(|e| {
        tracing::info!("all numbers were not used exactly once: {}", e);
        (Stage::ValidateUsage, e)
    })?;

    let reported = coerce_truncated(result, "result").map_err(at(Stage::Compare))?;
    let target = coerce_truncated(item.get("target").unwrap_or(&Value::Null), "target")
        .map_err(at(Stage::Compare))?;

    let score = if !value.equals_integer(reported) {
        Score::MISMATCH
    } else {
        Score::from_distance(reported.abs_diff(target))
    };

    tracing::debug!(
        "graded {:?} = {} (reported {}, target {}) -> {}",
        expression,
        value,
        reported,
        target,
        score
    );

    Ok(Graded {
        score,
        expression: expression.to_string(),
        value,
        reported,
        target,
    })
}

/// @ai:intent Require a non-empty string expression and a non-empty result
/// @ai:effects pure
fn check_fields(payload: &Map<String, Value>) -> Result<(&str, &Value)> {
    let expression = match payload.get("expression") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.as_str(),
        _ => return Err(Error::MissingField("expression")),
    };

    let result = match payload.get("result") {
        None | Some(Value::Null) => return Err(Error::MissingField("result")),
        Some(Value::String(s)) if s.trim().is_empty() => return Err(Error::MissingField("result")),
        Some(Value::Array(a)) if a.is_empty() => return Err(Error::MissingField("result")),
        Some(Value::Object(o)) if o.is_empty() => return Err(Error::MissingField("result")),
        // falsy results count as absent
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => return Err(Error::MissingField("result")),
        Some(Value::Bool(false)) => return Err(Error::MissingField("result")),
        Some(value) => value,
    };

    Ok((expression, result))
}

/// @ai:intent Parse as floating point, then truncate toward zero
/// @ai:effects pure
/// @ai:example ("24.9") -> 24
/// @ai:example (-3.7) -> -3
pub fn coerce_truncated(value: &Value, what: &str) -> Result<i128> {
    let float = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| Error::Coercion(format!("{} {}", what, value)))?;

    if !float.is_finite() || float.trunc().abs() >= I128_F64_LIMIT {
        return Err(Error::Coercion(format!("{} {}", what, value)));
    }
    Ok(float.trunc() as i128)
}

/// @ai:intent Coerce a single puzzle number to an integer
/// @ai:effects pure
fn coerce_int(value: &Value) -> Result<i128> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i128::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(i128::from(u))
            } else {
                coerce_truncated(value, "number")
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i128>()
            .map_err(|_| Error::Coercion(format!("number {:?}", s))),
        other => Err(Error::Coercion(format!("number {}", other))),
    }
}

/// @ai:intent Coerce the puzzle numbers: list, JSON list string, or bracketed whitespace list
/// @ai:effects pure
/// @ai:example ("[4, 9, 10, 2]") -> [4, 9, 10, 2]
/// @ai:example ("[4 9 10 2]") -> [4, 9, 10, 2]
pub fn coerce_nums(value: &Value) -> Result<Vec<i128>> {
    match value {
        Value::Array(items) => items.iter().map(coerce_int).collect(),
        Value::String(text) => {
            if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text.trim()) {
                return items.iter().map(coerce_int).collect();
            }

            let inner = text
                .trim()
                .trim_start_matches(|c: char| c == '[' || c == '(')
                .trim_end_matches(|c: char| c == ']' || c == ')');
            let parts: Vec<&str> = inner
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|p| !p.is_empty())
                .collect();

            if parts.is_empty() {
                return Err(Error::Coercion(format!("nums {:?}", text)));
            }
            parts
                .into_iter()
                .map(|p| {
                    p.parse::<i128>()
                        .map_err(|_| Error::Coercion(format!("nums {:?}", text)))
                })
                .collect()
        }
        other => Err(Error::Coercion(format!("nums {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(expression: &str, result: Value) -> Value {
        json!({"output_json": {"expression": expression, "result": result}})
    }

    fn item() -> Value {
        json!({"nums": [4, 9, 10, 2], "target": 24})
    }

    #[test]
    fn test_exact_match_scores_five() {
        let five = json!({"nums": [10, 4, 2, 9, 2], "target": 23});
        assert_eq!(grade(&sample("(10-4)*2+9+2", json!("23")), &five), Score::EXACT);

        let three = json!({"nums": [10, 2, 4], "target": 24});
        assert_eq!(grade(&sample("10*2+4", json!("24")), &three), Score::EXACT);
    }

    #[test]
    fn test_self_report_mismatch_scores_one() {
        assert_eq!(grade(&sample("4+9+10+2", json!("24")), &item()), Score::MISMATCH);
    }

    #[test]
    fn test_closeness_tiers() {
        assert_eq!(grade(&sample("4+9+10+2", json!("25")), &item()), Score::NEAR);
        assert_eq!(grade(&sample("4*9-10-2", json!(24)), &item()), Score::EXACT);
        assert_eq!(grade(&sample("4*9-10+2", json!(28)), &item()), Score::CLOSE);
        assert_eq!(grade(&sample("4*9*10*2", json!(720)), &item()), Score::FAR);
    }

    #[test]
    fn test_missing_fields_score_zero() {
        assert_eq!(grade(&json!({"output_json": {"result": "24"}}), &item()), Score::ZERO);
        assert_eq!(grade(&sample("", json!("24")), &item()), Score::ZERO);
        assert_eq!(grade(&sample("4+9+10+2", json!("")), &item()), Score::ZERO);
        assert_eq!(grade(&sample("4+9+10+2", Value::Null), &item()), Score::ZERO);
    }

    #[test]
    fn test_zero_result_counts_as_missing() {
        let item = json!({"nums": [4, 4, 2, 2], "target": 1});
        assert_eq!(grade(&sample("4-4+2-2", json!(0)), &item), Score::ZERO);
        assert_eq!(grade(&sample("4-4+2-2", json!(0.0)), &item), Score::ZERO);
        assert_eq!(grade(&sample("4-4+2-2", json!(false)), &item), Score::ZERO);

        let report = grade_report(&sample("4-4+2-2", json!(0)), &item);
        assert_eq!(report.stage, Stage::CheckFields);
        assert_eq!(report.error_kind, Some("missing_field"));

        // the string "0" is non-empty text and is still graded
        assert_eq!(grade(&sample("4-4+2-2", json!("0")), &item), Score::NEAR);
    }

    #[test]
    fn test_result_with_decimal_point_is_truncated() {
        assert_eq!(grade(&sample("4+9+10+2", json!("25.0")), &item()), Score::NEAR);
        assert_eq!(grade(&sample("4+9+10+2", json!(25.7)), &item()), Score::NEAR);
    }

    #[test]
    fn test_fractional_value_never_matches_truncated_result() {
        // 9/2 = 4.5 while "4.5" truncates to 4
        let item = json!({"nums": [9, 2], "target": 4});
        assert_eq!(grade(&sample("9/2", json!("4.5")), &item), Score::MISMATCH);
    }

    #[test]
    fn test_stringified_item_fields() {
        let item = json!({"nums": "[4, 9, 10, 2]", "target": "24"});
        assert_eq!(grade(&sample("4*9-10-2", json!("24")), &item), Score::EXACT);

        let spaced = json!({"nums": "[4 9 10 2]", "target": "24.0"});
        assert_eq!(grade(&sample("4*9-10-2", json!("24")), &spaced), Score::EXACT);
    }

    #[test]
    fn test_uncoercible_values_score_zero() {
        assert_eq!(grade(&sample("4+9+10+2", json!("twenty")), &item()), Score::ZERO);
        assert_eq!(grade(&sample("4+9+10+2", json!(true)), &item()), Score::ZERO);
        let bad_target = json!({"nums": [4, 9, 10, 2], "target": "x"});
        assert_eq!(grade(&sample("4+9+10+2", json!("25")), &bad_target), Score::ZERO);

        let bad_nums = json!({"nums": "garbage", "target": 24});
        assert_eq!(grade(&sample("4+9+10+2", json!("25")), &bad_nums), Score::ZERO);
        assert_eq!(grade(&sample("4+9+10+2", json!("inf")), &item()), Score::ZERO);
    }

    #[test]
    fn test_report_names_terminal_stage() {
        let report = grade_report(&json!({"output_text": "no json here"}), &item());
        assert_eq!(report.stage, Stage::ExtractPayload);
        assert_eq!(report.error_kind, Some("malformed_payload"));

        let report = grade_report(&sample("4+9+10", json!("23")), &item());
        assert_eq!(report.stage, Stage::ValidateUsage);
        assert_eq!(report.score, Score::ZERO);

        let report = grade_report(&sample("4+9+10+2", json!("25")), &item());
        assert_eq!(report.stage, Stage::Compare);
        assert_eq!(report.score, Score::NEAR);
        assert_eq!(report.value, Some(json!(25)));
    }

    #[test]
    fn test_typed_puzzle_round_trip() {
        let puzzle = PuzzleItem::from_value(&json!({"nums": "[4, 9, 10, 2]", "target": "24"})).unwrap();
        assert_eq!(puzzle, PuzzleItem::new(vec![4, 9, 10, 2], 24));

        let s = ModelSample::from_json(json!({"expression": "4*9-10-2", "result": 24}));
        assert_eq!(grade_puzzle(&s, &puzzle), Score::EXACT);
    }

    #[test]
    fn test_score_conversions() {
        assert_eq!(Score::try_from(5), Ok(Score::EXACT));
        assert_eq!(Score::try_from(6), Err(6));
        assert_eq!(u8::from(Score::NEAR), 4);
        assert_eq!(serde_json::to_string(&Score::CLOSE).unwrap(), "3");
    }
}
