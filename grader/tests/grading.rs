use countdown_grader::{grade, grade_report, ModelSample, PuzzleItem, Score, Stage};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn answer(expression: &str, result: Value) -> Value {
    json!({"output_json": {"expression": expression, "result": result}})
}

fn puzzle(nums: &[i64], target: i64) -> Value {
    json!({"nums": nums, "target": target})
}

#[test]
fn exact_answer_scores_five() {
    let item = puzzle(&[4, 9, 10, 2], 42);
    assert_eq!(grade(&answer("(10-4)*(9-2)", json!(42)), &item), Score::EXACT);
}

#[test]
fn self_reported_mismatch_scores_one_even_on_target() {
    let item = puzzle(&[4, 9, 10, 2], 42);
    assert_eq!(grade(&answer("(10-4)*(9-2)", json!(43)), &item), Score::MISMATCH);
}

#[test]
fn near_misses_decay_with_distance() {
    let item = puzzle(&[4, 9, 10, 2], 26);
    assert_eq!(grade(&answer("4+9+10+2", json!(25)), &item), Score::NEAR);

    let item = puzzle(&[4, 9, 10, 2], 30);
    assert_eq!(grade(&answer("4+9+10+2", json!(25)), &item), Score::CLOSE);

    let item = puzzle(&[4, 9, 10, 2], 31);
    assert_eq!(grade(&answer("4+9+10+2", json!(25)), &item), Score::FAR);
}

#[test]
fn misusing_numbers_scores_zero() {
    let item = puzzle(&[4, 9, 10, 2], 23);
    assert_eq!(grade(&answer("4+9+10", json!(23)), &item), Score::ZERO);
    assert_eq!(grade(&answer("4+9+10+2-2", json!(23)), &item), Score::ZERO);
    assert_eq!(grade(&answer("4+9+10+2*1", json!(25)), &item), Score::ZERO);
}

#[test]
fn unparseable_output_scores_zero() {
    let item = puzzle(&[4, 9, 10, 2], 42);
    let sample = json!({"output_text": "The answer is (10-4)*(9-2) = 42"});
    assert_eq!(grade(&sample, &item), Score::ZERO);
}

#[test]
fn hostile_expressions_score_zero() {
    let item = puzzle(&[4, 9, 10, 2], 42);
    for expression in [
        "__import__('os').system('rm -rf /')",
        "open('/etc/passwd').read()",
        "(10-4)*(9-2) if True else 0",
        "[4, 9, 10, 2]",
        "eval('42')",
        "4;9;10;2",
    ] {
        let report = grade_report(&answer(expression, json!(42)), &item);
        assert_eq!(report.score, Score::ZERO, "{}", expression);
        assert_eq!(report.stage, Stage::Evaluate, "{}", expression);
    }
}

#[test]
fn grading_is_total_over_odd_inputs() {
    let odd_values = [
        Value::Null,
        json!(true),
        json!(7),
        json!("text"),
        json!([1, 2, 3]),
        json!({}),
        json!({"output_json": {"expression": 5, "result": {}}}),
        json!({"output_json": {"expression": "1/0", "result": 0}}),
        json!({"output_text": "{\"expression\": \"9**9**9\", \"result\": 1}"}),
    ];
    for sample in &odd_values {
        for item in &odd_values {
            assert!(grade(sample, item).value() <= Score::MAX);
        }
    }
}

#[test]
fn grading_is_idempotent() {
    let sample = json!({"output_text": "{\"expression\": \"10*2+4\", \"result\": \"24\"}"});
    let item = json!({"nums": "[10, 2, 4]", "target": "24"});
    let first = grade(&sample, &item);
    assert_eq!(first, Score::EXACT);
    for _ in 0..10 {
        assert_eq!(grade(&sample, &item), first);
    }
}

#[test]
fn prose_around_json_scores_zero() {
    let item = json!({"nums": [4, 9, 10, 2], "target": 24});
    let sample = json!({
        "output_text": "Sure! {\"expression\": \"4*9-10-2\", \"result\": \"24\"} hope that helps"
    });
    assert_eq!(grade(&sample, &item), Score::ZERO);

    let fenced = json!({
        "output_text": "```json\n{\"expression\": \"4*9-10-2\", \"result\": \"24\"}\n```"
    });
    assert_eq!(grade(&fenced, &item), Score::ZERO);
}

#[test]
fn typed_entry_point_matches_untyped() {
    let sample = ModelSample::from_text("{\"expression\": \"(6-2)*5+4\", \"result\": 24}");
    let puzzle = PuzzleItem::new(vec![6, 2, 5, 4], 24);
    assert_eq!(countdown_grader::grade_puzzle(&sample, &puzzle), Score::EXACT);
}
