//! @ai:module:intent Countdown grader library: safe evaluation, number usage, scoring
//! @ai:module:layer infrastructure
//! @ai:module:public_api ast, error, evaluator, lexer, output, parser, payload, scorer, validator
//! @ai:module:stateless true
//!
//! # Countdown Grader
//!
//! Grades model answers to Countdown arithmetic puzzles. A sample carries a JSON
//! object `{"expression": ..., "result": ...}`; the item carries the puzzle
//! numbers and the target. Every sample maps to an integer score in `0..=5`.
//!
//! ## Example
//!
//! ```rust
//! use countdown_grader::{evaluate, grade, numbers_used_correctly, Number};
//! use serde_json::json;
//!
//! assert_eq!(evaluate("(10-4)*(9-2)").unwrap(), Number::Int(42));
//! assert!(numbers_used_correctly("(10-4)*(9-2)", &[4, 9, 10, 2]));
//!
//! let sample = json!({"output_json": {"expression": "(10-4)*(9-2)", "result": 42}});
//! let item = json!({"nums": [4, 9, 10, 2], "target": 42});
//! assert_eq!(grade(&sample, &item).value(), 5);
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod payload;
pub mod scorer;
pub mod validator;

pub use ast::{BinaryOp, Expr, Number, UnaryOp};
pub use error::{Error, Result};
pub use evaluator::{evaluate, evaluate_expr};
pub use output::{format_evaluation, format_grade_report, format_usage, OutputFormat};
pub use parser::parse_expression;
pub use payload::{extract_output_text, extract_payload, ModelSample};
pub use scorer::{grade, grade_puzzle, grade_report, try_grade, GradeReport, Graded, PuzzleItem, Score, Stage};
pub use validator::{check_number_usage, numbers_used_correctly, scan_literals, LiteralScan};
