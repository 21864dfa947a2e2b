//! @ai:module:intent CLI entry point for the Countdown grader
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on scorer, evaluator, validator, output

use countdown_grader::{
    evaluate, grade_report, output, scan_literals, scorer::coerce_nums, validator, Error,
    OutputFormat,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "countdown-grader")]
#[command(author, version, about = "Countdown grader - safe evaluation and scoring of model answers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a JSON file holding {"sample": ..., "item": ...}
    Grade {
        /// Path to the request file
        path: PathBuf,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Evaluate an arithmetic expression with the safe evaluator
    Eval {
        /// Expression to evaluate
        expression: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Check that an expression uses exactly the given numbers
    Check {
        /// Expression to check
        expression: String,

        /// Puzzle numbers, comma separated (e.g. 4,9,10,2)
        #[arg(long, allow_hyphen_values = true)]
        nums: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

/// @ai:intent Load the sample and item from a request file
/// @ai:effects io
fn read_request(path: &Path) -> countdown_grader::Result<(Value, Value)> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let request: Value = serde_json::from_str(&content)?;

    let sample = request.get("sample").cloned().unwrap_or(Value::Null);
    let item = request.get("item").cloned().unwrap_or(Value::Null);
    Ok((sample, item))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("countdown_grader=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Grade { path, format } => match read_request(&path) {
            Ok((sample, item)) => {
                let report = grade_report(&sample, &item);
                println!("{}", output::format_grade_report(&report, format.into()));
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(2)
            }
        },

        Commands::Eval { expression, format } => {
            let result = evaluate(&expression);
            println!("{}", output::format_evaluation(&expression, &result, format.into()));
            if result.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }

        Commands::Check {
            expression,
            nums,
            format,
        } => match coerce_nums(&Value::String(nums)) {
            Ok(nums) => {
                let scan = scan_literals(&expression);
                let passed = validator::numbers_used_correctly(&expression, &nums);
                println!("{}", output::format_usage(&scan, &nums, passed, format.into()));
                if passed {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(1)
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(2)
            }
        },
    }
}
