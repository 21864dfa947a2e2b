//! @ai:module:intent CLI for the Countdown RFT harness
//! @ai:module:layer presentation

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use countdown_grader::Score;
use rft_harness::{
    config::{HarnessConfig, DEFAULT_CONFIG_FILE},
    dataset::{convert_records, write_jsonl, DatasetFormat, DatasetLoader, DatasetLoaderTrait},
    metrics::{BatchResults, MetricsAggregator, MetricsAggregatorTrait},
    report::ReportGenerator,
    runner::{probe_requests, read_request_lines, BatchGrader, EndpointClient, GradeRequest},
    service,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rft-harness")]
#[command(about = "Endpoint grader, dataset tooling and batch grading for Countdown RFT")]
#[command(version)]
struct Cli {
    /// Path to configuration file (defaults to rft-harness.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP endpoint grader
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Grade a single {"sample", "item"} JSON file
    Grade {
        /// Path to the request file
        #[arg(short, long)]
        input: PathBuf,

        /// Print the full grade report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Grade a JSONL file of {"sample", "item"} lines and write reports
    Batch {
        /// Path to the JSONL file
        #[arg(short, long)]
        input: PathBuf,

        /// Maximum concurrent gradings
        #[arg(long)]
        concurrency: Option<usize>,

        /// Output directory for results
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a puzzle dataset to eval or fine-tuning JSONL
    Convert {
        /// Dataset JSONL file or directory of JSONL files
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSONL file
        #[arg(short, long)]
        output: PathBuf,

        /// Target format
        #[arg(short, long, value_enum, default_value = "eval")]
        format: ConvertFormat,

        /// Maximum number of records to write
        #[arg(long)]
        max_records: Option<usize>,

        /// Required count of puzzle numbers
        #[arg(long)]
        arity: Option<usize>,
    },

    /// Compare a deployed endpoint grader against the local grader
    Probe {
        /// JSONL file (or single JSON document) of {"sample", "item"} requests
        #[arg(short, long)]
        input: PathBuf,

        /// Endpoint URL
        #[arg(long)]
        url: Option<String>,

        /// Requests per minute (0 for unlimited)
        #[arg(long)]
        rpm: Option<u32>,
    },

    /// Regenerate reports from an existing results.json
    Report {
        /// Path to results JSON file
        #[arg(short, long)]
        results: PathBuf,

        /// Output directory for reports
        #[arg(short, long, default_value = "reports")]
        output: PathBuf,
    },

    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ConvertFormat {
    Eval,
    Rft,
}

impl From<ConvertFormat> for DatasetFormat {
    fn from(f: ConvertFormat) -> Self {
        match f {
            ConvertFormat::Eval => DatasetFormat::Eval,
            ConvertFormat::Rft => DatasetFormat::Rft,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rft_harness=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    if let Commands::Init { output } = &cli.command {
        return init_config(output);
    }

    let config = HarnessConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { host, port } => serve(config, host, port).await,
        Commands::Grade { input, json } => grade_one(input, json),
        Commands::Batch {
            input,
            concurrency,
            output,
        } => run_batch(config, input, concurrency, output).await,
        Commands::Convert {
            input,
            output,
            format,
            max_records,
            arity,
        } => convert(config, input, output, format.into(), max_records, arity),
        Commands::Probe { input, url, rpm } => probe(config, input, url, rpm).await,
        Commands::Report { results, output } => generate_reports(results, output),
        Commands::Init { .. } => Ok(()),
    }
}

/// @ai:intent Run the endpoint grader with CLI overrides applied
/// @ai:effects network
async fn serve(mut config: HarnessConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    service::serve(&config).await
}

/// @ai:intent Grade one request file and print the score
/// @ai:effects fs:read, io
fn grade_one(input: PathBuf, json: bool) -> Result<()> {
    let request = GradeRequest::from_file(&input)?;
    let report = countdown_grader::grade_report(&request.sample, &request.item);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Score: {}/{}", report.score, Score::MAX);
    match &report.error {
        Some(error) => println!("Stopped at {}: {}", report.stage, error),
        None => {
            if let (Some(expression), Some(value)) = (&report.expression, &report.value) {
                println!("{} = {}", expression, value);
            }
        }
    }
    Ok(())
}

/// @ai:intent Grade a JSONL file, aggregate and write reports
/// @ai:effects fs:read, fs:write
async fn run_batch(
    config: HarnessConfig,
    input: PathBuf,
    concurrency: Option<usize>,
    output: Option<PathBuf>,
) -> Result<()> {
    let grader = BatchGrader::new(concurrency.unwrap_or(config.batch.concurrency));
    let records = grader.grade_file(&input).await?;

    let results = MetricsAggregator::new().aggregate(&records, &input.display().to_string());

    let base = output.unwrap_or(config.batch.output_dir);
    let output_dir = ReportGenerator::timestamped_dir(&base)?;
    ReportGenerator::new().generate_all(&results, &output_dir)?;

    print_summary(&results);
    Ok(())
}

/// @ai:intent Convert a dataset and write it as JSONL
/// @ai:effects fs:read, fs:write
fn convert(
    mut config: HarnessConfig,
    input: PathBuf,
    output: PathBuf,
    format: DatasetFormat,
    max_records: Option<usize>,
    arity: Option<usize>,
) -> Result<()> {
    if max_records.is_some() {
        config.dataset.max_records = max_records;
    }
    if let Some(arity) = arity {
        config.dataset.arity = arity;
    }

    let records = DatasetLoader::new().load(&input)?;
    let (values, summary) = convert_records(&records, &config.dataset, format);
    write_jsonl(&output, &values)?;

    println!(
        "Saved {} of {} records to {} in {} format ({} skipped: not {} numbers)",
        summary.written,
        summary.read,
        output.display(),
        format.as_str(),
        summary.wrong_arity,
        config.dataset.arity
    );
    Ok(())
}

/// @ai:intent Score requests against a remote endpoint and the local grader
/// @ai:effects network, fs:read
async fn probe(
    mut config: HarnessConfig,
    input: PathBuf,
    url: Option<String>,
    rpm: Option<u32>,
) -> Result<()> {
    if let Some(url) = url {
        config.probe.url = url;
    }
    if let Some(rpm) = rpm {
        config.probe.requests_per_minute = rpm;
    }

    let lines = if input.extension().map(|ext| ext == "jsonl").unwrap_or(false) {
        read_request_lines(&input)?
    } else {
        let content = std::fs::read_to_string(&input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        vec![(1, content)]
    };

    let client = EndpointClient::new(&config.probe)?;
    tracing::info!("Probing {} with {} requests", client.url(), lines.len());
    let results = probe_requests(&client, &lines).await;

    println!("{:<8} {:>8} {:>8}  {}", "Line", "Local", "Remote", "Status");
    println!("{}", "-".repeat(40));
    for result in &results {
        let remote = result
            .remote
            .map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| "-".to_string());
        let status = match (&result.error, result.agrees()) {
            (Some(error), _) => format!("error: {}", error),
            (None, true) => "ok".to_string(),
            (None, false) => "MISMATCH".to_string(),
        };
        println!("{:<8} {:>8} {:>8}  {}", result.line, result.local, remote, status);
    }

    let agreeing = results.iter().filter(|r| r.agrees()).count();
    println!();
    println!("{}/{} endpoint scores match the local grader", agreeing, results.len());

    if agreeing != results.len() {
        anyhow::bail!("endpoint disagreed with the local grader on {} requests", results.len() - agreeing);
    }
    Ok(())
}

/// @ai:intent Generate reports from results file
/// @ai:effects fs:read, fs:write
fn generate_reports(results_path: PathBuf, output_dir: PathBuf) -> Result<()> {
    let generator = ReportGenerator::new();
    let results = generator.load_results(&results_path)?;
    generator.generate_all(&results, &output_dir)?;

    println!("Reports generated in {}", output_dir.display());
    Ok(())
}

/// @ai:intent Initialize default configuration file
/// @ai:effects fs:write
fn init_config(output: &Path) -> Result<()> {
    let config = HarnessConfig::default();
    config.save(output)?;
    println!("Configuration saved to {}", output.display());
    Ok(())
}

/// @ai:intent Print summary to console
/// @ai:effects io
fn print_summary(results: &BatchResults) {
    let d = &results.distribution;

    println!();
    println!("Countdown Grading Results");
    println!("=========================");
    println!();
    println!("{:<25} {:>10}", "Samples:", d.total);
    println!("{:<25} {:>10.2}", "Mean score:", d.mean_score);
    println!("{:<25} {:>9.1}%", "Exact match rate:", d.exact_rate);
    println!("{:<25} {:>9.1}%", "Graded rate:", d.graded_rate);
    println!("{:<25} {:>9.1}%", "Result mismatch rate:", d.mismatch_rate);
    println!();

    for (score, count) in d.counts.iter().enumerate().rev() {
        println!("  score {}: {}", score, count);
    }
    println!();
}
