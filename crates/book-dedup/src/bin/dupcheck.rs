use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use book_dedup::{
    DEFAULT_ACTIVITY_COLUMN, DEFAULT_BLANK_CHECK_COLUMNS, DEFAULT_HEADER_ROW, DEFAULT_ID_COLUMN,
    DetectOptions, DetectionReport, SimilarityThreshold, detect_path,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "dupcheck",
    version,
    about = "Flag duplicated or near-duplicated books in student reading records"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scan an exported reading-activity sheet and print findings.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Input sheet exported as CSV (UTF-8 or EUC-KR).
    #[arg(short, long)]
    input: PathBuf,

    /// Minimum similarity ratio (0..=1) for two different entries to be reported.
    #[arg(short, long, default_value = "0.7")]
    threshold: String,

    /// Zero-based row that holds the column labels; rows above it are ignored.
    #[arg(long, default_value_t = DEFAULT_HEADER_ROW)]
    header_row: usize,

    /// Label of the student identifier column.
    #[arg(long, default_value = DEFAULT_ID_COLUMN)]
    id_column: String,

    /// Label of the reading activity column.
    #[arg(long, default_value = DEFAULT_ACTIVITY_COLUMN)]
    activity_column: String,

    /// Input delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Print the full report as JSON.
    #[arg(long)]
    json: bool,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_options(args: &CheckArgs) -> Result<DetectOptions> {
    let similarity_threshold = SimilarityThreshold::from_str(&args.threshold)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --threshold")?;

    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    Ok(DetectOptions {
        similarity_threshold,
        id_column: args.id_column.clone(),
        activity_column: args.activity_column.clone(),
        header_row: args.header_row,
        blank_check_columns: DEFAULT_BLANK_CHECK_COLUMNS,
        delimiter: args.delimiter as u8,
    })
}

fn print_section(title: &str, lines: &[String]) {
    println!("{title}");
    if lines.is_empty() {
        println!("  none found");
    } else {
        for line in lines {
            println!("  {line}");
        }
    }
}

fn print_report(report: &DetectionReport, json: bool) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(report).context("failed to render report as JSON")?;
        println!("{rendered}");
        return Ok(());
    }

    print_section("Duplicated books", &report.duplicate_messages());
    println!();
    print_section("Similar books", &report.similar_messages());
    Ok(())
}

fn log_report(report: &DetectionReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} row={:?}: {}",
                warning.code, warning.row, warning.message
            );
        }
    }
}

fn run_check(args: &CheckArgs) -> Result<DetectionReport> {
    let options = parse_options(args)?;
    let report = detect_path(&args.input, &options)
        .with_context(|| format!("failed to check '{}'", args.input.display()))?;
    print_report(&report, args.json)?;
    Ok(report)
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("book_dedup=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check(args) => match run_check(&args) {
            Ok(report) => {
                log_report(&report, args.verbose);
                if report.has_findings() {
                    ExitCode::from(2)
                } else {
                    ExitCode::SUCCESS
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
