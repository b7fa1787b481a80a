//! CLI entry point for the final-test yield rater.
//!
//! Provides subcommands for running the full analysis on a yield control
//! table, printing the summary statistics, and listing the worksheets of
//! a workbook.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use ft_yield_rater::{
    ingest::{SheetConfig, list_sheets},
    output::{print_json, write_csv, write_workbook},
    pipeline::run_analysis,
};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ft_yield_rater")]
#[command(about = "A tool to analyze final-test yield control tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a yield workbook and write the annotated output workbook
    Analyze {
        /// Path to the input .xlsx workbook
        #[arg(value_name = "WORKBOOK")]
        input: PathBuf,

        /// Worksheet to read (defaults to the first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Rows above the header row
        #[arg(long, default_value_t = 1)]
        skip_rows: usize,

        /// Output workbook path
        #[arg(short, long, default_value = "yield_trend.xlsx")]
        output: PathBuf,

        /// Also export the cleaned records as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Dump per-stage CSV snapshots into this directory
        #[arg(long, value_name = "DIR")]
        stages: Option<PathBuf>,
    },
    /// Print per-program summary statistics as JSON without writing files
    Summarize {
        /// Path to the input .xlsx workbook
        #[arg(value_name = "WORKBOOK")]
        input: PathBuf,

        /// Worksheet to read (defaults to the first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Rows above the header row
        #[arg(long, default_value_t = 1)]
        skip_rows: usize,
    },
    /// List the worksheets in a workbook
    ListSheets {
        /// Path to the .xlsx workbook
        #[arg(value_name = "WORKBOOK")]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/ft_yield_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ft_yield_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            sheet,
            skip_rows,
            output,
            csv,
            stages,
        } => {
            let config = SheetConfig {
                sheet_name: sheet,
                skip_rows,
            };
            let analysis = run_analysis(&input, &config, stages.as_deref())?;

            if analysis.groups.is_empty() {
                warn!("no final-test groups survived cleaning; writing Summary sheet only");
            }

            write_workbook(&output, &analysis.groups, &analysis.report)?;
            if let Some(csv_path) = csv {
                write_csv(&csv_path, &analysis.records)?;
            }

            for program in &analysis.report.programs {
                info!(
                    station = %program.station,
                    lots = program.lots,
                    mean = program.mean,
                    min = program.min,
                    max = program.max,
                    "program summarized"
                );
            }
        }
        Commands::Summarize {
            input,
            sheet,
            skip_rows,
        } => {
            let config = SheetConfig {
                sheet_name: sheet,
                skip_rows,
            };
            let analysis = run_analysis(&input, &config, None)?;
            print_json(&analysis.report)?;
        }
        Commands::ListSheets { input } => {
            let sheets = list_sheets(&input)?;
            info!(total = sheets.len(), "worksheets found");
            for name in &sheets {
                info!(sheet = %name, "worksheet");
            }
        }
    }

    Ok(())
}
