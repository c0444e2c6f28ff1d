//! CLI entry point for the sales insights tool.
//!
//! Provides subcommands for merging the monthly extracts, producing a
//! headless report, and serving the interactive dashboard.

use anyhow::Result;
use clap::{Parser, Subcommand};
use sales_insights::analyzers::analyzer::build_report;
use sales_insights::server::DashboardServer;
use sales_insights::{ingest, output, records};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "sales_insights")]
#[command(about = "A tool to analyze monthly sales extracts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge and clean the extracts, then serve the dashboard
    Serve {
        /// Directory containing the monthly CSV extracts
        #[arg(short, long, default_value = "sales_data")]
        data_dir: String,

        /// Merged CSV cache; produced on first run, reused afterwards
        #[arg(short, long, default_value = "all_monthly_sales.csv")]
        cache: String,

        /// Port to bind on 127.0.0.1
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },
    /// Merge the monthly extracts into a single CSV
    Merge {
        /// Directory containing the monthly CSV extracts
        #[arg(short, long, default_value = "sales_data")]
        data_dir: String,

        /// File to write the merged CSV to
        #[arg(short, long, default_value = "all_monthly_sales.csv")]
        output: String,
    },
    /// Run all five analyses and emit the report as JSON
    Report {
        /// Directory containing the monthly CSV extracts
        #[arg(short, long, default_value = "sales_data")]
        data_dir: String,

        /// Merged CSV cache; produced on first run, reused afterwards
        #[arg(short, long, default_value = "all_monthly_sales.csv")]
        cache: String,

        /// File to write the JSON report to (logged to stdout when omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/sales_insights.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("sales_insights.log"));

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
        Commands::Serve {
            data_dir,
            cache,
            port,
        } => {
            let records = load_clean_records(&data_dir, &cache)?;
            DashboardServer::new(port, records).start().await?;
        }
        Commands::Merge { data_dir, output } => {
            let rows = ingest::read_extracts(Path::new(&data_dir))?;
            output::write_merged(Path::new(&output), &rows)?;
            info!(output = %output, rows = rows.len(), "Merged file written");
        }
        Commands::Report {
            data_dir,
            cache,
            output,
        } => {
            let records = load_clean_records(&data_dir, &cache)?;
            let report = build_report(&records);
            match output {
                Some(path) => {
                    output::write_report(Path::new(&path), &report)?;
                    info!(path = %path, "Report written");
                }
                None => output::print_report(&report)?,
            }
        }
    }

    Ok(())
}

/// Loads the cleaned sales table, merging the extracts first if the cache
/// file is not on disk yet.
#[tracing::instrument]
fn load_clean_records(data_dir: &str, cache: &str) -> Result<Vec<records::SaleRecord>> {
    let raw = ingest::load_or_merge(Path::new(data_dir), Path::new(cache))?;
    let cleaned = records::clean_records(raw);
    if cleaned.is_empty() {
        anyhow::bail!("no usable sales rows after cleaning");
    }
    Ok(cleaned)
}
