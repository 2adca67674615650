//! Qualhook Report: test quality dashboard and trend CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use qualhook_report::config::load_config;
use qualhook_report::pipeline::{generate_dashboard, visualize_trends, ChartOutcome};
use qualhook_report::reporter::{is_charting_available, ChartOptions, JsonReporter};
use qualhook_report::ReportError;
use std::path::PathBuf;
use std::process::ExitCode;

/// Qualhook Report: render test quality dashboards and trend summaries
#[derive(Parser, Debug)]
#[command(name = "qualhook-report")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: search .qualhookrc.json in current dir and parents)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the HTML dashboard from a metrics snapshot and trend history
    Dashboard {
        /// Metrics JSON (top-level `metrics` object)
        metrics: PathBuf,

        /// Trend history JSON array, oldest first
        trends: PathBuf,

        /// Output HTML file
        output: PathBuf,

        /// Dashboard title
        #[arg(long)]
        title: Option<String>,
    },

    /// Render the trend chart and markdown summary
    Trends {
        /// Trend history JSON array, oldest first
        trends: PathBuf,

        /// Output directory (default: test_metrics/visualizations)
        output_dir: Option<PathBuf>,

        /// Also print summary statistics as JSON
        #[arg(long, short)]
        json: bool,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let work_dir = std::env::current_dir().context("Failed to resolve current directory")?;
    let config = load_config(&work_dir, args.config.as_deref())?;

    match args.command {
        Commands::Dashboard { metrics, trends, output, title } => {
            let config = config.merge_with_cli(title, None);
            let now = chrono::Local::now().naive_local();
            let path = generate_dashboard(&metrics, &trends, &output, &config.dashboard_options(), now)?;
            println!("Dashboard generated: {}", path.display());
        }
        Commands::Trends { trends, output_dir, json } => {
            let config = config.merge_with_cli(None, output_dir);
            run_trends(trends, config.output_dir(), config.chart_options(), json)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn run_trends(
    trends: PathBuf,
    output_dir: PathBuf,
    chart_options: ChartOptions,
    json: bool,
) -> Result<()> {
    if !is_charting_available() {
        eprintln!("{}: {}", "Warning".yellow(), ReportError::ChartsUnavailable);
        println!("Generating text summary only...");
    }

    let now = chrono::Local::now().naive_local();
    let outcome = visualize_trends(&trends, &output_dir, &chart_options, now)?;

    if outcome.is_empty() {
        println!("No trend data available");
        return Ok(());
    }
    if let ChartOutcome::Written(path) = &outcome.chart {
        println!("Trend visualization saved to: {}", path.display());
    }

    if let Some(path) = &outcome.summary {
        println!("Summary report saved to: {}", path.display());
    }

    if json {
        if let Some(stats) = &outcome.stats {
            println!("{}", JsonReporter::new().pretty().report(stats));
        }
    }

    Ok(())
}
