//! Load → render → write pipelines behind the two subcommands

use crate::error::ReportError;
use crate::history::{last_n, load_trends, DASHBOARD_TREND_POINTS};
use crate::metrics::load_metrics;
use crate::reporter::{ChartOptions, DashboardOptions, DashboardReporter, SummaryReporter, TrendChart};
use crate::stats::SummaryStats;
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};

pub const CHART_FILENAME: &str = "test_quality_trends.png";
pub const SUMMARY_FILENAME: &str = "test_quality_summary.md";

/// What happened to the chart image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartOutcome {
    Written(PathBuf),
    /// Built without PNG support; summary still produced
    Unavailable,
    /// History was empty, nothing rendered
    NoData,
}

/// Artifacts produced by [`visualize_trends`]
#[derive(Debug, Clone)]
pub struct TrendOutcome {
    pub chart: ChartOutcome,
    pub summary: Option<PathBuf>,
    pub stats: Option<SummaryStats>,
}

impl TrendOutcome {
    pub fn is_empty(&self) -> bool {
        self.chart == ChartOutcome::NoData
    }
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), ReportError> {
    let contents = contents.as_ref();
    fs::write(path, contents).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Render the HTML dashboard. Both inputs are loaded before anything is written.
pub fn generate_dashboard(
    metrics_path: &Path,
    trend_path: &Path,
    output_path: &Path,
    options: &DashboardOptions,
    now: NaiveDateTime,
) -> Result<PathBuf, ReportError> {
    let snapshot = load_metrics(metrics_path)?;
    let trends = load_trends(trend_path)?;
    let recent = last_n(&trends, DASHBOARD_TREND_POINTS);
    log::debug!("Plotting {} of {} trend points", recent.len(), trends.len());

    let html = DashboardReporter::new(options.clone()).report(&snapshot, recent, now);
    write_file(output_path, html)?;
    Ok(output_path.to_path_buf())
}

/// Render the trend chart and summary into `output_dir`.
///
/// The directory is created first. An empty history produces no files.
/// A missing `charts` feature degrades to the summary alone.
pub fn visualize_trends(
    trend_path: &Path,
    output_dir: &Path,
    options: &ChartOptions,
    now: NaiveDateTime,
) -> Result<TrendOutcome, ReportError> {
    fs::create_dir_all(output_dir).map_err(|source| ReportError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let trends = load_trends(trend_path)?;
    if trends.is_empty() {
        return Ok(TrendOutcome {
            chart: ChartOutcome::NoData,
            summary: None,
            stats: None,
        });
    }

    let chart = match TrendChart::new(options.clone()).render_png(&trends) {
        Ok(png) => {
            let path = output_dir.join(CHART_FILENAME);
            write_file(&path, png)?;
            ChartOutcome::Written(path)
        }
        Err(e) if e.is_recoverable() => {
            log::debug!("Skipping chart: {}", e);
            ChartOutcome::Unavailable
        }
        Err(e) => return Err(e),
    };

    let stats = SummaryStats::compute(&trends);
    let summary = match &stats {
        Some(stats) => {
            log::debug!("Summary window: {} points", stats.window);
            let path = output_dir.join(SUMMARY_FILENAME);
            write_file(&path, SummaryReporter::new().report(stats, now))?;
            Some(path)
        }
        None => None,
    };

    Ok(TrendOutcome { chart, summary, stats })
}
