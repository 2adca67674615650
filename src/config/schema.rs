//! Config schema and deserialization

use crate::reporter::chart::ChartOptions;
use crate::reporter::html::DashboardOptions;
use serde::Deserialize;
use std::path::PathBuf;

/// Default directory for trend artifacts, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "test_metrics/visualizations";

/// Chart image settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    /// Image width in pixels
    #[serde(default)]
    pub width: Option<u32>,

    /// Image height in pixels
    #[serde(default)]
    pub height: Option<u32>,

    /// Figure title
    #[serde(default)]
    pub title: Option<String>,
}

/// Root config structure for .qualhookrc.json
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Repository prefix removed from package paths
    #[serde(default)]
    pub package_prefix: Option<String>,

    /// Dashboard page title
    #[serde(default)]
    pub title: Option<String>,

    /// Default output directory for the trends command
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    #[serde(default)]
    pub chart: ChartConfig,
}

impl Config {
    /// Smallest accepted chart dimension
    pub const MIN_CHART_SIZE: u32 = 200;

    /// Merge CLI flags into config (CLI wins)
    pub fn merge_with_cli(mut self, title: Option<String>, output_dir: Option<PathBuf>) -> Self {
        if title.is_some() {
            self.title = title;
        }
        if output_dir.is_some() {
            self.output_dir = output_dir;
        }
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [("chart.width", self.chart.width), ("chart.height", self.chart.height)] {
            if let Some(v) = value {
                if v < Self::MIN_CHART_SIZE {
                    return Err(format!(
                        "{} must be at least {} pixels, got {}",
                        name,
                        Self::MIN_CHART_SIZE,
                        v
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        let mut options = DashboardOptions::default();
        if let Some(ref title) = self.title {
            options.title = title.clone();
        }
        if let Some(ref prefix) = self.package_prefix {
            options.package_prefix = prefix.clone();
        }
        options
    }

    pub fn chart_options(&self) -> ChartOptions {
        let mut options = ChartOptions::default();
        if let Some(width) = self.chart.width {
            options.width = width;
        }
        if let Some(height) = self.chart.height {
            options.height = height;
        }
        if let Some(ref title) = self.chart.title {
            options.title = title.clone();
        }
        options
    }
}
