//! Metrics snapshot schema - a single point-in-time quality record
//!
//! The upstream collector writes the snapshot wrapped in a top-level
//! `metrics` object. Every numeric field defaults to 0 and every list to
//! empty; names of packages and tests are required.

use crate::error::ReportError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

/// The metrics JSON file as written by the collector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsDocument {
    pub metrics: MetricsSnapshot,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(default)]
    pub coverage: CoverageMetrics,
    #[serde(default)]
    pub quality_score: QualityScore,
    #[serde(default)]
    pub test_types: TestTypeCounts,
    #[serde(default)]
    pub flakiness: Flakiness,
    #[serde(default)]
    pub execution_time: ExecutionTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverageMetrics {
    /// Average coverage percentage (0-100)
    #[serde(default)]
    pub average: f64,
    #[serde(default)]
    pub by_package: Vec<PackageCoverage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageCoverage {
    /// Fully qualified package path
    pub package: String,
    #[serde(default)]
    pub coverage: f64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub test_files: u64,
    /// Set when coverage collection failed for this package
    #[serde(default)]
    pub error: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityScore {
    /// Composite score (0-100)
    #[serde(default)]
    pub overall: f64,
}

/// Test file counts by kind. `total_test_files` is reported as-is and is
/// not required to match the per-kind sum.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestTypeCounts {
    #[serde(default, deserialize_with = "deserialize_count")]
    pub unit_test_files: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub integration_test_files: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub e2e_test_files: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub benchmark_files: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub example_files: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub total_test_files: u64,
}

impl TestTypeCounts {
    /// Display rows in fixed order
    pub fn rows(&self) -> [(&'static str, u64); 5] {
        [
            ("Unit Tests", self.unit_test_files),
            ("Integration Tests", self.integration_test_files),
            ("E2E Tests", self.e2e_test_files),
            ("Benchmarks", self.benchmark_files),
            ("Examples", self.example_files),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Flakiness {
    #[serde(default, deserialize_with = "deserialize_count")]
    pub flaky_test_count: u64,
    #[serde(default)]
    pub flaky_tests: Vec<FlakyTest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlakyTest {
    pub test: String,
    #[serde(default)]
    pub package: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionTime {
    #[serde(default)]
    pub slowest_tests: Vec<SlowTest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlowTest {
    pub name: String,
    #[serde(default)]
    pub package: String,
    /// Duration in seconds
    #[serde(default)]
    pub duration: f64,
}

/// Decode a count from any JSON number. Fractions are rounded; negative
/// and non-finite values are rejected.
pub(crate) fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative count, got {}",
            value
        )));
    }
    Ok(value.round() as u64)
}

/// Load and decode a metrics snapshot file
pub fn load_metrics(path: &Path) -> Result<MetricsSnapshot, ReportError> {
    let content = fs::read_to_string(path).map_err(|source| ReportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document: MetricsDocument =
        serde_json::from_str(&content).map_err(|source| ReportError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
    log::debug!(
        "Loaded metrics from {} ({} packages, {} slow tests)",
        path.display(),
        document.metrics.coverage.by_package.len(),
        document.metrics.execution_time.slowest_tests.len()
    );
    Ok(document.metrics)
}
