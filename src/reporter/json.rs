//! JSON reporter for machine-readable summary output

use crate::stats::SummaryStats;
use serde::Serialize;

/// Reporter for JSON output
pub struct JsonReporter {
    /// Whether to pretty-print JSON
    pretty: bool,
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    #[serde(flatten)]
    stats: &'a SummaryStats,
    recommendations: Vec<String>,
}

impl JsonReporter {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Summary statistics plus rendered recommendation lines
    pub fn report(&self, stats: &SummaryStats) -> String {
        let output = JsonSummary {
            stats,
            recommendations: stats.recommendations().iter().map(|r| r.to_string()).collect(),
        };
        if self.pretty {
            serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string(&output).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::TrendPoint;

    fn point(coverage: f64, flaky: u64) -> TrendPoint {
        TrendPoint {
            timestamp: "2025-01-01T00:00:00Z".into(),
            coverage,
            quality_score: 75.0,
            test_count: 12,
            flaky_count: flaky,
        }
    }

    #[test]
    fn test_json_contains_stats_and_recommendations() {
        let stats = SummaryStats::compute(&[point(65.0, 1), point(66.0, 0)]).unwrap();
        let out = JsonReporter::new().report(&stats);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["window"], 2);
        assert_eq!(parsed["max_flaky"], 1);
        assert_eq!(parsed["avg_coverage"], 65.5);
        let recs = parsed["recommendations"].as_array().unwrap();
        assert_eq!(recs.len(), 2);
        assert!(recs[1].as_str().unwrap().contains("Fix 1 flaky tests"));
    }

    #[test]
    fn test_pretty_is_multiline() {
        let stats = SummaryStats::compute(&[point(90.0, 0), point(90.0, 0)]).unwrap();
        assert!(JsonReporter::new().pretty().report(&stats).contains('\n'));
        assert!(!JsonReporter::new().report(&stats).contains('\n'));
    }
}
