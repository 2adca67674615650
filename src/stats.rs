//! Rolling summary statistics over the trend history

use crate::history::{last_n, TrendPoint};
use serde::Serialize;
use std::fmt;

/// Points included in the averaging window
pub const SUMMARY_WINDOW: usize = 7;
/// Minimum history length for a summary
pub const MIN_SUMMARY_POINTS: usize = 2;

pub const COVERAGE_TARGET: f64 = 70.0;
pub const QUALITY_TARGET: f64 = 60.0;
/// One-step drops steeper than these are flagged
pub const COVERAGE_DECLINE_LIMIT: f64 = -5.0;
pub const QUALITY_DECLINE_LIMIT: f64 = -10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    /// Number of points actually averaged (at most 7)
    pub window: usize,
    pub avg_coverage: f64,
    pub avg_quality: f64,
    /// Highest flaky count inside the window
    pub max_flaky: u64,
    /// Last minus second-to-last, not windowed
    pub coverage_trend: f64,
    pub quality_trend: f64,
    pub latest_coverage: f64,
    pub latest_quality: f64,
    pub latest_flaky: u64,
}

impl SummaryStats {
    /// Returns `None` when fewer than two points are available
    pub fn compute(trends: &[TrendPoint]) -> Option<Self> {
        if trends.len() < MIN_SUMMARY_POINTS {
            return None;
        }
        let recent = last_n(trends, SUMMARY_WINDOW);
        let n = recent.len() as f64;

        let avg_coverage = recent.iter().map(|t| t.coverage).sum::<f64>() / n;
        let avg_quality = recent.iter().map(|t| t.quality_score).sum::<f64>() / n;
        let max_flaky = recent.iter().map(|t| t.flaky_count).max().unwrap_or(0);

        let latest = &trends[trends.len() - 1];
        let previous = &trends[trends.len() - 2];

        Some(Self {
            window: recent.len(),
            avg_coverage,
            avg_quality,
            max_flaky,
            coverage_trend: latest.coverage - previous.coverage,
            quality_trend: latest.quality_score - previous.quality_score,
            latest_coverage: latest.coverage,
            latest_quality: latest.quality_score,
            latest_flaky: latest.flaky_count,
        })
    }

    /// Threshold rules, in report order
    pub fn recommendations(&self) -> Vec<Recommendation> {
        let mut recs = Vec::new();
        if self.avg_coverage < COVERAGE_TARGET {
            recs.push(Recommendation::LowCoverage);
        }
        if self.avg_quality < QUALITY_TARGET {
            recs.push(Recommendation::LowQuality);
        }
        if self.max_flaky > 0 {
            recs.push(Recommendation::FixFlakyTests(self.max_flaky));
        }
        if self.coverage_trend < COVERAGE_DECLINE_LIMIT {
            recs.push(Recommendation::CoverageDeclining);
        }
        if self.quality_trend < QUALITY_DECLINE_LIMIT {
            recs.push(Recommendation::QualityDeclining);
        }
        recs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    LowCoverage,
    LowQuality,
    FixFlakyTests(u64),
    CoverageDeclining,
    QualityDeclining,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::LowCoverage => {
                write!(f, "⚠️ Coverage is below recommended threshold (70%)")
            }
            Recommendation::LowQuality => {
                write!(f, "⚠️ Quality score is below recommended threshold (60)")
            }
            Recommendation::FixFlakyTests(n) => write!(f, "⚠️ Fix {} flaky tests", n),
            Recommendation::CoverageDeclining => write!(f, "📉 Coverage is declining rapidly"),
            Recommendation::QualityDeclining => {
                write!(f, "📉 Quality score is declining rapidly")
            }
        }
    }
}
