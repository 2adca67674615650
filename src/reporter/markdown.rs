//! Markdown summary report for the trend window

use super::GENERATED_AT_FORMAT;
use crate::stats::SummaryStats;
use chrono::NaiveDateTime;
use std::fmt::Write as _;

pub struct SummaryReporter;

impl SummaryReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report(&self, stats: &SummaryStats, generated_at: NaiveDateTime) -> String {
        let mut out = String::new();
        out.push_str("# Test Quality Summary Report\n\n");
        let _ = writeln!(out, "Generated: {}\n", generated_at.format(GENERATED_AT_FORMAT));

        out.push_str("## 7-Day Averages\n");
        let _ = writeln!(out, "- **Average Coverage**: {:.1}%", stats.avg_coverage);
        let _ = writeln!(out, "- **Average Quality Score**: {:.1}/100", stats.avg_quality);
        let _ = writeln!(out, "- **Maximum Flaky Tests**: {}\n", stats.max_flaky);

        out.push_str("## Recent Trends\n");
        let _ = writeln!(out, "- **Coverage Change**: {:+.1}%", stats.coverage_trend);
        let _ = writeln!(out, "- **Quality Score Change**: {:+.1}\n", stats.quality_trend);

        out.push_str("## Current Status\n");
        let _ = writeln!(out, "- **Latest Coverage**: {:.1}%", stats.latest_coverage);
        let _ = writeln!(out, "- **Latest Quality Score**: {:.1}/100", stats.latest_quality);
        let _ = writeln!(out, "- **Latest Flaky Tests**: {}\n", stats.latest_flaky);

        out.push_str("## Recommendations\n");
        for rec in stats.recommendations() {
            let _ = writeln!(out, "- {}", rec);
        }
        out
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::TrendPoint;
    use chrono::NaiveDate;

    fn clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 8)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap()
    }

    fn point(coverage: f64, quality: f64, flaky: u64) -> TrendPoint {
        TrendPoint {
            timestamp: "2025-01-01T00:00:00Z".into(),
            coverage,
            quality_score: quality,
            test_count: 0,
            flaky_count: flaky,
        }
    }

    #[test]
    fn test_signed_deltas() {
        let stats = SummaryStats::compute(&[point(80.0, 60.0, 0), point(70.0, 62.5, 0)]).unwrap();
        let md = SummaryReporter::new().report(&stats, clock());
        assert!(md.contains("- **Coverage Change**: -10.0%"));
        assert!(md.contains("- **Quality Score Change**: +2.5"));
    }

    #[test]
    fn test_sections_and_values() {
        let stats = SummaryStats::compute(&[point(90.0, 90.0, 2), point(80.0, 70.0, 0)]).unwrap();
        let md = SummaryReporter::new().report(&stats, clock());
        assert!(md.starts_with("# Test Quality Summary Report\n\nGenerated: 2025-01-08 06:00:00\n"));
        assert!(md.contains("- **Average Coverage**: 85.0%"));
        assert!(md.contains("- **Average Quality Score**: 80.0/100"));
        assert!(md.contains("- **Maximum Flaky Tests**: 2"));
        assert!(md.contains("- **Latest Coverage**: 80.0%"));
        assert!(md.contains("- **Latest Quality Score**: 70.0/100"));
        assert!(md.contains("- **Latest Flaky Tests**: 0"));
        assert!(md.contains("## Recommendations\n- ⚠️ Fix 2 flaky tests\n"));
        assert!(md.contains("- 📉 Coverage is declining rapidly"));
        assert!(md.contains("- 📉 Quality score is declining rapidly"));
    }

    #[test]
    fn test_no_recommendations_section_is_empty() {
        let stats = SummaryStats::compute(&[point(90.0, 90.0, 0), point(91.0, 90.0, 0)]).unwrap();
        let md = SummaryReporter::new().report(&stats, clock());
        assert!(md.ends_with("## Recommendations\n"));
    }

    #[test]
    fn test_zero_delta_has_plus_sign() {
        let stats = SummaryStats::compute(&[point(90.0, 90.0, 0), point(90.0, 90.0, 0)]).unwrap();
        let md = SummaryReporter::new().report(&stats, clock());
        assert!(md.contains("- **Coverage Change**: +0.0%"));
    }
}
