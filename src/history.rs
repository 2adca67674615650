//! Trend history - chronologically ordered metric samples (oldest first)

use crate::error::ReportError;
use crate::metrics::deserialize_count;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Number of trailing points plotted on the dashboard
pub const DASHBOARD_TREND_POINTS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    /// ISO-8601 timestamp; `Z` means UTC
    pub timestamp: String,
    #[serde(default)]
    pub coverage: f64,
    #[serde(default)]
    pub quality_score: f64,
    /// Any JSON number; stored rounded
    #[serde(default, deserialize_with = "deserialize_count")]
    pub test_count: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub flaky_count: u64,
}

impl TrendPoint {
    /// Date portion of the timestamp (first 10 characters)
    pub fn date_label(&self) -> &str {
        match self.timestamp.char_indices().nth(10) {
            Some((idx, _)) => &self.timestamp[..idx],
            None => &self.timestamp,
        }
    }

    pub fn parsed_timestamp(&self) -> Result<DateTime<Utc>, ReportError> {
        parse_timestamp(&self.timestamp)
    }
}

/// Parse an ISO-8601 timestamp. Offsets are honored, naive values are UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ReportError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(ReportError::InvalidTimestamp(raw.to_string()))
}

/// Load trend history from a JSON array file
pub fn load_trends(path: &Path) -> Result<Vec<TrendPoint>, ReportError> {
    let content = fs::read_to_string(path).map_err(|source| ReportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let trends: Vec<TrendPoint> =
        serde_json::from_str(&content).map_err(|source| ReportError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
    log::debug!("Loaded {} trend points from {}", trends.len(), path.display());
    Ok(trends)
}

/// The trailing `n` points, in original order
pub fn last_n(trends: &[TrendPoint], n: usize) -> &[TrendPoint] {
    &trends[trends.len().saturating_sub(n)..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn point(ts: &str) -> TrendPoint {
        TrendPoint {
            timestamp: ts.to_string(),
            coverage: 0.0,
            quality_score: 0.0,
            test_count: 0,
            flaky_count: 0,
        }
    }

    // --- date_label ---

    #[test]
    fn date_label_takes_first_ten_chars() {
        assert_eq!(point("2025-03-14T09:26:53Z").date_label(), "2025-03-14");
    }

    #[test]
    fn date_label_short_timestamp_unchanged() {
        assert_eq!(point("2025-03").date_label(), "2025-03");
    }

    // --- parse_timestamp ---

    #[test]
    fn parse_z_suffix_as_utc() {
        let dt = parse_timestamp("2025-01-02T03:04:05Z").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2025, 1, 2));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (3, 4, 5));
    }

    #[test]
    fn parse_explicit_offset_converted_to_utc() {
        let dt = parse_timestamp("2025-01-02T03:00:00+02:00").unwrap();
        assert_eq!(dt.hour(), 1);
    }

    #[test]
    fn parse_naive_with_fraction() {
        let dt = parse_timestamp("2025-01-02T03:04:05.123456").unwrap();
        assert_eq!(dt.second(), 5);
    }

    #[test]
    fn parse_bare_date() {
        let dt = parse_timestamp("2025-06-30").unwrap();
        assert_eq!((dt.month(), dt.day(), dt.hour()), (6, 30, 0));
    }

    #[test]
    fn parse_garbage_fails() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(ReportError::InvalidTimestamp(_))
        ));
    }

    // --- defaults and loading ---

    #[test]
    fn missing_numeric_fields_default_to_zero() {
        let trends: Vec<TrendPoint> =
            serde_json::from_str(r#"[{"timestamp": "2025-01-01T00:00:00Z"}]"#).unwrap();
        assert_eq!(trends[0].coverage, 0.0);
        assert_eq!(trends[0].quality_score, 0.0);
        assert_eq!(trends[0].test_count, 0);
        assert_eq!(trends[0].flaky_count, 0);
    }

    #[test]
    fn load_trends_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trends.json");
        std::fs::write(
            &path,
            r#"[{"timestamp": "2025-01-01T00:00:00Z", "coverage": 71.5, "flaky_count": 2}]"#,
        )
        .unwrap();
        let trends = load_trends(&path).unwrap();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].coverage, 71.5);
        assert_eq!(trends[0].flaky_count, 2);
    }

    #[test]
    fn load_trends_accepts_float_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trends.json");
        std::fs::write(
            &path,
            r#"[
                {"timestamp": "2025-01-01T00:00:00Z", "test_count": 24.0, "flaky_count": 2.0},
                {"timestamp": "2025-01-02T00:00:00Z", "test_count": 25, "flaky_count": 0.6}
            ]"#,
        )
        .unwrap();
        let trends = load_trends(&path).unwrap();
        assert_eq!(trends[0].test_count, 24);
        assert_eq!(trends[0].flaky_count, 2);
        assert_eq!(trends[1].test_count, 25);
        assert_eq!(trends[1].flaky_count, 1);
    }

    #[test]
    fn negative_count_is_rejected() {
        let result = serde_json::from_str::<Vec<TrendPoint>>(
            r#"[{"timestamp": "2025-01-01T00:00:00Z", "test_count": -3}]"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn load_trends_rejects_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trends.json");
        std::fs::write(&path, r#"{"runs": []}"#).unwrap();
        assert!(matches!(load_trends(&path), Err(ReportError::Decode { .. })));
    }

    // --- last_n ---

    #[test]
    fn last_n_keeps_order_and_bound() {
        let trends: Vec<TrendPoint> = (1..=12)
            .map(|d| point(&format!("2025-01-{:02}T00:00:00Z", d)))
            .collect();
        let tail = last_n(&trends, DASHBOARD_TREND_POINTS);
        assert_eq!(tail.len(), 10);
        assert_eq!(tail[0].date_label(), "2025-01-03");
        assert_eq!(tail[9].date_label(), "2025-01-12");
    }

    #[test]
    fn last_n_shorter_history() {
        let trends = vec![point("2025-01-01"), point("2025-01-02")];
        assert_eq!(last_n(&trends, 7).len(), 2);
        assert!(last_n(&[], 7).is_empty());
    }
}
