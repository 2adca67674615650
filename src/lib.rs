//! Qualhook Report: test quality dashboards and trend summaries
//!
//! Turns pre-computed test-quality metrics (coverage, quality score,
//! flakiness, execution time) into a static HTML dashboard, a four-panel
//! PNG trend chart and a markdown summary.
//!
//! PNG rasterization sits behind the default `charts` feature. Without it
//! the `trends` command writes the markdown summary only, so both builds
//! need testing:
//! ```text
//! cargo test
//! cargo test --no-default-features
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod metrics;
pub mod pipeline;
pub mod reporter;
pub mod stats;

pub use error::ReportError;
pub use history::TrendPoint;
pub use metrics::MetricsSnapshot;
pub use stats::{Recommendation, SummaryStats};

/// Repository prefix stripped from package paths for display
pub const DEFAULT_PACKAGE_PREFIX: &str = "github.com/bebsworthy/qualhook/";

/// Traffic-light level for a 0-100 score or percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreLevel {
    Good,
    Warning,
    Bad,
}

impl ScoreLevel {
    /// >= 80 good, 60..80 warning, < 60 bad
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ScoreLevel::Good
        } else if score >= 60.0 {
            ScoreLevel::Warning
        } else {
            ScoreLevel::Bad
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ScoreLevel::Good => "#4caf50",
            ScoreLevel::Warning => "#ff9800",
            ScoreLevel::Bad => "#f44336",
        }
    }
}

/// Severity class for the flaky-test count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlakyLevel {
    Success,
    Warning,
    Error,
}

impl FlakyLevel {
    pub fn from_count(count: u64) -> Self {
        match count {
            0 => FlakyLevel::Success,
            1..=2 => FlakyLevel::Warning,
            _ => FlakyLevel::Error,
        }
    }

    /// CSS class name used by the dashboard
    pub fn css_class(self) -> &'static str {
        match self {
            FlakyLevel::Success => "success",
            FlakyLevel::Warning => "warning",
            FlakyLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for FlakyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.css_class())
    }
}

/// Level for a single test duration in seconds: > 1.0 bad, > 0.5 warning
pub fn duration_level(seconds: f64) -> ScoreLevel {
    if seconds > 1.0 {
        ScoreLevel::Bad
    } else if seconds > 0.5 {
        ScoreLevel::Warning
    } else {
        ScoreLevel::Good
    }
}
