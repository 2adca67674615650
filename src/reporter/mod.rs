//! Reporter module for output formatting

pub mod chart;
pub mod html;
pub mod json;
pub mod markdown;

pub use chart::{is_charting_available, ChartOptions, TrendChart};
pub use html::{DashboardOptions, DashboardReporter};
pub use json::JsonReporter;
pub use markdown::SummaryReporter;

/// Timestamp format stamped into generated reports
pub const GENERATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Escape text for HTML/SVG element content and attribute values
pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
