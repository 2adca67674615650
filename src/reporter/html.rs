//! HTML reporter: renders the static test quality dashboard
//!
//! Produces one self-contained document with inline styling. The two trend
//! charts are drawn client-side by Chart.js from JSON arrays embedded in the
//! page. Every package and test name is escaped before it reaches markup.

use super::{escape_html, GENERATED_AT_FORMAT};
use crate::history::{last_n, TrendPoint, DASHBOARD_TREND_POINTS};
use crate::metrics::{Flakiness, MetricsSnapshot, PackageCoverage, SlowTest, TestTypeCounts};
use crate::{duration_level, FlakyLevel, ScoreLevel, DEFAULT_PACKAGE_PREFIX};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt::Write as _;

/// Maximum rows in the package, flaky and slow test tables
pub const MAX_TABLE_ROWS: usize = 10;

const CHART_JS_URL: &str = "https://cdn.jsdelivr.net/npm/chart.js";
const ERROR_GLYPH: &str = " ⚠️";

/// Escapes serialized JSON for embedding inside a <script> block
fn escape_json_for_script(s: &str) -> String {
    // serde_json already escapes quotes/backslashes; we just need to ensure
    // no </script> can appear inside the block.
    s.replace("</", "<\\/")
}

/// Remove every occurrence of the repository prefix from a package path
pub fn strip_package_prefix<'a>(package: &'a str, prefix: &str) -> std::borrow::Cow<'a, str> {
    if prefix.is_empty() || !package.contains(prefix) {
        std::borrow::Cow::Borrowed(package)
    } else {
        std::borrow::Cow::Owned(package.replace(prefix, ""))
    }
}

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    /// Page title and heading
    pub title: String,
    /// Prefix stripped from package paths
    pub package_prefix: String,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            title: "Qualhook Test Quality Dashboard".to_string(),
            package_prefix: DEFAULT_PACKAGE_PREFIX.to_string(),
        }
    }
}

/// Chart series for the last ten trend points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub labels: Vec<String>,
    pub coverage: Vec<f64>,
    pub quality: Vec<f64>,
}

impl TrendSeries {
    pub fn from_trends(trends: &[TrendPoint]) -> Self {
        let recent = last_n(trends, DASHBOARD_TREND_POINTS);
        Self {
            labels: recent.iter().map(|t| t.date_label().to_string()).collect(),
            coverage: recent.iter().map(|t| t.coverage).collect(),
            quality: recent.iter().map(|t| t.quality_score).collect(),
        }
    }
}

/// Packages sorted by coverage, highest first, capped at ten rows
pub fn top_packages(packages: &[PackageCoverage]) -> Vec<&PackageCoverage> {
    let mut sorted: Vec<&PackageCoverage> = packages.iter().collect();
    sorted.sort_by(|a, b| b.coverage.total_cmp(&a.coverage));
    sorted.truncate(MAX_TABLE_ROWS);
    sorted
}

/// Reporter that generates the static HTML dashboard
pub struct DashboardReporter {
    options: DashboardOptions,
}

impl DashboardReporter {
    pub fn new(options: DashboardOptions) -> Self {
        Self { options }
    }

    /// Render the full dashboard. `generated_at` is stamped into the footer.
    pub fn report(
        &self,
        snapshot: &MetricsSnapshot,
        trends: &[TrendPoint],
        generated_at: NaiveDateTime,
    ) -> String {
        let quality = snapshot.quality_score.overall;
        let coverage = snapshot.coverage.average;
        let test_count = snapshot.test_types.total_test_files;
        let flaky_count = snapshot.flakiness.flaky_test_count;
        let title = escape_html(&self.options.title);

        let mut html = String::with_capacity(16_384);
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("    <meta charset=\"UTF-8\">\n");
        html.push_str(
            "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        let _ = writeln!(html, "    <title>{}</title>", title);
        let _ = writeln!(html, "    <script src=\"{}\"></script>", CHART_JS_URL);
        html.push_str("    <style>\n");
        html.push_str(Self::template_css());
        let _ = writeln!(
            html,
            "        .quality-score {{ color: {}; }}",
            ScoreLevel::from_score(quality).color()
        );
        let _ = writeln!(
            html,
            "        .coverage {{ color: {}; }}",
            ScoreLevel::from_score(coverage).color()
        );
        html.push_str("    </style>\n</head>\n<body>\n    <div class=\"container\">\n");
        let _ = writeln!(html, "        <h1>{}</h1>", title);

        // Headline tiles
        html.push_str("        <div class=\"metrics-grid\">\n");
        Self::push_tile(&mut html, "Quality Score", "quality-score", &format!("{:.1}/100", quality));
        Self::push_tile(&mut html, "Test Coverage", "coverage", &format!("{:.1}%", coverage));
        Self::push_tile(&mut html, "Total Tests", "", &test_count.to_string());
        Self::push_tile(
            &mut html,
            "Flaky Tests",
            FlakyLevel::from_count(flaky_count).css_class(),
            &flaky_count.to_string(),
        );
        html.push_str("        </div>\n");

        html.push_str(Self::template_charts());
        html.push_str(&self.package_section(&snapshot.coverage.by_package));
        html.push_str(&Self::test_type_section(&snapshot.test_types));
        html.push_str(&self.flaky_section(&snapshot.flakiness));
        html.push_str(&self.slow_tests_section(&snapshot.execution_time.slowest_tests));

        let _ = writeln!(
            html,
            "        <div class=\"timestamp\">\n            Generated at: {}\n        </div>",
            generated_at.format(GENERATED_AT_FORMAT)
        );
        html.push_str("    </div>\n");
        html.push_str(&Self::chart_script(&TrendSeries::from_trends(trends)));
        html.push_str("</body>\n</html>\n");
        html
    }

    fn push_tile(html: &mut String, label: &str, class: &str, value: &str) {
        let class = if class.is_empty() {
            "metric-value".to_string()
        } else {
            format!("metric-value {}", class)
        };
        let _ = write!(
            html,
            "            <div class=\"metric-card\">\n                <div class=\"metric-label\">{}</div>\n                <div class=\"{}\">{}</div>\n            </div>\n",
            label, class, value
        );
    }

    fn strip<'a>(&self, package: &'a str) -> std::borrow::Cow<'a, str> {
        strip_package_prefix(package, &self.options.package_prefix)
    }

    fn package_section(&self, packages: &[PackageCoverage]) -> String {
        let mut rows = String::new();
        for pkg in top_packages(packages) {
            let glyph = if pkg.error { ERROR_GLYPH } else { "" };
            let _ = write!(
                rows,
                "                    <tr>\n                        <td>{}</td>\n                        <td style=\"color: {}\">{:.1}%{}</td>\n                        <td>{}</td>\n                    </tr>\n",
                escape_html(&self.strip(&pkg.package)),
                ScoreLevel::from_score(pkg.coverage).color(),
                pkg.coverage,
                glyph,
                pkg.test_files
            );
        }
        Self::details_table("Package Coverage", &["Package", "Coverage", "Test Files"], &rows)
    }

    fn test_type_section(counts: &TestTypeCounts) -> String {
        let mut rows = String::new();
        for (name, count) in counts.rows() {
            let _ = write!(
                rows,
                "                    <tr>\n                        <td>{}</td>\n                        <td>{}</td>\n                    </tr>\n",
                name, count
            );
        }
        Self::details_table("Test Type Distribution", &["Test Type", "Count"], &rows)
    }

    /// Empty when no test is flaky
    fn flaky_section(&self, flakiness: &Flakiness) -> String {
        if flakiness.flaky_test_count == 0 {
            return String::new();
        }
        let mut rows = String::new();
        for test in flakiness.flaky_tests.iter().take(MAX_TABLE_ROWS) {
            let _ = write!(
                rows,
                "                    <tr>\n                        <td>{}</td>\n                        <td>{}</td>\n                    </tr>\n",
                escape_html(&test.test),
                escape_html(&self.strip(&test.package))
            );
        }
        Self::details_table("Flaky Tests", &["Test", "Package"], &rows)
    }

    /// Empty when there are no timings
    fn slow_tests_section(&self, slowest: &[SlowTest]) -> String {
        if slowest.is_empty() {
            return String::new();
        }
        let mut rows = String::new();
        for test in slowest.iter().take(MAX_TABLE_ROWS) {
            let _ = write!(
                rows,
                "                    <tr>\n                        <td>{}</td>\n                        <td>{}</td>\n                        <td style=\"color: {}\">{:.3}s</td>\n                    </tr>\n",
                escape_html(&test.name),
                escape_html(&self.strip(&test.package)),
                duration_level(test.duration).color(),
                test.duration
            );
        }
        Self::details_table("Slowest Tests", &["Test", "Package", "Duration"], &rows)
    }

    fn details_table(heading: &str, columns: &[&str], rows: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "        <div class=\"details\">\n            <h3>{}</h3>\n            <table>\n                <thead>\n                    <tr>",
            heading
        );
        for col in columns {
            let _ = writeln!(out, "                        <th>{}</th>", col);
        }
        out.push_str("                    </tr>\n                </thead>\n                <tbody>\n");
        out.push_str(rows);
        out.push_str("                </tbody>\n            </table>\n        </div>\n");
        out
    }

    fn chart_script(series: &TrendSeries) -> String {
        let labels = serde_json::to_string(&series.labels).unwrap_or_else(|_| "[]".to_string());
        let coverage = serde_json::to_string(&series.coverage).unwrap_or_else(|_| "[]".to_string());
        let quality = serde_json::to_string(&series.quality).unwrap_or_else(|_| "[]".to_string());

        let mut out = String::from("    <script>\n");
        out.push_str(&Self::line_chart(
            "coverageTrend",
            "Coverage %",
            &labels,
            &coverage,
            "75, 192, 192",
        ));
        out.push_str(&Self::line_chart(
            "qualityTrend",
            "Quality Score",
            &labels,
            &quality,
            "54, 162, 235",
        ));
        out.push_str("    </script>\n");
        out
    }

    fn line_chart(canvas_id: &str, label: &str, labels: &str, data: &str, rgb: &str) -> String {
        format!(
            r#"        new Chart(document.getElementById('{id}').getContext('2d'), {{
            type: 'line',
            data: {{
                labels: {labels},
                datasets: [{{
                    label: '{label}',
                    data: {data},
                    borderColor: 'rgb({rgb})',
                    backgroundColor: 'rgba({rgb}, 0.2)',
                    tension: 0.1
                }}]
            }},
            options: {{
                responsive: true,
                scales: {{
                    y: {{
                        beginAtZero: true,
                        max: 100
                    }}
                }}
            }}
        }});
"#,
            id = canvas_id,
            labels = escape_json_for_script(labels),
            label = label,
            data = escape_json_for_script(data),
            rgb = rgb,
        )
    }

    // ─── HTML template pieces ────────────────────────────────────────────

    fn template_css() -> &'static str {
        r##"        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background-color: #f5f5f5; }
        .container { max-width: 1200px; margin: 0 auto; }
        h1 { color: #333; text-align: center; margin-bottom: 30px; }
        .metrics-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(250px, 1fr)); gap: 20px; margin-bottom: 40px; }
        .metric-card { background: white; border-radius: 8px; padding: 20px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        .metric-value { font-size: 36px; font-weight: bold; margin: 10px 0; }
        .metric-label { color: #666; font-size: 14px; }
        .charts-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(400px, 1fr)); gap: 20px; margin-bottom: 40px; }
        .chart-container { background: white; border-radius: 8px; padding: 20px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        .details { background: white; border-radius: 8px; padding: 20px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); margin-bottom: 20px; }
        table { width: 100%; border-collapse: collapse; }
        th, td { text-align: left; padding: 12px; border-bottom: 1px solid #eee; }
        th { background-color: #f8f9fa; font-weight: 600; }
        .timestamp { text-align: center; color: #666; font-size: 14px; margin-top: 40px; }
        .warning { color: #ff9800; }
        .error { color: #f44336; }
        .success { color: #4caf50; }
"##
    }

    fn template_charts() -> &'static str {
        r##"        <div class="charts-grid">
            <div class="chart-container">
                <h3>Coverage Trend</h3>
                <canvas id="coverageTrend"></canvas>
            </div>
            <div class="chart-container">
                <h3>Quality Score Trend</h3>
                <canvas id="qualityTrend"></canvas>
            </div>
        </div>
"##
    }
}

impl Default for DashboardReporter {
    fn default() -> Self {
        Self::new(DashboardOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::FlakyTest;
    use chrono::NaiveDate;

    fn fixed_clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 26, 53)
            .unwrap()
    }

    fn pkg(name: &str, coverage: f64) -> PackageCoverage {
        PackageCoverage {
            package: format!("{}{}", DEFAULT_PACKAGE_PREFIX, name),
            coverage,
            test_files: 2,
            error: false,
        }
    }

    fn trend(day: u32, coverage: f64, quality: f64) -> TrendPoint {
        TrendPoint {
            timestamp: format!("2025-01-{:02}T12:00:00Z", day),
            coverage,
            quality_score: quality,
            test_count: 40,
            flaky_count: 0,
        }
    }

    fn snapshot() -> MetricsSnapshot {
        let mut m = MetricsSnapshot::default();
        m.coverage.average = 72.345;
        m.quality_score.overall = 81.25;
        m.test_types.total_test_files = 42;
        m.coverage.by_package = vec![pkg("internal/a", 10.0), pkg("internal/b", 90.0), pkg("internal/c", 50.0)];
        m
    }

    fn render(m: &MetricsSnapshot, trends: &[TrendPoint]) -> String {
        DashboardReporter::default().report(m, trends, fixed_clock())
    }

    #[test]
    fn test_headline_values_one_decimal() {
        let html = render(&snapshot(), &[]);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(">81.2/100<"));
        assert!(html.contains("72.3%"));
        assert!(html.contains(">42</div>"));
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn test_headline_colors() {
        let html = render(&snapshot(), &[]);
        assert!(html.contains(".quality-score { color: #4caf50; }"));
        assert!(html.contains(".coverage { color: #ff9800; }"));
    }

    #[test]
    fn test_packages_sorted_descending() {
        let html = render(&snapshot(), &[]);
        let b = html.find("<td>internal/b</td>").unwrap();
        let c = html.find("<td>internal/c</td>").unwrap();
        let a = html.find("<td>internal/a</td>").unwrap();
        assert!(b < c && c < a);
        assert!(!html.contains(DEFAULT_PACKAGE_PREFIX));
    }

    #[test]
    fn test_top_packages_capped_at_ten() {
        let packages: Vec<PackageCoverage> =
            (0..15).map(|i| pkg(&format!("p{}", i), i as f64 * 5.0)).collect();
        let top = top_packages(&packages);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].coverage, 70.0);
        assert_eq!(top[9].coverage, 25.0);
    }

    #[test]
    fn test_error_package_gets_glyph() {
        let mut m = snapshot();
        m.coverage.by_package = vec![PackageCoverage {
            package: "broken".into(),
            coverage: 0.0,
            test_files: 0,
            error: true,
        }];
        let html = render(&m, &[]);
        assert!(html.contains("0.0% ⚠️</td>"));
    }

    #[test]
    fn test_flaky_section_absent_when_zero() {
        let html = render(&snapshot(), &[]);
        assert!(!html.contains("Flaky Tests</h3>"));
        assert!(html.contains("metric-value success"));
    }

    #[test]
    fn test_flaky_section_present_and_capped() {
        let mut m = snapshot();
        m.flakiness.flaky_test_count = 12;
        m.flakiness.flaky_tests = (0..12)
            .map(|i| FlakyTest {
                test: format!("TestFlaky{}", i),
                package: format!("{}pkg/x", DEFAULT_PACKAGE_PREFIX),
            })
            .collect();
        let html = render(&m, &[]);
        assert!(html.contains("<h3>Flaky Tests</h3>"));
        assert!(html.contains("TestFlaky9"));
        assert!(!html.contains("TestFlaky10"));
        assert!(html.contains("<td>pkg/x</td>"));
        assert!(html.contains("metric-value error"));
    }

    #[test]
    fn test_slow_tests_section() {
        let mut m = snapshot();
        assert!(!render(&m, &[]).contains("Slowest Tests"));

        m.execution_time.slowest_tests = vec![
            SlowTest { name: "TestSlow".into(), package: "a".into(), duration: 1.23456 },
            SlowTest { name: "TestMedium".into(), package: "a".into(), duration: 0.75 },
            SlowTest { name: "TestFast".into(), package: "a".into(), duration: 0.1 },
        ];
        let html = render(&m, &[]);
        assert!(html.contains("<h3>Slowest Tests</h3>"));
        assert!(html.contains("<td style=\"color: #f44336\">1.235s</td>"));
        assert!(html.contains("<td style=\"color: #ff9800\">0.750s</td>"));
        assert!(html.contains("<td style=\"color: #4caf50\">0.100s</td>"));
    }

    #[test]
    fn test_user_strings_escaped() {
        let mut m = snapshot();
        m.flakiness.flaky_test_count = 1;
        m.flakiness.flaky_tests = vec![FlakyTest {
            test: "<script>alert(1)</script>".into(),
            package: "a&b".into(),
        }];
        let html = render(&m, &[]);
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("<td>a&amp;b</td>"));
        assert!(!html.contains("<script>alert"));
    }

    #[test]
    fn test_trend_series_last_ten_in_order() {
        let trends: Vec<TrendPoint> = (1..=12).map(|d| trend(d, d as f64, 50.0)).collect();
        let series = TrendSeries::from_trends(&trends);
        assert_eq!(series.labels.len(), 10);
        assert_eq!(series.labels[0], "2025-01-03");
        assert_eq!(series.labels[9], "2025-01-12");
        assert_eq!(series.coverage[0], 3.0);
    }

    #[test]
    fn test_chart_data_embedded() {
        let trends = vec![trend(1, 70.5, 61.0), trend(2, 72.0, 64.5)];
        let html = render(&snapshot(), &trends);
        assert!(html.contains(r#"labels: ["2025-01-01","2025-01-02"]"#));
        assert!(html.contains("data: [70.5,72.0]"));
        assert!(html.contains("data: [61.0,64.5]"));
        assert!(html.contains("max: 100"));
    }

    #[test]
    fn test_script_close_tag_neutralized() {
        assert_eq!(escape_json_for_script(r#"["</script>"]"#), r#"["<\/script>"]"#);
    }

    #[test]
    fn test_footer_uses_injected_clock() {
        let html = render(&snapshot(), &[]);
        assert!(html.contains("Generated at: 2025-03-14 09:26:53"));
        assert_eq!(html, render(&snapshot(), &[]));
    }

    #[test]
    fn test_strip_package_prefix() {
        assert_eq!(strip_package_prefix("github.com/bebsworthy/qualhook/cmd", DEFAULT_PACKAGE_PREFIX), "cmd");
        assert_eq!(strip_package_prefix("example.com/other", DEFAULT_PACKAGE_PREFIX), "example.com/other");
        assert_eq!(strip_package_prefix("anything", ""), "anything");
    }
}
