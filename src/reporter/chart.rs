//! Four-panel trend chart
//!
//! The figure is laid out as an SVG document (2x2 grid: coverage, quality,
//! test files, flaky tests) and rasterized to PNG with resvg. The SVG side
//! is always available; rasterization requires the `charts` feature:
//! ```toml
//! qualhook-report = { version = "1", features = ["charts"] }
//! ```

use super::escape_html;
use crate::error::ReportError;
use crate::history::TrendPoint;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use std::fmt::Write as _;

const SECONDS_PER_DAY: f64 = 86_400.0;
/// Bar width as a fraction of one day
const BAR_WIDTH_DAYS: f64 = 0.8;

const FONT_FAMILY: &str = "DejaVu Sans, Arial, Helvetica, sans-serif";
const PLOT_BACKGROUND: &str = "#eaeaf2";
const REFERENCE_COLOR: &str = "#ff0000";

#[derive(Debug, Clone)]
pub struct ChartOptions {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    pub title: String,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 1000,
            title: "Qualhook Test Quality Trends".to_string(),
        }
    }
}

/// Check if PNG rendering was compiled in
pub fn is_charting_available() -> bool {
    cfg!(feature = "charts")
}

#[derive(Debug, Clone, Copy)]
struct Rect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl Rect {
    fn bottom(&self) -> f64 {
        self.y + self.h
    }

    fn right(&self) -> f64 {
        self.x + self.w
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Marker {
    Circle,
    Square,
}

enum Series {
    Line { values: Vec<f64>, color: &'static str, marker: Marker },
    Bars { values: Vec<f64>, color: &'static str },
}

struct Reference {
    value: f64,
    label: &'static str,
}

struct PanelSpec {
    title: &'static str,
    y_label: &'static str,
    series: Series,
    y_max: f64,
    fixed_percent_axis: bool,
    reference: Option<Reference>,
    score_bands: bool,
}

/// Shared x-axis: timestamps in seconds since epoch with day ticks
#[derive(Debug, Clone)]
struct TimeAxis {
    start: f64,
    end: f64,
    ticks: Vec<DateTime<Utc>>,
}

impl TimeAxis {
    fn from_times(times: &[DateTime<Utc>]) -> Self {
        // empty input gets a fixed one-day axis at the epoch
        let min = times.iter().min().copied().unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let max = times.iter().max().copied().unwrap_or(min);
        let lo = min.timestamp() as f64;
        let hi = max.timestamp() as f64;
        let pad = ((hi - lo) * 0.05).max(SECONDS_PER_DAY / 2.0);
        let start = lo - pad;
        let end = hi + pad;

        // One tick at every UTC midnight inside the visible range
        let mut ticks = Vec::new();
        let mut day = (min - Duration::days(1)).date_naive();
        let last = (max + Duration::days(1)).date_naive();
        while day <= last {
            let midnight = day.and_time(NaiveTime::MIN).and_utc();
            let secs = midnight.timestamp() as f64;
            if secs >= start && secs <= end {
                ticks.push(midnight);
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        Self { start, end, ticks }
    }

    fn px(&self, rect: &Rect, t: f64) -> f64 {
        rect.x + (t - self.start) / (self.end - self.start) * rect.w
    }
}

/// Round a raw step up to 1, 2 or 5 times a power of ten
fn nice_step(raw: f64) -> f64 {
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let exp = 10f64.powf(raw.log10().floor());
    let f = raw / exp;
    let nf = if f <= 1.0 {
        1.0
    } else if f <= 2.0 {
        2.0
    } else if f <= 5.0 {
        5.0
    } else {
        10.0
    };
    nf * exp
}

/// Axis maximum and tick step for a count series (integer ticks)
fn count_axis(max_value: f64) -> (f64, f64) {
    let top = if max_value <= 0.0 { 1.0 } else { max_value * 1.05 };
    let step = nice_step(top / 5.0).max(1.0);
    ((top / step).ceil() * step, step)
}

/// Renders the four-panel trend figure
pub struct TrendChart {
    options: ChartOptions,
}

impl TrendChart {
    pub fn new(options: ChartOptions) -> Self {
        Self { options }
    }

    /// Build the SVG document. Fails on unparsable timestamps.
    pub fn render_svg(&self, trends: &[TrendPoint]) -> Result<String, ReportError> {
        let times = trends
            .iter()
            .map(TrendPoint::parsed_timestamp)
            .collect::<Result<Vec<_>, _>>()?;
        let axis = TimeAxis::from_times(&times);
        let secs: Vec<f64> = times.iter().map(|t| t.timestamp() as f64).collect();

        let width = self.options.width as f64;
        let height = self.options.height as f64;
        let mut svg = String::with_capacity(32_768);
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{font}">"#,
            w = self.options.width,
            h = self.options.height,
            font = FONT_FAMILY
        );
        let _ = writeln!(svg, r#"<rect width="{}" height="{}" fill="white"/>"#, width, height);
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="36" font-size="24" font-weight="bold" text-anchor="middle">{}</text>"#,
            width / 2.0,
            escape_html(&self.options.title)
        );

        let panels = Self::panel_specs(trends);
        let title_h = 60.0;
        let cell_w = width / 2.0;
        let cell_h = (height - title_h) / 2.0;
        for (i, spec) in panels.iter().enumerate() {
            let col = (i % 2) as f64;
            let row = (i / 2) as f64;
            let plot = Rect {
                x: col * cell_w + 80.0,
                y: title_h + row * cell_h + 45.0,
                w: cell_w - 80.0 - 30.0,
                h: cell_h - 45.0 - 75.0,
            };
            Self::draw_panel(&mut svg, plot, spec, &axis, &secs);
        }

        svg.push_str("</svg>\n");
        Ok(svg)
    }

    #[cfg(feature = "charts")]
    pub fn render_png(&self, trends: &[TrendPoint]) -> Result<Vec<u8>, ReportError> {
        use resvg::{tiny_skia, usvg};

        let svg = self.render_svg(trends)?;
        let mut opt = usvg::Options::default();
        opt.fontdb_mut().load_system_fonts();
        let tree = usvg::Tree::from_str(&svg, &opt)
            .map_err(|e| ReportError::ChartRender(e.to_string()))?;

        let size = tree.size().to_int_size();
        let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
            ReportError::ChartRender(format!(
                "cannot allocate {}x{} image",
                size.width(),
                size.height()
            ))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
        let png = pixmap
            .encode_png()
            .map_err(|e| ReportError::ChartRender(e.to_string()))?;
        log::debug!("Rasterized trend chart: {}x{}, {} bytes", size.width(), size.height(), png.len());
        Ok(png)
    }

    /// Stub implementation when charts feature is disabled
    #[cfg(not(feature = "charts"))]
    pub fn render_png(&self, _trends: &[TrendPoint]) -> Result<Vec<u8>, ReportError> {
        Err(ReportError::ChartsUnavailable)
    }

    fn panel_specs(trends: &[TrendPoint]) -> [PanelSpec; 4] {
        let test_counts: Vec<f64> = trends.iter().map(|t| t.test_count as f64).collect();
        let flaky_counts: Vec<f64> = trends.iter().map(|t| t.flaky_count as f64).collect();
        let max_tests = test_counts.iter().copied().fold(0.0, f64::max);
        // reference line at 5 stays inside the axis
        let max_flaky = flaky_counts.iter().copied().fold(5.0, f64::max);

        [
            PanelSpec {
                title: "Test Coverage Over Time",
                y_label: "Coverage %",
                series: Series::Line {
                    values: trends.iter().map(|t| t.coverage).collect(),
                    color: "#0000ff",
                    marker: Marker::Circle,
                },
                y_max: 100.0,
                fixed_percent_axis: true,
                reference: Some(Reference { value: 70.0, label: "Minimum Threshold" }),
                score_bands: true,
            },
            PanelSpec {
                title: "Quality Score Over Time",
                y_label: "Quality Score",
                series: Series::Line {
                    values: trends.iter().map(|t| t.quality_score).collect(),
                    color: "#008000",
                    marker: Marker::Square,
                },
                y_max: 100.0,
                fixed_percent_axis: true,
                reference: Some(Reference { value: 60.0, label: "Minimum Threshold" }),
                score_bands: false,
            },
            PanelSpec {
                title: "Total Test Files Over Time",
                y_label: "Number of Test Files",
                series: Series::Bars { values: test_counts, color: "#800080" },
                y_max: max_tests,
                fixed_percent_axis: false,
                reference: None,
                score_bands: false,
            },
            PanelSpec {
                title: "Flaky Tests Over Time",
                y_label: "Number of Flaky Tests",
                series: Series::Bars { values: flaky_counts, color: "#ffa500" },
                y_max: max_flaky,
                fixed_percent_axis: false,
                reference: Some(Reference { value: 5.0, label: "Maximum Threshold" }),
                score_bands: false,
            },
        ]
    }

    fn draw_panel(svg: &mut String, plot: Rect, spec: &PanelSpec, axis: &TimeAxis, secs: &[f64]) {
        let (y_max, y_step) = if spec.fixed_percent_axis {
            (100.0, 20.0)
        } else {
            count_axis(spec.y_max)
        };
        let py = |v: f64| plot.bottom() - (v / y_max) * plot.h;

        let _ = writeln!(svg, "<g>");
        let _ = writeln!(
            svg,
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
            plot.x, plot.y, plot.w, plot.h, PLOT_BACKGROUND
        );

        if spec.score_bands {
            for (lo, hi, color) in [(80.0, 100.0, "green"), (60.0, 80.0, "yellow"), (0.0, 60.0, "red")] {
                let _ = writeln!(
                    svg,
                    r#"<rect class="band" x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" fill-opacity="0.1"/>"#,
                    plot.x,
                    py(hi),
                    plot.w,
                    py(lo) - py(hi),
                    color
                );
            }
        }

        // horizontal grid + y tick labels
        let mut v = 0.0;
        while v <= y_max + 1e-9 {
            let y = py(v);
            let _ = writeln!(
                svg,
                r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="white" stroke-opacity="0.9"/>"#,
                plot.x, y, plot.right(), y
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" font-size="12" text-anchor="end">{:.0}</text>"#,
                plot.x - 8.0,
                y + 4.0,
                v
            );
            v += y_step;
        }

        // vertical grid + rotated day labels
        for tick in &axis.ticks {
            let x = axis.px(&plot, tick.timestamp() as f64);
            let _ = writeln!(
                svg,
                r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="white" stroke-opacity="0.9"/>"#,
                x, plot.y, x, plot.bottom()
            );
            let ly = plot.bottom() + 16.0;
            let _ = writeln!(
                svg,
                r#"<text class="xtick" x="{x:.1}" y="{ly:.1}" font-size="12" text-anchor="end" transform="rotate(-45 {x:.1} {ly:.1})">{label}</text>"#,
                x = x,
                ly = ly,
                label = tick.format("%m/%d")
            );
        }

        match &spec.series {
            Series::Line { values, color, marker } => {
                let points: Vec<String> = secs
                    .iter()
                    .zip(values)
                    .map(|(t, v)| format!("{:.1},{:.1}", axis.px(&plot, *t), py(*v)))
                    .collect();
                let _ = writeln!(
                    svg,
                    r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="2"/>"#,
                    points.join(" "),
                    color
                );
                for (t, v) in secs.iter().zip(values) {
                    let (x, y) = (axis.px(&plot, *t), py(*v));
                    match marker {
                        Marker::Circle => {
                            let _ = writeln!(
                                svg,
                                r#"<circle class="marker" cx="{:.1}" cy="{:.1}" r="4" fill="{}"/>"#,
                                x, y, color
                            );
                        }
                        Marker::Square => {
                            let _ = writeln!(
                                svg,
                                r#"<rect class="marker" x="{:.1}" y="{:.1}" width="8" height="8" fill="{}"/>"#,
                                x - 4.0,
                                y - 4.0,
                                color
                            );
                        }
                    }
                }
            }
            Series::Bars { values, color } => {
                let bar_w = (BAR_WIDTH_DAYS * SECONDS_PER_DAY / (axis.end - axis.start) * plot.w).max(1.0);
                for (t, v) in secs.iter().zip(values) {
                    let x = axis.px(&plot, *t) - bar_w / 2.0;
                    let top = py(*v);
                    let _ = writeln!(
                        svg,
                        r#"<rect class="bar" x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" fill-opacity="0.7"/>"#,
                        x,
                        top,
                        bar_w,
                        plot.bottom() - top,
                        color
                    );
                }
            }
        }

        if let Some(reference) = &spec.reference {
            let y = py(reference.value);
            let _ = writeln!(
                svg,
                r#"<line class="reference" x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-opacity="0.5" stroke-width="1.5" stroke-dasharray="6,4"/>"#,
                plot.x, y, plot.right(), y, REFERENCE_COLOR
            );
            let (lx, ly) = (plot.right() - 170.0, plot.y + 10.0);
            let _ = writeln!(
                svg,
                r##"<rect x="{:.1}" y="{:.1}" width="160" height="26" fill="white" fill-opacity="0.8" stroke="#cccccc"/>"##,
                lx, ly
            );
            let _ = writeln!(
                svg,
                r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-opacity="0.5" stroke-width="1.5" stroke-dasharray="6,4"/>"#,
                lx + 8.0,
                ly + 13.0,
                lx + 32.0,
                ly + 13.0,
                REFERENCE_COLOR
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" font-size="12">{}</text>"#,
                lx + 38.0,
                ly + 17.0,
                reference.label
            );
        }

        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="16" text-anchor="middle">{}</text>"#,
            plot.x + plot.w / 2.0,
            plot.y - 14.0,
            spec.title
        );
        let (yx, yy) = (plot.x - 50.0, plot.y + plot.h / 2.0);
        let _ = writeln!(
            svg,
            r#"<text x="{x:.1}" y="{y:.1}" font-size="13" text-anchor="middle" transform="rotate(-90 {x:.1} {y:.1})">{label}</text>"#,
            x = yx,
            y = yy,
            label = spec.y_label
        );
        let _ = writeln!(svg, "</g>");
    }
}

impl Default for TrendChart {
    fn default() -> Self {
        Self::new(ChartOptions::default())
    }
}
