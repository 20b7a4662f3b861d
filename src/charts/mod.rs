//! SVG chart rendering for thread-scaling samples and merged benchmark rows.
//!
//! Charts only read their inputs; apart from grouping rows by operation or data size no data
//! is transformed here.

use std::collections::HashSet;
use std::path::Path;

use plotters::prelude::*;

use crate::elements::Point;
use crate::error::ChartError;

mod latency;
mod threads;

pub use latency::*;
pub use threads::*;

const CHART_SIZE: (u32, u32) = (1200, 800);
const BAR_CHART_SIZE: (u32, u32) = (1000, 600);
const FONT: &str = "sans-serif";

/// Ratio between the largest and smallest data size beyond which the x axis is logarithmic.
pub const LOG_SCALE_RATIO: f64 = 10.0;

/// Decides whether data sizes span enough orders of magnitude for a logarithmic x axis.
///
/// True only when `max / min` is strictly greater than `LOG_SCALE_RATIO`. A zero size cannot be
/// shown on a log axis, so it keeps the axis linear.
pub fn use_log_scale<I>(data_sizes: I) -> bool
where
    I: IntoIterator<Item = u64>,
{
    let (min, max) = data_sizes
        .into_iter()
        .fold((u64::MAX, u64::MIN), |(min, max), size| (min.min(size), max.max(size)));

    if min == 0 || max < min {
        return false;
    }

    (max as f64 / min as f64) > LOG_SCALE_RATIO
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisScale {
    Linear,
    Log10,
}

impl AxisScale {
    fn project(&self, value: f64) -> f64 {
        match self {
            Self::Linear => value,
            Self::Log10 => value.log10(),
        }
    }

    fn label(&self, projected: f64) -> String {
        match self {
            Self::Linear => format!("{}", (projected * 100.0).round() / 100.0),
            Self::Log10 => format!("{:.0}", 10_f64.powf(projected)),
        }
    }
}

#[derive(Debug, Clone)]
struct Series {
    label: String,
    points: Vec<Point>,
    color: RGBAColor,
}

#[derive(Debug, Clone)]
struct VerticalMarker {
    label: String,
    x: f64,
    color: RGBAColor,
}

#[derive(Debug, Clone)]
struct Annotation {
    text: String,
    at: Point,
}

#[derive(Debug, Clone)]
struct LineChart {
    title: String,
    x_desc: String,
    y_desc: String,
    x_scale: AxisScale,
    series: Vec<Series>,
    markers: Vec<VerticalMarker>,
    annotation: Option<Annotation>,
}

impl LineChart {
    fn new(title: impl Into<String>, x_desc: impl Into<String>, y_desc: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_desc: x_desc.into(),
            y_desc: y_desc.into(),
            x_scale: AxisScale::Linear,
            series: Vec::new(),
            markers: Vec::new(),
            annotation: None,
        }
    }

    fn with_x_scale(mut self, x_scale: AxisScale) -> Self {
        self.x_scale = x_scale;
        self
    }

    fn with_series(mut self, label: impl Into<String>, points: Vec<Point>, color: RGBAColor) -> Self {
        self.series.push(Series { label: label.into(), points, color });
        self
    }

    fn with_marker(mut self, label: impl Into<String>, x: f64, color: RGBAColor) -> Self {
        self.markers.push(VerticalMarker { label: label.into(), x, color });
        self
    }

    fn with_annotation(mut self, text: impl Into<String>, at: Point) -> Self {
        self.annotation = Some(Annotation { text: text.into(), at });
        self
    }

    fn x_bounds(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.0))
            .chain(self.markers.iter().map(|m| m.x))
            .map(|x| self.x_scale.project(x))
            .fold(None, |acc, x| match acc {
                None => Some((x, x)),
                Some((lo, hi)) => Some((f64::min(lo, x), f64::max(hi, x))),
            })
    }

    fn y_top(&self) -> f64 {
        let y_max = self
            .series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.1))
            .fold(0_f64, f64::max);

        if 0.0 < y_max {
            y_max * 1.15
        } else {
            1.0
        }
    }

    fn render(&self, path: &Path) -> Result<(), ChartError> {
        if self.series.iter().all(|s| s.points.is_empty()) {
            return Err(ChartError::EmptySeries(self.title.clone()));
        }

        let (x_min, x_max) = self.x_bounds().ok_or_else(|| ChartError::EmptySeries(self.title.clone()))?;
        let x_pad = f64::max((x_max - x_min) * 0.05, 0.5);
        let y_top = self.y_top();
        let x_scale = self.x_scale;

        let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(self.title.as_str(), (FONT, 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d((x_min - x_pad)..(x_max + x_pad), 0_f64..y_top)?;

        chart
            .configure_mesh()
            .x_desc(self.x_desc.as_str())
            .y_desc(self.y_desc.as_str())
            .x_label_formatter(&|x| x_scale.label(*x))
            .draw()?;

        for series in self.series.iter() {
            let color = series.color;
            let points: Vec<Point> = series.points.iter().map(|&(x, y)| (x_scale.project(x), y)).collect();

            chart
                .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
                .label(series.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

            chart.draw_series(points.into_iter().map(|p| Circle::new(p, 4, color.filled())))?;
        }

        for marker in self.markers.iter() {
            let color = marker.color;
            let x = x_scale.project(marker.x);
            chart
                .draw_series(LineSeries::new(vec![(x, 0.0), (x, y_top)], color.stroke_width(1)))?
                .label(marker.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(1)));
        }

        if let Some(annotation) = self.annotation.as_ref() {
            let at = (x_scale.project(annotation.at.0), annotation.at.1);
            let style = (FONT, 18).into_font().color(&RED);
            chart.draw_series(std::iter::once(Text::new(annotation.text.clone(), at, style)))?;
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
        tracing::info!("saved chart to {:?}", path);
        Ok(())
    }
}

/// Bar chart with one bar per label and the value printed above each bar.
fn render_bar_chart(path: &Path, title: &str, y_desc: &str, bars: &[(String, f64)]) -> Result<(), ChartError> {
    if bars.is_empty() {
        return Err(ChartError::EmptySeries(title.to_string()));
    }

    let y_max = bars.iter().map(|(_, v)| *v).fold(0_f64, f64::max);
    let y_top = if 0.0 < y_max { y_max * 1.15 } else { 1.0 };
    let labels: Vec<&str> = bars.iter().map(|(label, _)| label.as_str()).collect();

    let root = SVGBackend::new(path, BAR_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d((0..bars.len()).into_segmented(), 0_f64..y_top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Operation")
        .y_desc(y_desc)
        .x_labels(bars.len())
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(idx) => labels.get(*idx).map(|l| l.to_string()).unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(idx, (_, value))| {
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(idx), 0.0), (SegmentValue::Exact(idx + 1), *value)],
            Palette99::pick(idx).mix(0.8).filled(),
        );
        bar.set_margin(0, 0, 15, 15);
        bar
    }))?;

    chart.draw_series(bars.iter().enumerate().map(|(idx, (_, value))| {
        Text::new(
            format!("{:.2}", value),
            (SegmentValue::CenterOf(idx), *value),
            (FONT, 16).into_font(),
        )
    }))?;

    root.present()?;
    tracing::info!("saved chart to {:?}", path);
    Ok(())
}

/// Keeps chart file names portable when operation labels contain path separators or spaces.
fn file_stem(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Like `file_stem`, but suffixes a counter when two labels sanitize to the same stem.
fn unique_file_stem(label: &str, used: &mut HashSet<String>) -> String {
    let stem = file_stem(label);
    if used.insert(stem.clone()) {
        return stem;
    }

    let unique = (2..)
        .map(|n| format!("{}_{}", stem, n))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| stem.clone());
    tracing::warn!(%label, %stem, %unique, "chart file name already taken by another label.");
    used.insert(unique.clone());
    unique
}
