//! Chart rendering for the inventory table.
//!
//! For every metric column three PNG files are written: a bar chart of the value per stage, a pie
//! chart of each stage's share, and a line chart following the table order.  Files are named
//! `<kind>_<column name>.png` inside the renderer's output directory and are overwritten if they
//! already exist.

use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::{debug, info};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};

use crate::fonts;
use crate::lci::{LciTable, Metric};

/// Default chart size in pixels.
pub const DEFAULT_CHART_SIZE: (u32, u32) = (640, 480);

const CHART_FONT_FAMILY: &str = "sans-serif";
const IMAGE_EXTENSION: &str = "png";

const STEEL_BLUE: RGBColor = RGBColor(70, 130, 180);
const FOREST_GREEN: RGBColor = RGBColor(34, 139, 34);
const PIE_COLORS: [RGBColor; 4] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
];

type DrawError = Box<dyn StdError + Send + Sync>;

/// The three visualizations produced per metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
}

impl ChartKind {
    /// Kinds in the order they are rendered for each metric.
    pub const ALL: [ChartKind; 3] = [ChartKind::Bar, ChartKind::Pie, ChartKind::Line];

    /// File name prefix for this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
            ChartKind::Line => "line",
        }
    }

    fn title(self, metric: Metric) -> String {
        match self {
            ChartKind::Bar => format!("{} by Stage", metric.column_name()),
            ChartKind::Pie => format!("{} Distribution", metric.column_name()),
            ChartKind::Line => format!("{} Trend", metric.column_name()),
        }
    }
}

/// File stem for a `(kind, metric)` pair, e.g. `bar_Energy Use (MJ)`.
pub fn chart_file_stem(kind: ChartKind, metric: Metric) -> String {
    format!("{}_{}", kind.prefix(), metric.column_name())
}

/// Figure caption derived from a chart file stem.
///
/// Underscores become spaces and the text is sentence-cased, so `bar_Energy Use (MJ)` becomes
/// `Bar energy use (mj)`.
pub fn caption_from_stem(stem: &str) -> String {
    let spaced = stem.replace('_', " ").to_lowercase();
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// An image file written by the renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartArtifact {
    pub metric: Metric,
    pub kind: ChartKind,
    pub path: PathBuf,
}

impl ChartArtifact {
    /// Caption text for the figure embedding this chart.
    pub fn caption(&self) -> String {
        caption_from_stem(&chart_file_stem(self.kind, self.metric))
    }
}

/// Errors raised while rendering charts.
#[derive(Debug)]
pub enum ChartError {
    /// The output directory could not be created.
    OutputDir { path: PathBuf, source: io::Error },
    /// No font is available for chart text.
    Font(String),
    /// Drawing or encoding a chart failed.
    Draw { path: PathBuf, source: DrawError },
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutputDir { path, .. } => {
                write!(f, "Failed to create chart directory {}", path.display())
            }
            Self::Font(message) => write!(f, "Chart font unavailable: {}", message),
            Self::Draw { path, .. } => write!(f, "Failed to draw chart {}", path.display()),
        }
    }
}

impl StdError for ChartError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::OutputDir { source, .. } => Some(source),
            Self::Font(_) => None,
            Self::Draw { source, .. } => Some(source.as_ref()),
        }
    }
}

/// Registers the document font as the chart font once per process.
pub fn ensure_chart_font() -> Result<(), ChartError> {
    static REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();

    REGISTERED
        .get_or_init(|| {
            let source = fonts::resolve_font_source().map_err(|err| err.to_string())?;
            let bytes = source
                .read_regular()
                .map_err(|err| format!("{}: {}", source.regular_path().display(), err))?;
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            register_font(CHART_FONT_FAMILY, FontStyle::Normal, bytes)
                .map_err(|_| format!("{} is not a valid font", source.regular_path().display()))?;
            debug!("Registered chart font from {}", source.regular_path().display());
            Ok(())
        })
        .clone()
        .map_err(ChartError::Font)
}

/// Values of one metric, ready to plot.
struct MetricSeries {
    metric: Metric,
    labels: Vec<&'static str>,
    values: Vec<f64>,
}

impl MetricSeries {
    fn new(table: &LciTable, metric: Metric) -> Self {
        Self {
            metric,
            labels: table
                .records()
                .iter()
                .map(|record| record.stage.label())
                .collect(),
            values: table.column(metric),
        }
    }

    fn labels(&self) -> &[&'static str] {
        &self.labels
    }

    fn y_max(&self) -> f64 {
        let max = self.values.iter().copied().fold(0.0_f64, f64::max);
        if max > 0.0 {
            max * 1.15
        } else {
            1.0
        }
    }
}

fn stage_label(value: &SegmentValue<&&str>) -> String {
    match value {
        SegmentValue::Exact(label) | SegmentValue::CenterOf(label) => label.to_string(),
        SegmentValue::Last => String::new(),
    }
}

/// A chart that can draw itself onto a bitmap.
trait DrawableChart {
    fn define_chart(&self, root: &DrawingArea<BitMapBackend<'_>, Shift>) -> Result<(), DrawError>;

    fn draw(&self, path: &Path, size: (u32, u32)) -> Result<(), DrawError> {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;
        self.define_chart(&root)?;
        root.present()?;
        debug!("saved chart to {}", path.display());
        Ok(())
    }
}

struct BarChart<'a>(&'a MetricSeries);

impl DrawableChart for BarChart<'_> {
    fn define_chart(&self, root: &DrawingArea<BitMapBackend<'_>, Shift>) -> Result<(), DrawError> {
        let series = self.0;
        let mut chart = ChartBuilder::on(root)
            .caption(ChartKind::Bar.title(series.metric), (CHART_FONT_FAMILY, 22))
            .margin(16)
            .x_label_area_size(36)
            .y_label_area_size(56)
            .build_cartesian_2d(series.labels().into_segmented(), 0.0..series.y_max())?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&stage_label)
            .label_style((CHART_FONT_FAMILY, 13))
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(STEEL_BLUE.filled())
                .margin(14)
                .data(series.labels().iter().zip(series.values.iter().copied())),
        )?;
        Ok(())
    }
}

struct PieChart<'a>(&'a MetricSeries);

impl DrawableChart for PieChart<'_> {
    fn define_chart(&self, root: &DrawingArea<BitMapBackend<'_>, Shift>) -> Result<(), DrawError> {
        let series = self.0;
        let titled = root.titled(
            &ChartKind::Pie.title(series.metric),
            (CHART_FONT_FAMILY, 22),
        )?;

        let (width, height) = titled.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let radius = f64::from(width.min(height)) * 0.35;
        let colors = &PIE_COLORS[..series.values.len().min(PIE_COLORS.len())];
        let labels = series.labels();

        let mut pie = Pie::new(&center, &radius, &series.values, colors, labels);
        pie.start_angle(90.0);
        pie.label_style((CHART_FONT_FAMILY, 14).into_font().color(&BLACK));
        pie.percentages((CHART_FONT_FAMILY, 13).into_font().color(&WHITE));
        titled.draw(&pie)?;
        Ok(())
    }
}

struct LineChart<'a>(&'a MetricSeries);

impl DrawableChart for LineChart<'_> {
    fn define_chart(&self, root: &DrawingArea<BitMapBackend<'_>, Shift>) -> Result<(), DrawError> {
        let series = self.0;
        let mut chart = ChartBuilder::on(root)
            .caption(ChartKind::Line.title(series.metric), (CHART_FONT_FAMILY, 22))
            .margin(16)
            .x_label_area_size(36)
            .y_label_area_size(56)
            .build_cartesian_2d(series.labels().into_segmented(), 0.0..series.y_max())?;

        chart
            .configure_mesh()
            .x_label_formatter(&stage_label)
            .label_style((CHART_FONT_FAMILY, 13))
            .draw()?;

        let points: Vec<_> = series
            .labels()
            .iter()
            .zip(series.values.iter().copied())
            .map(|(label, value)| (SegmentValue::CenterOf(label), value))
            .collect();

        chart.draw_series(std::iter::once(PathElement::new(points.clone(), FOREST_GREEN.stroke_width(2))))?;
        chart.draw_series(
            points
                .iter()
                .map(|point| Circle::new(point.clone(), 4, FOREST_GREEN.filled())),
        )?;
        Ok(())
    }
}

/// Writes chart images for an inventory table into one directory.
#[derive(Clone, Debug)]
pub struct ChartRenderer {
    output_dir: PathBuf,
    size: (u32, u32),
}

impl ChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            size: DEFAULT_CHART_SIZE,
        }
    }

    /// Sets the pixel size of every chart.
    pub fn with_size(mut self, size: (u32, u32)) -> Self {
        self.size = size;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path a `(kind, metric)` chart is written to.
    pub fn chart_path(&self, kind: ChartKind, metric: Metric) -> PathBuf {
        self.output_dir.join(format!(
            "{}.{}",
            chart_file_stem(kind, metric),
            IMAGE_EXTENSION
        ))
    }

    /// Paths that [`render_all`](Self::render_all) produces, in rendering order.
    pub fn planned_artifacts(&self) -> Vec<ChartArtifact> {
        Metric::ALL
            .iter()
            .flat_map(|&metric| {
                ChartKind::ALL.iter().map(move |&kind| ChartArtifact {
                    metric,
                    kind,
                    path: self.chart_path(kind, metric),
                })
            })
            .collect()
    }

    /// Renders bar, pie and line charts for every metric column.
    ///
    /// Returns the artifacts in rendering order: metrics in column order, and bar, pie, line
    /// within each metric.
    pub fn render_all(&self, table: &LciTable) -> Result<Vec<ChartArtifact>, ChartError> {
        ensure_chart_font()?;
        fs::create_dir_all(&self.output_dir).map_err(|source| ChartError::OutputDir {
            path: self.output_dir.clone(),
            source,
        })?;

        let artifacts = self.planned_artifacts();
        for artifact in &artifacts {
            let series = MetricSeries::new(table, artifact.metric);
            let drawn = match artifact.kind {
                ChartKind::Bar => BarChart(&series).draw(&artifact.path, self.size),
                ChartKind::Pie => PieChart(&series).draw(&artifact.path, self.size),
                ChartKind::Line => LineChart(&series).draw(&artifact.path, self.size),
            };
            drawn.map_err(|source| ChartError::Draw {
                path: artifact.path.clone(),
                source,
            })?;
        }

        info!(
            "Rendered {} charts for {} stages into {}",
            artifacts.len(),
            table.records().len(),
            self.output_dir.display()
        );
        Ok(artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lci::{self, LifeCycleStage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn series_labels_follow_table_stages() {
        let table = lci::generate_lci_data(&mut StdRng::seed_from_u64(11));
        let series = MetricSeries::new(&table, Metric::GhgEmissions);

        let expected: Vec<_> = LifeCycleStage::ALL
            .iter()
            .map(|stage| stage.label())
            .collect();
        assert_eq!(series.labels(), expected.as_slice());
        assert_eq!(series.values, table.column(Metric::GhgEmissions));
    }

    #[test]
    fn plans_three_charts_per_metric() {
        let renderer = ChartRenderer::new("out");
        let artifacts = renderer.planned_artifacts();
        assert_eq!(artifacts.len(), 3 * Metric::ALL.len());

        let pairs: HashSet<_> = artifacts.iter().map(|a| (a.kind, a.metric)).collect();
        let paths: HashSet<_> = artifacts.iter().map(|a| a.path.clone()).collect();
        assert_eq!(pairs.len(), artifacts.len());
        assert_eq!(paths.len(), artifacts.len());
    }

    #[test]
    fn planned_order_is_bar_pie_line_per_metric() {
        let artifacts = ChartRenderer::new("out").planned_artifacts();
        let names: Vec<_> = artifacts
            .iter()
            .map(|a| a.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names[..4],
            [
                "bar_Energy Use (MJ).png",
                "pie_Energy Use (MJ).png",
                "line_Energy Use (MJ).png",
                "bar_GHG Emissions (kg CO2-eq).png",
            ]
        );
        assert_eq!(names[8], "line_Water Use (L).png");
    }

    #[test]
    fn charts_live_in_output_dir() {
        let renderer = ChartRenderer::new("/tmp/lca");
        assert_eq!(
            renderer.chart_path(ChartKind::Pie, Metric::WaterUse),
            PathBuf::from("/tmp/lca/pie_Water Use (L).png")
        );
    }

    #[test]
    fn captions_are_sentence_cased() {
        assert_eq!(
            caption_from_stem("bar_Energy Use (MJ)"),
            "Bar energy use (mj)"
        );
        assert_eq!(
            caption_from_stem("line_GHG Emissions (kg CO2-eq)"),
            "Line ghg emissions (kg co2-eq)"
        );
        assert_eq!(caption_from_stem(""), "");
    }

    #[test]
    fn artifact_caption_matches_stem() {
        let artifact = ChartArtifact {
            metric: Metric::WaterUse,
            kind: ChartKind::Pie,
            path: PathBuf::from("pie_Water Use (L).png"),
        };
        assert_eq!(artifact.caption(), "Pie water use (l)");
    }
}
