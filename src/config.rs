//! Run configuration for report generation.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::charts::DEFAULT_CHART_SIZE;
use crate::elements::inches_to_mm;

/// Width of embedded figures, in inches.
pub const DEFAULT_FIGURE_WIDTH_IN: f64 = 5.5;

/// Settings shared by the chart renderer and the report assembler.
///
/// Every file a run produces is written below [`output_dir`](Self::output_dir).
#[derive(Clone, Debug, PartialEq)]
pub struct ReportConfig {
    output_dir: PathBuf,
    chart_size: (u32, u32),
    figure_width_mm: f64,
    report_date: Option<NaiveDate>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            chart_size: DEFAULT_CHART_SIZE,
            figure_width_mm: inches_to_mm(DEFAULT_FIGURE_WIDTH_IN),
            report_date: None,
        }
    }
}

impl ReportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory receiving chart images and the report file.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Pixel size of each chart image.
    pub fn with_chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_size = (width, height);
        self
    }

    /// Rendered width of embedded figures in millimetres.
    pub fn with_figure_width_mm(mut self, width_mm: f64) -> Self {
        self.figure_width_mm = width_mm;
        self
    }

    /// Fixes the date printed on the report instead of using today's date.
    pub fn with_report_date(mut self, date: impl Into<Option<NaiveDate>>) -> Self {
        self.report_date = date.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn chart_size(&self) -> (u32, u32) {
        self.chart_size
    }

    pub fn figure_width_mm(&self) -> f64 {
        self.figure_width_mm
    }

    /// The configured date, or today's local date.
    pub fn report_date(&self) -> NaiveDate {
        self.report_date.unwrap_or_else(|| Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_layout() {
        let config = ReportConfig::default();
        assert_eq!(config.output_dir(), Path::new("."));
        assert_eq!(config.chart_size(), (640, 480));
        assert!((config.figure_width_mm() - 139.7).abs() < 1e-9);
    }

    #[test]
    fn fixed_date_overrides_today() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date");
        let config = ReportConfig::new().with_report_date(date);
        assert_eq!(config.report_date(), date);
    }
}
