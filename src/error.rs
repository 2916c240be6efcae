//! Crate-level error type.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::builder::PdfBuildError;
use crate::charts::ChartError;
use crate::model::RowWidthMismatch;

/// Any failure of a report run. Nothing is retried; the first error ends the run.
#[derive(Debug)]
pub enum ReportError {
    /// Chart images could not be produced.
    Charts(ChartError),
    /// The data table did not match its header.
    Layout(RowWidthMismatch),
    /// The PDF could not be built.
    Document(PdfBuildError),
    /// The finished report could not be written.
    Write { path: PathBuf, source: io::Error },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Charts(_) => write!(f, "Failed to render charts"),
            Self::Layout(_) => write!(f, "Failed to lay out the inventory table"),
            Self::Document(_) => write!(f, "Failed to build the report document"),
            Self::Write { path, .. } => write!(f, "Failed to write report {}", path.display()),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Charts(err) => Some(err),
            Self::Layout(err) => Some(err),
            Self::Document(err) => Some(err),
            Self::Write { source, .. } => Some(source),
        }
    }
}

impl From<ChartError> for ReportError {
    fn from(err: ChartError) -> Self {
        Self::Charts(err)
    }
}

impl From<RowWidthMismatch> for ReportError {
    fn from(err: RowWidthMismatch) -> Self {
        Self::Layout(err)
    }
}

impl From<PdfBuildError> for ReportError {
    fn from(err: PdfBuildError) -> Self {
        Self::Document(err)
    }
}
