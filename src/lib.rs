//! Core entry point for the lca_report_visual crate.
//!
//! The domain modules ([`lci`], [`charts`], [`narrative`], [`report`]) produce the content of a
//! life-cycle-assessment report, while the document modules ([`model`], [`builder`],
//! [`elements`], [`richtext`], [`fonts`]) turn that content into a PDF via `genpdf`.

pub mod builder;
pub mod charts;
pub mod config;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod lci;
pub mod model;
pub mod narrative;
pub mod pipeline;
pub mod report;
pub mod richtext;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use config::ReportConfig;
pub use error::ReportError;
pub use pipeline::{run_pipeline, PipelineOutput};
