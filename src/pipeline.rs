//! One report run: generate data, render charts, write the narrative, assemble the report.
//!
//! Runs are synchronous and share nothing but the output directory.  Two concurrent runs for
//! the same product and directory overwrite each other's files.

use std::path::PathBuf;

use log::info;
use rand::Rng;

use crate::charts::{ChartArtifact, ChartRenderer};
use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::lci::{self, LciTable};
use crate::narrative;
use crate::report;

/// Everything a run produced.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub product: String,
    pub table: LciTable,
    pub charts: Vec<ChartArtifact>,
    pub report_path: PathBuf,
}

/// Runs the full pipeline for `product`, drawing inventory values from `rng`.
pub fn run_pipeline<R>(
    product: &str,
    config: &ReportConfig,
    rng: &mut R,
) -> Result<PipelineOutput, ReportError>
where
    R: Rng + ?Sized,
{
    info!("Generating LCA report for {:?}", product);

    let table = lci::generate_lci_data(rng);
    let charts = ChartRenderer::new(config.output_dir())
        .with_size(config.chart_size())
        .render_all(&table)?;
    let narrative = narrative::generate_narrative(product);
    let report_path = report::assemble_report(product, &table, &charts, &narrative, config)?;

    Ok(PipelineOutput {
        product: product.to_string(),
        table,
        charts,
        report_path,
    })
}
