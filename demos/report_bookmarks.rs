#[cfg(feature = "bookmarks")]
use std::error::Error;

#[cfg(feature = "bookmarks")]
fn main() -> Result<(), Box<dyn Error>> {
    use lca_report_visual::charts::ChartRenderer;
    use lca_report_visual::lci::generate_lci_data_from_entropy;
    use lca_report_visual::narrative::generate_narrative;
    use lca_report_visual::report::layout_report;
    use lca_report_visual::ReportConfig;

    let product = "Cordless Drill";
    let config = ReportConfig::new().with_output_dir("target/demo_reports");
    let table = generate_lci_data_from_entropy();
    let charts = ChartRenderer::new(config.output_dir()).render_all(&table)?;
    let document = layout_report(
        product,
        &table,
        &charts,
        &generate_narrative(product),
        config.report_date(),
    )?;

    let pdf = document
        .to_pdf_builder(config.figure_width_mm())
        .render_with_bookmarks()?;
    let path = config.output_dir().join(document.file_name());
    std::fs::write(&path, &pdf.bytes)?;
    println!(
        "Generated {} ({} bytes) with bookmarks on pages {:?}",
        path.display(),
        pdf.bytes.len(),
        pdf.section_pages
    );
    Ok(())
}

#[cfg(not(feature = "bookmarks"))]
fn main() {
    eprintln!(
        "Enable the `bookmarks` feature to run this example: \
         cargo run --example report_bookmarks --features bookmarks"
    );
}
