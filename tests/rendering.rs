use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use lca_report_visual::builder::PdfBuilder;
use lca_report_visual::fonts;
use lca_report_visual::model::{Block, Section};
use lca_report_visual::narrative::generate_narrative;
use lca_report_visual::report::{layout_report, report_file_name, ReportDocument};
use lca_report_visual::richtext::Span;
use lca_report_visual::{run_pipeline, PipelineOutput, ReportConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sha2::{Digest, Sha256};

const SKIP_NOTE: &str =
    "bundled fonts missing. Set LCA_REPORT_FONTS_DIR or copy assets/fonts next to the binary.";

fn fonts_ready(test: &str) -> bool {
    if fonts::default_fonts_available() {
        true
    } else {
        eprintln!("Skipping {test}: {SKIP_NOTE}");
        false
    }
}

fn config_for(dir: &Path) -> ReportConfig {
    ReportConfig::new()
        .with_output_dir(dir)
        .with_report_date(NaiveDate::from_ymd_opt(2024, 5, 17).expect("valid date"))
}

fn report_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .expect("read output dir")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".pdf"))
        .collect();
    names.sort();
    names
}

fn file_digest(path: &Path) -> [u8; 32] {
    Sha256::digest(fs::read(path).expect("read file")).into()
}

/// Rebuilds the report layout for a finished run.
fn layout_run(output: &PipelineOutput, config: &ReportConfig) -> ReportDocument {
    layout_report(
        &output.product,
        &output.table,
        &output.charts,
        &generate_narrative(&output.product),
        config.report_date(),
    )
    .expect("layout")
}

#[test]
fn pipeline_writes_report_and_nine_charts() {
    if !fonts_ready("pipeline_writes_report_and_nine_charts") {
        return;
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let output = run_pipeline(
        "Electric Toothbrush",
        &config_for(dir.path()),
        &mut StdRng::seed_from_u64(3),
    )
    .expect("pipeline run");

    assert_eq!(output.charts.len(), 9);
    for chart in &output.charts {
        assert!(chart.path.is_file(), "missing {}", chart.path.display());
    }

    assert_eq!(
        output.report_path,
        dir.path().join("LCA_Report_Visual_Electric_Toothbrush.pdf")
    );
    let bytes = fs::read(&output.report_path).expect("read report");
    assert!(bytes.starts_with(b"%PDF"), "report is not a PDF");
}

#[test]
fn rerun_overwrites_instead_of_duplicating() {
    if !fonts_ready("rerun_overwrites_instead_of_duplicating") {
        return;
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_for(dir.path());
    let first = run_pipeline("Kettle Pro", &config, &mut StdRng::seed_from_u64(1)).expect("run 1");
    let second = run_pipeline("Kettle Pro", &config, &mut StdRng::seed_from_u64(2)).expect("run 2");

    assert_eq!(first.report_path, second.report_path);
    assert_ne!(first.table, second.table);
    assert_eq!(report_files(dir.path()), vec![report_file_name("Kettle Pro")]);
}

#[test]
fn empty_product_still_completes() {
    if !fonts_ready("empty_product_still_completes") {
        return;
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let output = run_pipeline("", &config_for(dir.path()), &mut StdRng::seed_from_u64(5))
        .expect("pipeline run");

    assert_eq!(output.report_path, dir.path().join("LCA_Report_Visual_.pdf"));
    assert!(output.report_path.is_file());
}

#[test]
fn same_seed_reproduces_data_charts_and_layout() {
    if !fonts_ready("same_seed_reproduces_data_charts_and_layout") {
        return;
    }

    let run = || {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_for(dir.path());
        let output = run_pipeline("Blender", &config, &mut StdRng::seed_from_u64(9))
            .expect("pipeline run");
        let chart_digests: Vec<_> = output
            .charts
            .iter()
            .map(|chart| file_digest(&chart.path))
            .collect();
        let report_len = fs::metadata(&output.report_path)
            .expect("report metadata")
            .len();
        let rendered = layout_run(&output, &config)
            .to_pdf_builder(config.figure_width_mm())
            .render()
            .expect("render");
        (output.table, chart_digests, report_len, rendered.section_pages)
    };

    let (table_a, charts_a, len_a, pages_a) = run();
    let (table_b, charts_b, len_b, pages_b) = run();
    assert_eq!(table_a, table_b);
    assert_eq!(charts_a, charts_b, "chart images should be byte-identical");
    assert_eq!(len_a, len_b, "PDF sizes should match");
    assert_eq!(pages_a, pages_b);
    assert_eq!(pages_a.len(), 13);
    assert!(pages_a.iter().all(Option::is_some));
}

#[test]
fn section_pages_follow_page_breaks() {
    if !fonts_ready("section_pages_follow_page_breaks") {
        return;
    }

    let rendered = PdfBuilder::new()
        .add_section(
            Section::builder("First")
                .push_block(Block::paragraph(vec![Span::new("one").bold()]))
                .end_with_page_break(true)
                .build(),
        )
        .add_section(
            Section::builder("Second")
                .push_block(Block::text("two"))
                .end_with_page_break(true)
                .build(),
        )
        .add_section(Section::new("Third").with_block(Block::text("three")))
        .render()
        .expect("render");

    assert!(!rendered.bytes.is_empty());
    assert_eq!(rendered.section_pages, vec![Some(1), Some(2), Some(3)]);
}

#[cfg(feature = "bookmarks")]
#[test]
fn bookmarks_point_at_section_pages() {
    use lopdf::{Document, Object};

    if !fonts_ready("bookmarks_point_at_section_pages") {
        return;
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_for(dir.path());
    let output = run_pipeline("Electric Toothbrush", &config, &mut StdRng::seed_from_u64(4))
        .expect("pipeline run");
    let rendered = layout_run(&output, &config)
        .to_pdf_builder(config.figure_width_mm())
        .render_with_bookmarks()
        .expect("render with bookmarks");

    let document = Document::load_mem(&rendered.bytes).expect("parse PDF");
    let page_numbers: std::collections::HashMap<_, _> = document
        .get_pages()
        .into_iter()
        .map(|(number, id)| (id, number as usize))
        .collect();

    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .expect("catalog reference");
    let outlines_id = document
        .get_dictionary(catalog_id)
        .and_then(|catalog| catalog.get(b"Outlines"))
        .and_then(Object::as_reference)
        .expect("outline reference");
    let outlines = document.get_dictionary(outlines_id).expect("outline root");
    assert_eq!(outlines.get(b"Count").and_then(Object::as_i64).ok(), Some(13));

    let mut item = outlines.get(b"First").and_then(Object::as_reference).ok();
    let mut dest_pages = Vec::new();
    while let Some(id) = item {
        let entry = document.get_dictionary(id).expect("outline item");
        let dest = entry
            .get(b"Dest")
            .and_then(Object::as_array)
            .expect("destination");
        let page_id = dest[0].as_reference().expect("page reference");
        dest_pages.push(page_numbers.get(&page_id).copied());
        item = entry.get(b"Next").and_then(Object::as_reference).ok();
    }

    assert_eq!(dest_pages, rendered.section_pages);
}
