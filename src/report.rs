//! Report assembly.
//!
//! [`layout_report`] arranges the product name, inventory table, chart files and narrative into a
//! [`ReportDocument`]: front matter, eleven body sections in a fixed order, and the detailed
//! inventory table.  [`assemble_report`] renders that layout to PDF and writes it to the output
//! directory under a name derived from the product.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use genpdf::elements::Paragraph;
use genpdf::Alignment;
use log::info;

use crate::builder::{PdfBuilder, RenderedPdf};
use crate::charts::ChartArtifact;
use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::lci::LciTable;
use crate::model::{
    Block, Cover, HeadingLevel, HorizontalAlignment, ImageBlock, RichParagraph, RowWidthMismatch,
    Section, TableBlock,
};
use crate::narrative::Narrative;
use crate::richtext::Span;

/// Right-aligned notice printed under the date.
pub const CONFIDENTIALITY_NOTICE: &str = "Confidential – For Internal Use Only";

/// Title of the front-matter summary.
pub const EXECUTIVE_SUMMARY_TITLE: &str = "Executive Summary";

/// Heading of the trailing inventory table.
pub const DATA_TABLE_TITLE: &str = "Detailed LCI Table";

const TOC_TITLE: &str = "Table of Contents";
const REPORT_FILE_PREFIX: &str = "LCA_Report_Visual_";
const REPORT_FILE_EXTENSION: &str = "pdf";
const FOOTER_HEIGHT_MM: i32 = 10;

/// How the body text of a section is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionKind {
    /// Fixed text.
    Static,
    /// Fixed text with the product name filled in.
    Templated,
    /// One of the generated narrative passages.
    Narrative,
    /// Fixed text followed by every chart figure.
    ChartGallery,
}

#[derive(Clone, Copy, Debug)]
enum SectionBody {
    Lines(&'static [&'static str]),
    FunctionalUnit,
    Interpretation,
    Recommendations,
}

struct SectionTemplate {
    title: &'static str,
    level: HeadingLevel,
    kind: SectionKind,
    body: SectionBody,
}

const fn primary(title: &'static str, kind: SectionKind, body: SectionBody) -> SectionTemplate {
    SectionTemplate {
        title,
        level: HeadingLevel::Primary,
        kind,
        body,
    }
}

const fn appendix(title: &'static str, lines: &'static [&'static str]) -> SectionTemplate {
    SectionTemplate {
        title,
        level: HeadingLevel::Secondary,
        kind: SectionKind::Static,
        body: SectionBody::Lines(lines),
    }
}

/// The body sections, in document order.
const SECTION_TEMPLATES: [SectionTemplate; 11] = [
    primary(
        "1. Introduction",
        SectionKind::Static,
        SectionBody::Lines(&[
            "This report follows ISO 14040 and 14044 standards to evaluate environmental impacts.",
        ]),
    ),
    primary(
        "2. Goal and Scope",
        SectionKind::Static,
        SectionBody::Lines(&[
            "To assess the full life cycle environmental impact of a product from raw materials to disposal.",
        ]),
    ),
    primary(
        "3. Functional Unit",
        SectionKind::Templated,
        SectionBody::FunctionalUnit,
    ),
    primary(
        "4. System Boundary",
        SectionKind::Static,
        SectionBody::Lines(&[
            "Cradle-to-grave: includes raw materials, manufacturing, transport, use, and end-of-life.",
        ]),
    ),
    primary(
        "5. Inventory Analysis",
        SectionKind::Static,
        SectionBody::Lines(&[
            "Detailed data of material and energy inputs/outputs collected and modeled.",
        ]),
    ),
    primary(
        "6. Life Cycle Impact Assessment (LCIA)",
        SectionKind::ChartGallery,
        SectionBody::Lines(&[
            "Visual representation of environmental burdens by stage and impact type.",
        ]),
    ),
    primary(
        "7. Interpretation",
        SectionKind::Narrative,
        SectionBody::Interpretation,
    ),
    primary(
        "8. Assumptions and Limitations",
        SectionKind::Static,
        SectionBody::Lines(&[
            "Assumptions include average usage rates, regional electricity mixes, and generalized transport models.",
        ]),
    ),
    primary(
        "9. Recommendations",
        SectionKind::Narrative,
        SectionBody::Recommendations,
    ),
    appendix(
        "Appendix A: Glossary",
        &[
            "LCA: Life Cycle Assessment",
            "GWP: Global Warming Potential",
            "MJ: Megajoules",
            "CO2-eq: Carbon dioxide equivalent",
        ],
    ),
    appendix(
        "Appendix B: References",
        &[
            "1. ISO 14040:2006",
            "2. ISO 14044:2006",
            "3. ReCiPe 2016",
            "4. IPCC AR6",
            "5. Ecoinvent Database",
        ],
    ),
];

/// A chart embedded in the impact-assessment section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Figure {
    pub caption: String,
    pub path: PathBuf,
}

/// A resolved body section.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportSection {
    pub title: String,
    pub level: HeadingLevel,
    pub kind: SectionKind,
    /// One entry per printed paragraph.
    pub paragraphs: Vec<String>,
    pub figures: Vec<Figure>,
}

/// Complete layout of one report, independent of the PDF renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportDocument {
    pub product: String,
    pub title: String,
    pub date: NaiveDate,
    pub executive_summary: String,
    pub sections: Vec<ReportSection>,
    pub data_table: TableBlock,
}

/// File name of the report for `product`: spaces become underscores, nothing else changes.
pub fn report_file_name(product: &str) -> String {
    format!(
        "{}{}.{}",
        REPORT_FILE_PREFIX,
        product.replace(' ', "_"),
        REPORT_FILE_EXTENSION
    )
}

/// Title printed on the first page.
pub fn report_title(product: &str) -> String {
    format!("LCA Report for: {}", product)
}

fn resolve_body(body: SectionBody, product: &str, narrative: &Narrative) -> Vec<String> {
    match body {
        SectionBody::Lines(lines) => lines.iter().map(|line| line.to_string()).collect(),
        SectionBody::FunctionalUnit => {
            vec![format!("1 {} used over an average 3-year lifespan.", product)]
        }
        SectionBody::Interpretation => vec![narrative.interpretation.clone()],
        SectionBody::Recommendations => vec![narrative.recommendations.clone()],
    }
}

/// Builds the inventory table block with values rounded to two decimals.
pub fn data_table_block(table: &LciTable) -> Result<TableBlock, RowWidthMismatch> {
    let mut block = TableBlock::new(table.column_names());
    for row in table.formatted_rows() {
        block.push_row(row)?;
    }
    Ok(block)
}

/// Arranges all report content in its fixed order.
///
/// Figures are attached only to the impact-assessment section, in the order of `charts`.
pub fn layout_report(
    product: &str,
    table: &LciTable,
    charts: &[ChartArtifact],
    narrative: &Narrative,
    date: NaiveDate,
) -> Result<ReportDocument, RowWidthMismatch> {
    let sections = SECTION_TEMPLATES
        .iter()
        .map(|template| ReportSection {
            title: template.title.to_string(),
            level: template.level,
            kind: template.kind,
            paragraphs: resolve_body(template.body, product, narrative),
            figures: match template.kind {
                SectionKind::ChartGallery => charts
                    .iter()
                    .map(|chart| Figure {
                        caption: chart.caption(),
                        path: chart.path.clone(),
                    })
                    .collect(),
                _ => Vec::new(),
            },
        })
        .collect();

    Ok(ReportDocument {
        product: product.to_string(),
        title: report_title(product),
        date,
        executive_summary: narrative.executive_summary.clone(),
        sections,
        data_table: data_table_block(table)?,
    })
}

impl ReportDocument {
    /// Entries of the printed table of contents.
    pub fn toc_entries(&self) -> Vec<&str> {
        std::iter::once(EXECUTIVE_SUMMARY_TITLE)
            .chain(self.sections.iter().map(|section| section.title.as_str()))
            .chain(std::iter::once(DATA_TABLE_TITLE))
            .collect()
    }

    /// Output file name for this report.
    pub fn file_name(&self) -> String {
        report_file_name(&self.product)
    }

    fn cover(&self) -> Cover {
        Cover::new(self.title.clone())
            .with_subtitle(format!("Date: {}", self.date))
            .with_block(Block::Paragraph(
                RichParagraph::new(vec![Span::new(CONFIDENTIALITY_NOTICE).italic()])
                    .with_alignment(HorizontalAlignment::Right),
            ))
    }

    fn figure_block(figure: &Figure, width_mm: f64) -> Block {
        Block::Image(
            ImageBlock::new(figure.path.clone())
                .with_caption(RichParagraph::new(vec![
                    Span::new("Figure: ").bold(),
                    Span::new(figure.caption.clone()),
                ]))
                .with_width_mm(width_mm),
        )
    }

    /// Converts the layout into PDF sections, one page-terminated section per body section.
    pub fn pdf_sections(&self, figure_width_mm: f64) -> Vec<Section> {
        let mut sections = Vec::with_capacity(self.sections.len() + 2);

        sections.push(
            Section::builder(EXECUTIVE_SUMMARY_TITLE)
                .identifier(Some("executive-summary".to_string()))
                .push_block(Block::text(self.executive_summary.clone()))
                .end_with_page_break(true)
                .build(),
        );

        for (index, section) in self.sections.iter().enumerate() {
            sections.push(
                Section::builder(section.title.clone())
                    .identifier(Some(format!("section-{}", index + 1)))
                    .level(section.level)
                    .extend_blocks(section.paragraphs.iter().cloned().map(Block::text))
                    .extend_blocks(
                        section
                            .figures
                            .iter()
                            .map(|figure| Self::figure_block(figure, figure_width_mm)),
                    )
                    .end_with_page_break(true)
                    .build(),
            );
        }

        sections.push(
            Section::builder(DATA_TABLE_TITLE)
                .identifier(Some("lci-table".to_string()))
                .level(HeadingLevel::Secondary)
                .push_block(Block::Table(self.data_table.clone()))
                .build(),
        );

        sections
    }

    /// Prepares a PDF builder with cover, contents, page header and footer.
    pub fn to_pdf_builder(&self, figure_width_mm: f64) -> PdfBuilder {
        let header_title = self.title.clone();
        let builder = PdfBuilder::new()
            .with_title(self.title.clone())
            .with_header(move |_| {
                let mut line = Paragraph::new(header_title.clone());
                line.set_alignment(Alignment::Right);
                line
            })
            .with_footer(FOOTER_HEIGHT_MM, |page| {
                let mut line =
                    Paragraph::new(format!("Page {} • {}", page, CONFIDENTIALITY_NOTICE));
                line.set_alignment(Alignment::Center);
                line
            })
            .with_cover(self.cover())
            .include_printed_toc(true)
            .with_toc_title(Some(TOC_TITLE.to_string()));

        self.pdf_sections(figure_width_mm)
            .into_iter()
            .fold(builder, PdfBuilder::add_section)
    }
}

fn render_document(builder: PdfBuilder) -> Result<RenderedPdf, ReportError> {
    #[cfg(feature = "bookmarks")]
    let rendered = builder.render_with_bookmarks()?;
    #[cfg(not(feature = "bookmarks"))]
    let rendered = builder.render()?;
    Ok(rendered)
}

/// Writes rendered bytes to `output_dir`, replacing any earlier report of the same name.
fn write_report(output_dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ReportError> {
    let path = output_dir.join(file_name);
    fs::create_dir_all(output_dir)
        .and_then(|_| fs::write(&path, bytes))
        .map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

/// Lays out, renders and writes the report, returning the path of the written file.
pub fn assemble_report(
    product: &str,
    table: &LciTable,
    charts: &[ChartArtifact],
    narrative: &Narrative,
    config: &ReportConfig,
) -> Result<PathBuf, ReportError> {
    let document = layout_report(product, table, charts, narrative, config.report_date())?;
    let rendered = render_document(document.to_pdf_builder(config.figure_width_mm()))?;
    let path = write_report(config.output_dir(), &document.file_name(), &rendered.bytes)?;

    info!(
        "Wrote {} ({} bytes, sections start on pages {:?})",
        path.display(),
        rendered.bytes.len(),
        rendered.section_pages
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartRenderer;
    use crate::lci::{generate_lci_data, LciRecord, LifeCycleStage};
    use crate::narrative::generate_narrative;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).expect("valid date")
    }

    fn layout(product: &str) -> ReportDocument {
        let table = generate_lci_data(&mut StdRng::seed_from_u64(11));
        let charts = ChartRenderer::new("charts").planned_artifacts();
        layout_report(product, &table, &charts, &generate_narrative(product), date())
            .expect("layout")
    }

    const EXPECTED_TITLES: [&str; 11] = [
        "1. Introduction",
        "2. Goal and Scope",
        "3. Functional Unit",
        "4. System Boundary",
        "5. Inventory Analysis",
        "6. Life Cycle Impact Assessment (LCIA)",
        "7. Interpretation",
        "8. Assumptions and Limitations",
        "9. Recommendations",
        "Appendix A: Glossary",
        "Appendix B: References",
    ];

    #[test]
    fn sections_follow_fixed_order_for_any_product() {
        for product in ["Electric Toothbrush", "", "Kettle/2000 <β> & \"Pro\""] {
            let document = layout(product);
            let titles: Vec<_> = document.sections.iter().map(|s| s.title.as_str()).collect();
            assert_eq!(titles, EXPECTED_TITLES, "product {product:?}");
            assert_eq!(document.data_table.rows().len(), 4);
        }
    }

    #[test]
    fn title_and_file_name_use_product() {
        let document = layout("Electric Toothbrush");
        assert!(document.title.contains("LCA Report for: Electric Toothbrush"));
        assert_eq!(
            document.file_name(),
            "LCA_Report_Visual_Electric_Toothbrush.pdf"
        );
    }

    #[test]
    fn empty_product_is_substituted_verbatim() {
        let document = layout("");
        assert_eq!(document.title, "LCA Report for: ");
        assert_eq!(document.file_name(), "LCA_Report_Visual_.pdf");
        assert_eq!(
            document.sections[2].paragraphs,
            vec!["1  used over an average 3-year lifespan.".to_string()]
        );
    }

    #[test]
    fn figures_only_in_impact_assessment_in_chart_order() {
        let charts = ChartRenderer::new("charts").planned_artifacts();
        let document = layout("Kettle");

        for section in &document.sections {
            if section.kind == SectionKind::ChartGallery {
                assert_eq!(section.title, "6. Life Cycle Impact Assessment (LCIA)");
                let paths: Vec<_> = section.figures.iter().map(|f| f.path.clone()).collect();
                let expected: Vec<_> = charts.iter().map(|c| c.path.clone()).collect();
                assert_eq!(paths, expected);
                assert_eq!(section.figures[0].caption, "Bar energy use (mj)");
            } else {
                assert!(section.figures.is_empty(), "{}", section.title);
            }
        }
    }

    #[test]
    fn appendices_use_secondary_headings() {
        let document = layout("Kettle");
        let levels: Vec<_> = document.sections.iter().map(|s| s.level).collect();
        assert!(levels[..9].iter().all(|l| *l == HeadingLevel::Primary));
        assert!(levels[9..].iter().all(|l| *l == HeadingLevel::Secondary));
        assert_eq!(document.sections[9].paragraphs.len(), 4);
        assert_eq!(document.sections[10].paragraphs.len(), 5);
    }

    #[test]
    fn narrative_sections_carry_narrative_text() {
        let narrative = generate_narrative("Kettle");
        let document = layout("Kettle");
        assert_eq!(document.sections[6].paragraphs, vec![narrative.interpretation]);
        assert_eq!(document.sections[8].paragraphs, vec![narrative.recommendations]);
        assert_eq!(document.executive_summary, narrative.executive_summary);
    }

    #[test]
    fn data_table_rounds_values() {
        let table = LciTable::from_records(vec![LciRecord {
            stage: LifeCycleStage::Materials,
            energy_mj: 7.4567,
            ghg_kg_co2_eq: 5.0,
            water_l: 20.125,
        }]);
        let block = data_table_block(&table).expect("table");
        assert_eq!(block.header()[0], "Life Cycle Stage");
        assert_eq!(block.rows()[0][1], "7.46");
        assert_eq!(block.rows()[0][2], "5.00");
    }

    #[test]
    fn pdf_sections_wrap_body_with_summary_and_table() {
        let document = layout("Kettle");
        let sections = document.pdf_sections(139.7);
        assert_eq!(sections.len(), 13);
        assert_eq!(sections[0].title(), EXECUTIVE_SUMMARY_TITLE);
        assert_eq!(sections[12].title(), DATA_TABLE_TITLE);
        assert!(matches!(sections[12].blocks(), [Block::Table(_)]));

        for section in &sections[..12] {
            assert!(matches!(section.blocks().last(), Some(Block::PageBreak)));
        }

        let toc = document.toc_entries();
        let titles: Vec<_> = sections.iter().map(Section::title).collect();
        assert_eq!(toc, titles);

        let images = sections[6]
            .blocks()
            .iter()
            .filter(|block| matches!(block, Block::Image(_)))
            .count();
        assert_eq!(images, 9);
    }
}
