//! Data structures describing the logical content of a PDF document.
//!
//! These types mirror the building blocks later turned into [`genpdf::elements`], but carry no
//! rendering state.  Report content can therefore be assembled and checked in tests without
//! loading any font.

use std::path::{Path, PathBuf};

use crate::richtext::Span;

/// Horizontal placement of paragraphs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Right,
}

/// Rich text paragraph carrying inline styling and alignment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RichParagraph {
    spans: Vec<Span>,
    alignment: HorizontalAlignment,
}

impl RichParagraph {
    /// Creates a left-aligned paragraph from the provided spans.
    pub fn new(spans: impl Into<Vec<Span>>) -> Self {
        Self {
            spans: spans.into(),
            ..Self::default()
        }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    /// Sets the alignment and returns the updated paragraph.
    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// An image file with an optional caption and a target width in millimetres.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBlock {
    path: PathBuf,
    caption: Option<RichParagraph>,
    width_mm: Option<f64>,
}

impl ImageBlock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            caption: None,
            width_mm: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn caption(&self) -> Option<&RichParagraph> {
        self.caption.as_ref()
    }

    pub fn width_mm(&self) -> Option<f64> {
        self.width_mm
    }

    /// Places `caption` above the image.
    pub fn with_caption(mut self, caption: impl Into<Option<RichParagraph>>) -> Self {
        self.caption = caption.into();
        self
    }

    /// Scales the image to `width_mm` while keeping the aspect ratio.
    pub fn with_width_mm(mut self, width_mm: impl Into<Option<f64>>) -> Self {
        self.width_mm = width_mm.into();
        self
    }
}

/// A grid table with a bold header row.
///
/// Every row must have as many cells as the header; [`TableBlock::push_row`] enforces this.
#[derive(Clone, Debug, PartialEq)]
pub struct TableBlock {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Returned when a row does not match the header width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowWidthMismatch {
    pub expected: usize,
    pub actual: usize,
}

impl std::fmt::Display for RowWidthMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "table row has {} cells but the header has {}",
            self.actual, self.expected
        )
    }
}

impl std::error::Error for RowWidthMismatch {}

impl TableBlock {
    /// Creates an empty table with the given header cells.
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Appends a row of cells.
    pub fn push_row<I, S>(&mut self, cells: I) -> Result<(), RowWidthMismatch>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = cells.into_iter().map(Into::into).collect();
        if row.len() != self.header.len() {
            return Err(RowWidthMismatch {
                expected: self.header.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }
}

/// Content blocks that make up sections and the cover.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Paragraph(RichParagraph),
    Image(ImageBlock),
    Table(TableBlock),
    PageBreak,
}

impl Block {
    pub fn paragraph(spans: impl Into<Vec<Span>>) -> Self {
        Self::Paragraph(RichParagraph::new(spans))
    }

    /// A paragraph with a single unstyled span.
    pub fn text(text: impl Into<String>) -> Self {
        Self::paragraph(vec![Span::new(text)])
    }
}

/// Title page content: a title, an optional subtitle, and free-form blocks.
#[derive(Clone, Debug, PartialEq)]
pub struct Cover {
    title: String,
    subtitle: Option<String>,
    blocks: Vec<Block>,
}

impl Cover {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            blocks: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }
}

/// Heading depth of a section title.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeadingLevel {
    /// Top-level numbered section.
    #[default]
    Primary,
    /// Appendix or subsection.
    Secondary,
}

impl HeadingLevel {
    /// Font size used for the heading in points.
    pub fn font_size(self) -> u8 {
        match self {
            HeadingLevel::Primary => 16,
            HeadingLevel::Secondary => 13,
        }
    }
}

/// A titled run of blocks.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    identifier: Option<String>,
    title: String,
    level: HeadingLevel,
    blocks: Vec<Block>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            identifier: None,
            title: title.into(),
            level: HeadingLevel::Primary,
            blocks: Vec::new(),
        }
    }

    /// Identifier used for bookmark names.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn level(&self) -> HeadingLevel {
        self.level
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn builder(title: impl Into<String>) -> SectionBuilder {
        SectionBuilder::new(title)
    }
}

/// Builder for [`Section`] values that can close the section with a page break.
#[derive(Clone, Debug, Default)]
pub struct SectionBuilder {
    identifier: Option<String>,
    title: String,
    level: HeadingLevel,
    blocks: Vec<Block>,
    end_with_page_break: bool,
}

impl SectionBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Requests a trailing page break so the next section starts on a fresh page.
    pub fn end_with_page_break(mut self, end_with_page_break: bool) -> Self {
        self.end_with_page_break = end_with_page_break;
        self
    }

    pub fn identifier(mut self, identifier: impl Into<Option<String>>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn level(mut self, level: HeadingLevel) -> Self {
        self.level = level;
        self
    }

    pub fn push_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn extend_blocks<I>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = Block>,
    {
        self.blocks.extend(blocks);
        self
    }

    /// Builds the section, appending a single page break when requested.
    pub fn build(mut self) -> Section {
        if self.end_with_page_break && !matches!(self.blocks.last(), Some(Block::PageBreak)) {
            self.blocks.push(Block::PageBreak);
        }

        Section {
            identifier: self.identifier,
            title: self.title,
            level: self.level,
            blocks: self.blocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Block, HeadingLevel, Section, TableBlock};

    #[test]
    fn builder_appends_page_break() {
        let section = Section::builder("1. Introduction")
            .end_with_page_break(true)
            .push_block(Block::text("Intro"))
            .build();

        assert!(matches!(section.blocks().last(), Some(Block::PageBreak)));
        assert_eq!(section.blocks().len(), 2);
    }

    #[test]
    fn builder_does_not_duplicate_page_break() {
        let section = Section::builder("1. Introduction")
            .end_with_page_break(true)
            .push_block(Block::PageBreak)
            .build();

        assert_eq!(section.blocks().len(), 1);
    }

    #[test]
    fn builder_keeps_level_and_identifier() {
        let section = Section::builder("Appendix A: Glossary")
            .level(HeadingLevel::Secondary)
            .identifier(Some("appendix-a".to_string()))
            .build();

        assert_eq!(section.level(), HeadingLevel::Secondary);
        assert_eq!(section.identifier(), Some("appendix-a"));
    }

    #[test]
    fn table_rejects_rows_of_wrong_width() {
        let mut table = TableBlock::new(["Stage", "Value"]);
        table.push_row(["Materials", "1.00"]).expect("row fits");

        let err = table.push_row(["Materials"]).unwrap_err();
        assert_eq!(err.expected, 2);
        assert_eq!(err.actual, 1);
        assert_eq!(table.rows().len(), 1);
    }
}
