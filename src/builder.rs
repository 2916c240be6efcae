//! Document construction on top of `genpdf`.
//!
//! [`PdfBuilder`] collects a [`Cover`], an optional printed table of contents, and a list of
//! [`Section`]s, then renders them into PDF bytes.  Section headings are wrapped in
//! [`PageAnchor`]s so the page each section starts on is reported back in [`RenderedPdf`].

use std::fmt;

use genpdf::elements::{Break, PageBreak, Paragraph};
use genpdf::error::{Error, ErrorKind};
use genpdf::style::{Style, StyledString};
use genpdf::{Alignment, Element, Margins, Mm, PageDecorator, Position};
use log::debug;

use crate::elements::{self, CaptionedImage, PageAnchor, PageTracker};
use crate::fonts;
use crate::model::{
    Block, Cover, HeadingLevel, HorizontalAlignment, ImageBlock, RichParagraph, Section,
};

#[cfg(feature = "bookmarks")]
use crate::bookmarks::{self, BookmarkError};

const TITLE_FONT_SIZE: u8 = 24;
const SUBTITLE_FONT_SIZE: u8 = 14;
const BODY_FONT_SIZE: u8 = 11;
const TOC_INDENT_MM: i32 = 6;

type ElementFactory = dyn Fn(usize) -> Box<dyn Element>;

/// Errors produced while turning the content model into PDF bytes.
#[derive(Debug)]
pub enum PdfBuildError {
    /// No usable font family could be loaded.
    FontLoad(Error),
    /// A block could not be converted into a `genpdf` element.
    Element {
        /// Title of the section containing the block.
        section: String,
        source: Error,
    },
    /// `genpdf` failed while laying out or writing the document.
    Render(Error),
    /// The outline could not be injected into the rendered bytes.
    #[cfg(feature = "bookmarks")]
    Bookmarks(BookmarkError),
}

impl fmt::Display for PdfBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FontLoad(_) => write!(f, "Failed to load fonts for the document"),
            Self::Element { section, .. } => {
                write!(f, "Failed to build content of section '{}'", section)
            }
            Self::Render(_) => write!(f, "Failed to render the PDF document"),
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(_) => write!(f, "Failed to add bookmarks to the PDF document"),
        }
    }
}

impl std::error::Error for PdfBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FontLoad(err) | Self::Render(err) => Some(err),
            Self::Element { source, .. } => Some(source),
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(err) => Some(err),
        }
    }
}

#[cfg(feature = "bookmarks")]
impl From<BookmarkError> for PdfBuildError {
    fn from(err: BookmarkError) -> Self {
        Self::Bookmarks(err)
    }
}

/// Output of a render: the PDF bytes and the first page of every section.
#[derive(Clone, Debug)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    /// One-based page per section, in section order.
    pub section_pages: Vec<Option<usize>>,
}

/// Per-page footer callback with a fixed reserved height.
pub struct FooterSpec {
    height: Mm,
    factory: Box<ElementFactory>,
}

impl FooterSpec {
    pub fn new<F, E>(height: impl Into<Mm>, factory: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        Self {
            height: height.into(),
            factory: Box::new(move |page| Box::new(factory(page)) as Box<dyn Element>),
        }
    }
}

/// Collects document content and renders it to PDF.
pub struct PdfBuilder {
    title: Option<String>,
    margins: Margins,
    header: Option<Box<ElementFactory>>,
    footer: Option<FooterSpec>,
    cover: Option<Cover>,
    printed_toc: bool,
    toc_title: Option<String>,
    sections: Vec<Section>,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self {
            title: None,
            margins: Margins::trbl(15, 20, 15, 20),
            header: None,
            footer: None,
            cover: None,
            printed_toc: false,
            toc_title: None,
            sections: Vec::new(),
        }
    }
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document title stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Configures a header callback invoked with the one-based page number.
    pub fn with_header<F, E>(mut self, header: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        self.header = Some(Box::new(move |page| {
            Box::new(header(page)) as Box<dyn Element>
        }));
        self
    }

    /// Configures a footer callback rendered into a reserved strip at the bottom of each page.
    pub fn with_footer<F, E>(mut self, height: impl Into<Mm>, footer: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        self.footer = Some(FooterSpec::new(height, footer));
        self
    }

    pub fn with_cover(mut self, cover: Cover) -> Self {
        self.cover = Some(cover);
        self
    }

    /// Prints a list of section titles after the cover.
    pub fn include_printed_toc(mut self, include: bool) -> Self {
        self.printed_toc = include;
        self
    }

    pub fn with_toc_title(mut self, title: Option<String>) -> Self {
        self.toc_title = title;
        self
    }

    pub fn add_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Renders the document.
    pub fn render(self) -> Result<RenderedPdf, PdfBuildError> {
        self.render_parts().map(|(rendered, _)| rendered)
    }

    /// Renders the document and adds one outline entry per section.
    #[cfg(feature = "bookmarks")]
    pub fn render_with_bookmarks(self) -> Result<RenderedPdf, PdfBuildError> {
        let (rendered, sections) = self.render_parts()?;
        let bytes = bookmarks::apply_section_bookmarks(
            &rendered.bytes,
            &sections,
            &rendered.section_pages,
        )?;
        Ok(RenderedPdf {
            bytes,
            section_pages: rendered.section_pages,
        })
    }

    fn render_parts(self) -> Result<(RenderedPdf, Vec<Section>), PdfBuildError> {
        let family = fonts::default_font_family().map_err(PdfBuildError::FontLoad)?;
        let mut document = genpdf::Document::new(family);
        document.set_font_size(BODY_FONT_SIZE);
        document.set_line_spacing(1.25);
        if let Some(title) = &self.title {
            document.set_title(title.clone());
        }

        let tracker = PageTracker::new();
        document.set_page_decorator(TrackingPageDecorator {
            tracker: tracker.clone(),
            margins: self.margins,
            header: self.header,
            footer: self.footer,
        });

        if let Some(cover) = &self.cover {
            push_cover(&mut document, cover)?;
        }

        if self.printed_toc && !self.sections.is_empty() {
            push_toc(&mut document, self.toc_title.as_deref(), &self.sections);
        }

        for section in &self.sections {
            push_section(&mut document, section, &tracker)?;
        }

        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(PdfBuildError::Render)?;

        let section_pages = tracker.anchor_pages();
        debug!(
            "Rendered {} bytes, {} sections starting on pages {:?}",
            bytes.len(),
            self.sections.len(),
            section_pages
        );

        Ok((
            RenderedPdf {
                bytes,
                section_pages,
            },
            self.sections,
        ))
    }
}

fn to_alignment(alignment: HorizontalAlignment) -> Alignment {
    match alignment {
        HorizontalAlignment::Left => Alignment::Left,
        HorizontalAlignment::Right => Alignment::Right,
    }
}

fn to_paragraph(paragraph: &RichParagraph) -> Paragraph {
    let mut element = Paragraph::default();
    for span in paragraph.spans() {
        element.push(span.to_styled_string());
    }
    element.set_alignment(to_alignment(paragraph.alignment()));
    element
}

fn to_figure(block: &ImageBlock) -> Result<CaptionedImage, Error> {
    let caption = block.caption().map(to_paragraph).unwrap_or_default();
    let figure = CaptionedImage::from_path(block.path(), caption)?;
    Ok(figure.with_width(block.width_mm().map(elements::mm_from_f64)))
}

fn push_block(document: &mut genpdf::Document, block: &Block) -> Result<(), Error> {
    match block {
        Block::Paragraph(paragraph) => {
            document.push(to_paragraph(paragraph));
            document.push(Break::new(0.5));
        }
        Block::Image(image) => {
            document.push(to_figure(image)?);
            document.push(Break::new(1));
        }
        Block::Table(table) => {
            document.push(elements::grid_table(table)?);
            document.push(Break::new(1));
        }
        Block::PageBreak => document.push(PageBreak::new()),
    }
    Ok(())
}

fn push_cover(document: &mut genpdf::Document, cover: &Cover) -> Result<(), PdfBuildError> {
    document.push(
        Paragraph::new(cover.title().to_string())
            .styled(Style::new().bold().with_font_size(TITLE_FONT_SIZE)),
    );
    if let Some(subtitle) = cover.subtitle() {
        document.push(
            Paragraph::new(subtitle.to_string())
                .styled(Style::new().with_font_size(SUBTITLE_FONT_SIZE)),
        );
    }
    document.push(Break::new(1));

    for block in cover.blocks() {
        push_block(document, block).map_err(|source| PdfBuildError::Element {
            section: cover.title().to_string(),
            source,
        })?;
    }

    if !matches!(cover.blocks().last(), Some(Block::PageBreak)) {
        document.push(PageBreak::new());
    }
    Ok(())
}

fn push_toc(document: &mut genpdf::Document, title: Option<&str>, sections: &[Section]) {
    document.push(elements::heading(
        title.unwrap_or("Table of Contents"),
        HeadingLevel::Primary,
    ));
    document.push(Break::new(0.5));

    for section in sections {
        let entry = Paragraph::new(StyledString::new(section.title().to_string(), Style::new()));
        match section.level() {
            HeadingLevel::Primary => document.push(entry),
            HeadingLevel::Secondary => {
                document.push(entry.padded(Margins::trbl(0, 0, 0, TOC_INDENT_MM)))
            }
        }
    }
    document.push(PageBreak::new());
}

fn push_section(
    document: &mut genpdf::Document,
    section: &Section,
    tracker: &PageTracker,
) -> Result<(), PdfBuildError> {
    document.push(PageAnchor::new(
        elements::heading(section.title(), section.level()),
        tracker,
    ));
    document.push(Break::new(0.5));

    for block in section.blocks() {
        push_block(document, block).map_err(|source| PdfBuildError::Element {
            section: section.title().to_string(),
            source,
        })?;
    }
    Ok(())
}

struct TrackingPageDecorator {
    tracker: PageTracker,
    margins: Margins,
    header: Option<Box<ElementFactory>>,
    footer: Option<FooterSpec>,
}

impl PageDecorator for TrackingPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        let page = self.tracker.start_page();
        area.add_margins(self.margins);

        if let Some(header) = &self.header {
            let mut element = header(page);
            let result = element.render(context, area.clone(), style)?;
            area.add_offset(Position::new(0, result.size.height));
            area.add_offset(Position::new(0, 4));
        }

        if let Some(footer) = &self.footer {
            let available = area.size().height;
            if footer.height > available {
                return Err(Error::new(
                    "Footer height exceeds available space",
                    ErrorKind::InvalidData,
                ));
            }

            let mut footer_area = area.clone();
            footer_area.add_offset(Position::new(0, available - footer.height));
            let mut element = (footer.factory)(page);
            let result = element.render(context, footer_area, style)?;
            if result.has_more {
                return Err(Error::new(
                    "Footer element does not fit into the reserved space",
                    ErrorKind::PageSizeExceeded,
                ));
            }

            area.set_height(available - footer.height);
        }

        Ok(area)
    }
}
