//! Element implementations built on top of `genpdf` primitives.
//!
//! This module adds figures with captions, grid tables, headings, and an anchor element that
//! records the page a section starts on.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use image::GenericImageView;

use genpdf::elements::{FrameCellDecorator, Image, Paragraph, StyledElement, TableLayout};
use genpdf::error::{Context as _, Error};
use genpdf::style::{Style, StyledString};
use genpdf::{render, Element, Margins, Mm, Position, RenderResult, Scale, Size};

use crate::model::{HeadingLevel, TableBlock};

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
const DEFAULT_CAPTION_SPACING_MM: f64 = 2.0;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Converts a width in inches to millimetres.
pub fn inches_to_mm(inches: f64) -> f64 {
    inches * MM_PER_INCH
}

fn estimated_image_size(image: &image::DynamicImage, dpi: f64) -> Size {
    let (px_width, px_height) = image.dimensions();
    let width_mm = MM_PER_INCH * (px_width as f64) / dpi;
    let height_mm = MM_PER_INCH * (px_height as f64) / dpi;
    Size::new(mm_from_f64(width_mm), mm_from_f64(height_mm))
}

/// Decodes the image file at `path`, guessing the format from its contents.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<image::DynamicImage, Error> {
    let path = path.as_ref();
    image::io::Reader::open(path)
        .with_context(|| format!("Failed to open image file {}", path.display()))?
        .with_guessed_format()
        .context("Unable to determine image format")?
        .decode()
        .with_context(|| format!("Failed to decode image file {}", path.display()))
}

fn image_from_dynamic(image: image::DynamicImage) -> Result<(Image, Size), Error> {
    let size = estimated_image_size(&image, DEFAULT_IMAGE_DPI);
    let image = Image::from_dynamic_image(image)?;
    Ok((image, size))
}

/// A figure: a caption paragraph followed by an image scaled to a requested width.
///
/// The figure is kept on one page.  If caption and image do not fit in the remaining area, the
/// element renders nothing and asks for a new page.
pub struct CaptionedImage {
    image: Image,
    caption: Paragraph,
    natural_size: Size,
    requested_width: Option<Mm>,
    spacing: Mm,
}

impl CaptionedImage {
    fn new(image: Image, caption: Paragraph, natural_size: Size) -> Self {
        Self {
            image,
            caption,
            natural_size,
            requested_width: None,
            spacing: mm_from_f64(DEFAULT_CAPTION_SPACING_MM),
        }
    }

    pub fn from_dynamic_image(
        image: image::DynamicImage,
        caption: Paragraph,
    ) -> Result<Self, Error> {
        let (image, size) = image_from_dynamic(image)?;
        Ok(Self::new(image, caption, size))
    }

    pub fn from_path(path: impl AsRef<Path>, caption: Paragraph) -> Result<Self, Error> {
        Self::from_dynamic_image(decode_image_from_path(path)?, caption)
    }

    /// Constrains the rendered width while preserving the aspect ratio.
    pub fn with_width(mut self, width: impl Into<Option<Mm>>) -> Self {
        self.requested_width = width.into();
        self
    }

    fn scale(&self) -> f64 {
        match self.requested_width {
            Some(width) => {
                let natural = mm_to_f64(self.natural_size.width);
                if natural > f64::EPSILON {
                    mm_to_f64(width) / natural
                } else {
                    1.0
                }
            }
            None => 1.0,
        }
    }

    fn scaled_height(&self) -> Mm {
        mm_from_f64(mm_to_f64(self.natural_size.height) * self.scale())
    }
}

impl Element for CaptionedImage {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let scale = self.scale();
        self.image.set_scale(Scale::new(scale, scale));

        let needed = style.line_height(&context.font_cache) + self.spacing + self.scaled_height();
        if needed > area.size().height {
            let mut result = RenderResult::default();
            result.has_more = true;
            return Ok(result);
        }

        let mut result = RenderResult::default();
        let caption_result = self.caption.render(context, area.clone(), style)?;
        result.size = result.size.stack_vertical(caption_result.size);
        result.size = result.size.stack_vertical(Size::new(0, self.spacing));
        area.add_offset(Position::new(0, caption_result.size.height + self.spacing));

        let image_result = self.image.render(context, area, style)?;
        result.size = result.size.stack_vertical(image_result.size);
        result.has_more = caption_result.has_more || image_result.has_more;

        Ok(result)
    }
}

/// Builds a bold heading paragraph for the given level.
pub fn heading(text: impl Into<String>, level: HeadingLevel) -> StyledElement<Paragraph> {
    Paragraph::new(text.into()).styled(Style::new().bold().with_font_size(level.font_size()))
}

/// Builds a grid table with framed cells and a bold header row.
pub fn grid_table(table: &TableBlock) -> Result<TableLayout, Error> {
    let mut layout = TableLayout::new(vec![1; table.column_count()]);
    layout.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let bold = Style::new().bold();
    let mut header = layout.row();
    for cell in table.header() {
        header.push_element(
            Paragraph::new(StyledString::new(cell.clone(), bold)).padded(cell_padding()),
        );
    }
    header.push()?;

    for cells in table.rows() {
        let mut row = layout.row();
        for cell in cells {
            row.push_element(Paragraph::new(cell.clone()).padded(cell_padding()));
        }
        row.push()?;
    }

    Ok(layout)
}

fn cell_padding() -> Margins {
    Margins::trbl(1, 2, 1, 2)
}

/// Shared record of the current page and of the pages anchors were first rendered on.
#[derive(Clone, Debug, Default)]
pub struct PageTracker {
    inner: Rc<RefCell<TrackerState>>,
}

#[derive(Debug, Default)]
struct TrackerState {
    current_page: usize,
    anchors: Vec<Option<usize>>,
}

impl PageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances to the next page; called by the page decorator.
    pub fn start_page(&self) -> usize {
        let mut state = self.inner.borrow_mut();
        state.current_page += 1;
        state.current_page
    }

    /// Reserves an anchor slot and returns its index.
    pub fn register_anchor(&self) -> usize {
        let mut state = self.inner.borrow_mut();
        state.anchors.push(None);
        state.anchors.len() - 1
    }

    fn mark(&self, slot: usize) {
        let mut state = self.inner.borrow_mut();
        let page = state.current_page;
        if let Some(entry @ None) = state.anchors.get_mut(slot) {
            *entry = Some(page);
        }
    }

    /// One-based page numbers per anchor, `None` for anchors that were never rendered.
    pub fn anchor_pages(&self) -> Vec<Option<usize>> {
        self.inner.borrow().anchors.clone()
    }
}

/// Wraps an element and records the page on which it first renders visible content.
pub struct PageAnchor<E> {
    inner: E,
    tracker: PageTracker,
    slot: usize,
}

impl<E: Element> PageAnchor<E> {
    pub fn new(inner: E, tracker: &PageTracker) -> Self {
        Self {
            inner,
            slot: tracker.register_anchor(),
            tracker: tracker.clone(),
        }
    }
}

impl<E: Element> Element for PageAnchor<E> {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let result = self.inner.render(context, area, style)?;
        if result.size.height > Mm::default() {
            self.tracker.mark(self.slot);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_records_first_page_only() {
        let tracker = PageTracker::new();
        let first = tracker.register_anchor();
        let second = tracker.register_anchor();

        tracker.start_page();
        tracker.mark(first);
        tracker.start_page();
        tracker.mark(first);

        assert_eq!(tracker.anchor_pages(), vec![Some(1), None]);
        tracker.mark(second);
        assert_eq!(tracker.anchor_pages(), vec![Some(1), Some(2)]);
    }

    #[test]
    fn inches_convert_to_millimetres() {
        assert!((inches_to_mm(5.5) - 139.7).abs() < 1e-9);
    }
}
