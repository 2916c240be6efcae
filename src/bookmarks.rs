//! PDF outline (bookmark) injection built on `lopdf`.
//!
//! Every section that was rendered gets one top-level outline item pointing at the first page it
//! appears on.  Sections without a recorded page are skipped.

use std::fmt;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::model::Section;

/// Errors raised while adding an outline to rendered PDF bytes.
#[derive(Debug)]
pub enum BookmarkError {
    /// `lopdf` could not parse or serialize the document.
    Pdf(lopdf::Error),
    /// The trailer has no usable `/Root` catalog dictionary.
    MissingCatalog,
    /// A section points at a page the document does not have.
    MissingPage { section: String, page_number: usize },
}

impl From<lopdf::Error> for BookmarkError {
    fn from(err: lopdf::Error) -> Self {
        Self::Pdf(err)
    }
}

impl From<std::io::Error> for BookmarkError {
    fn from(err: std::io::Error) -> Self {
        Self::Pdf(err.into())
    }
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf(err) => write!(f, "PDF processing failed: {err}"),
            Self::MissingCatalog => write!(f, "PDF catalog dictionary is missing"),
            Self::MissingPage {
                section,
                page_number,
            } => write!(
                f,
                "section '{section}' refers to page {page_number}, which does not exist"
            ),
        }
    }
}

impl std::error::Error for BookmarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pdf(err) => Some(err),
            Self::MissingCatalog | Self::MissingPage { .. } => None,
        }
    }
}

struct OutlineItem<'a> {
    id: ObjectId,
    page: ObjectId,
    section: &'a Section,
}

/// Returns a copy of `pdf_bytes` with one outline item per rendered section.
pub fn apply_section_bookmarks(
    pdf_bytes: &[u8],
    sections: &[Section],
    section_pages: &[Option<usize>],
) -> Result<Vec<u8>, BookmarkError> {
    let mut document = Document::load_mem(pdf_bytes)?;
    let pages = document.get_pages();

    let mut items = Vec::new();
    for (section, page_number) in sections
        .iter()
        .zip(section_pages)
        .filter_map(|(section, page)| page.map(|page| (section, page)))
    {
        let page = *pages
            .get(&(page_number as u32))
            .ok_or_else(|| BookmarkError::MissingPage {
                section: section.title().to_string(),
                page_number,
            })?;
        items.push(OutlineItem {
            id: document.new_object_id(),
            page,
            section,
        });
    }

    if items.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let root_id = document.new_object_id();
    for (index, item) in items.iter().enumerate() {
        let mut entry = Dictionary::new();
        entry.set("Title", Object::string_literal(item.section.title()));
        entry.set("Parent", Object::Reference(root_id));
        entry.set(
            "Dest",
            Object::Array(vec![Object::Reference(item.page), Object::Name(b"Fit".to_vec())]),
        );
        if let Some(name) = item.section.identifier() {
            entry.set("NM", Object::string_literal(name));
        }
        if let Some(prev) = index.checked_sub(1).and_then(|i| items.get(i)) {
            entry.set("Prev", Object::Reference(prev.id));
        }
        if let Some(next) = items.get(index + 1) {
            entry.set("Next", Object::Reference(next.id));
        }
        document.objects.insert(item.id, Object::Dictionary(entry));
    }

    let mut root = Dictionary::new();
    root.set("Type", Object::Name(b"Outlines".to_vec()));
    root.set("Count", Object::Integer(items.len() as i64));
    root.set("First", Object::Reference(items[0].id));
    root.set("Last", Object::Reference(items[items.len() - 1].id));
    document.objects.insert(root_id, Object::Dictionary(root));

    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;
    document
        .objects
        .get_mut(&catalog_id)
        .and_then(|object| object.as_dict_mut().ok())
        .ok_or(BookmarkError::MissingCatalog)?
        .set("Outlines", Object::Reference(root_id));

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}
