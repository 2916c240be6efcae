//! Styled text fragments for report paragraphs.

use genpdf::style::{Style, StyledString};

/// Text with optional bold and italic emphasis.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    italic: bool,
}

impl Span {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Converts the span into a `genpdf` styled string for a paragraph.
    pub fn to_styled_string(&self) -> StyledString {
        let mut style = Style::new();
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        StyledString::new(self.text.clone(), style)
    }
}
