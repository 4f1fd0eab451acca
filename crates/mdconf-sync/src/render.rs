//! Markup rendering seam.

use std::path::PathBuf;

use crate::remote::Author;

/// Storage markup for one page plus the local files it references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedMarkup {
    /// Page body in the wiki's storage format.
    pub markup: String,
    /// Local file references (as written in the body) to upload as attachments.
    pub attachments: Vec<PathBuf>,
}

/// Converts a Markdown body into wiki storage markup.
pub trait MarkupRenderer {
    /// Render `body`, crediting `authors` on the page.
    fn render(&self, body: &str, authors: &[Author]) -> RenderedMarkup;
}
