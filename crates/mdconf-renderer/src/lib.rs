//! Markdown to Confluence storage format rendering for mdconf.
//!
//! [`MarkdownRenderer`] walks `pulldown-cmark` events and emits XHTML storage
//! markup: code blocks become `code` macros, blockquotes `info` panels and
//! images `ac:image` elements (local ones are collected as attachments).
//! [`layout`] wraps the result in a sidebar with table of contents and
//! authors.
//!
//! [`ConfluenceRenderer`] combines both behind the
//! [`MarkupRenderer`](mdconf_sync::MarkupRenderer) seam used by the syncer.
//!
//! # Example
//!
//! ```
//! use mdconf_renderer::MarkdownRenderer;
//!
//! let result = MarkdownRenderer::new().render_markdown("# Hello\n\n![x](img/x.png)");
//! assert!(result.has_headings);
//! assert_eq!(result.attachments.len(), 1);
//! ```

mod layout;
mod macros;
mod renderer;
mod state;

use mdconf_sync::{Author, MarkupRenderer, RenderedMarkup};

pub use layout::layout;
pub use renderer::{MarkdownRenderer, RenderResult, parser_options};
pub use state::escape_html;

/// Renders page bodies with the standard two-column layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfluenceRenderer;

impl MarkupRenderer for ConfluenceRenderer {
    fn render(&self, body: &str, authors: &[Author]) -> RenderedMarkup {
        let result = MarkdownRenderer::new().render_markdown(body);
        RenderedMarkup {
            markup: layout(&result.html, result.has_headings, authors),
            attachments: result.attachments,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_render_page() {
        let authors = [Author {
            identifier: "jdoe".to_owned(),
            account_id: Some("557058:abc".to_owned()),
            ..Author::default()
        }];
        let rendered = ConfluenceRenderer.render("## Setup\n\n![arch](arch.png)", &authors);

        assert_eq!(rendered.attachments, vec![PathBuf::from("arch.png")]);
        assert!(rendered.markup.starts_with(r#"<ac:structured-macro ac:name="column""#));
        assert!(rendered.markup.contains(r#"ac:name="toc""#));
        assert!(rendered.markup.contains(r#"ri:account-id="557058:abc""#));
        assert!(rendered.markup.contains("<h2>Setup</h2>"));
    }
}
