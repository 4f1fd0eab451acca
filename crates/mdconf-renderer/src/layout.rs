//! Two-column page layout.
//!
//! ```text
//! ------------------------------------------
//! |             |                          |
//! | Sidebar     |         Content          |
//! | (30% width) |      (800px width)       |
//! |             |                          |
//! ------------------------------------------
//! ```
//!
//! The sidebar holds a table of contents (only when the body has headings)
//! and the page authors. Confluence shows pages as published by the service
//! account, so the authors section is the only attribution readers see.

use mdconf_sync::Author;

use crate::macros;

const SIDEBAR_WIDTH: &str = "30%";
const CONTENT_WIDTH: &str = "800px";

/// Wrap rendered content in the sidebar and content columns.
#[must_use]
pub fn layout(content: &str, has_headings: bool, authors: &[Author]) -> String {
    let mut sidebar = String::new();
    if has_headings {
        macros::toc(&mut sidebar);
    }
    render_authors(authors, &mut sidebar);

    let mut page = String::with_capacity(content.len() + sidebar.len() + 512);
    macros::column(SIDEBAR_WIDTH, &sidebar, &mut page);
    macros::column(CONTENT_WIDTH, content, &mut page);
    page
}

fn render_authors(authors: &[Author], out: &mut String) {
    out.push_str("<h1>Authors</h1><p>");
    let mut first = true;
    for author in authors {
        let mut entry = String::new();
        if macros::author(author, &mut entry) {
            if !first {
                out.push_str("<br />");
            }
            out.push_str(&entry);
            first = false;
        }
    }
    out.push_str("</p>");
}
