//! Markdown to Confluence storage format renderer.

use std::fmt::Write;
use std::path::PathBuf;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::macros;
use crate::state::{Capture, TableState, escape_html};

/// Result of rendering markdown.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderResult {
    /// Rendered XHTML content.
    pub html: String,
    /// Whether the body contains any heading.
    pub has_headings: bool,
    /// Local image sources, in order of first use.
    pub attachments: Vec<PathBuf>,
}

/// Parser options: `CommonMark` plus GFM tables, strikethrough and task lists.
#[must_use]
pub fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Markdown renderer producing Confluence storage format.
///
/// Handles common elements (tables, lists, inline formatting) directly and
/// delegates Confluence-specific elements (code blocks, blockquotes, images)
/// to storage macros. Local images are collected as attachments.
pub struct MarkdownRenderer {
    output: String,
    capture: Capture,
    table: TableState,
    has_headings: bool,
    attachments: Vec<PathBuf>,
}

impl MarkdownRenderer {
    /// Create a new renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            capture: Capture::None,
            table: TableState::default(),
            has_headings: false,
            attachments: Vec::new(),
        }
    }

    /// Parse and render a Markdown string.
    pub fn render_markdown(self, markdown: &str) -> RenderResult {
        self.render(Parser::new_ext(markdown, parser_options()))
    }

    /// Render markdown events and return the result.
    pub fn render<'a, I>(mut self, events: I) -> RenderResult
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }

        RenderResult {
            html: self.output,
            has_headings: self.has_headings,
            attachments: self.attachments,
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.raw_html(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.output.push_str("<br />"),
            Event::Rule => self.output.push_str("<hr />"),
            Event::TaskListMarker(checked) => {
                self.output.push_str(if checked { "[x] " } else { "[ ] " });
            }
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not supported
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                self.has_headings = true;
                write!(self.output, "<{level}>").unwrap();
            }
            Tag::BlockQuote(_) => macros::info_start(&mut self.output),
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(ref info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.capture = Capture::Code {
                    language,
                    text: String::new(),
                };
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_row(true);
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row(false);
                self.output.push_str("<tr>");
            }
            Tag::TableCell => self.output.push_str(&self.table.open_cell()),
            Tag::Emphasis => self.output.push_str("<em>"),
            Tag::Strong => self.output.push_str("<strong>"),
            Tag::Strikethrough => self.output.push_str("<s>"),
            Tag::Link { dest_url, .. } => {
                write!(self.output, r#"<a href="{}">"#, escape_html(&dest_url)).unwrap();
            }
            Tag::Image { dest_url, .. } => {
                // Rendered in end_tag; alt text in between is dropped
                self.capture = Capture::Image {
                    src: dest_url.into_string(),
                };
            }
            Tag::Superscript => self.output.push_str("<sup>"),
            Tag::Subscript => self.output.push_str("<sub>"),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(level) => write!(self.output, "</{level}>").unwrap(),
            TagEnd::BlockQuote(_) => macros::info_end(&mut self.output),
            TagEnd::CodeBlock => {
                if let Capture::Code { language, text } = self.capture.finish() {
                    macros::code_block(language.as_deref(), &text, &mut self.output);
                }
            }
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::Image => {
                if let Capture::Image { src } = self.capture.finish() {
                    if !macros::is_external(&src) {
                        self.add_attachment(&src);
                    }
                    macros::image(&src, &mut self.output);
                }
            }
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => self.output.push_str("</tr></thead><tbody>"),
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                let close = self.table.close_cell();
                self.output.push_str(&close);
            }
            TagEnd::Emphasis => self.output.push_str("</em>"),
            TagEnd::Strong => self.output.push_str("</strong>"),
            TagEnd::Strikethrough => self.output.push_str("</s>"),
            TagEnd::Link => self.output.push_str("</a>"),
            TagEnd::Superscript => self.output.push_str("</sup>"),
            TagEnd::Subscript => self.output.push_str("</sub>"),
        }
    }

    fn add_attachment(&mut self, src: &str) {
        let path = PathBuf::from(src);
        if !self.attachments.contains(&path) {
            self.attachments.push(path);
        }
    }

    fn text(&mut self, text: &str) {
        if !self.capture.absorb(text) {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if !self.capture.is_image() {
            write!(self.output, "<code>{}</code>", escape_html(code)).unwrap();
        }
    }

    fn raw_html(&mut self, html: &str) {
        self.output.push_str(html);
    }

    fn soft_break(&mut self) {
        if !self.capture.is_active() {
            self.output.push('\n');
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn render(markdown: &str) -> RenderResult {
        MarkdownRenderer::new().render_markdown(markdown)
    }

    #[test]
    fn test_basic_paragraph() {
        let result = render("Hello, *world* & **friends**!");
        assert_eq!(
            result.html,
            "<p>Hello, <em>world</em> &amp; <strong>friends</strong>!</p>"
        );
        assert!(!result.has_headings);
    }

    #[test]
    fn test_heading_is_detected() {
        let result = render("## Section Title\n\ntext");
        assert_eq!(result.html, "<h2>Section Title</h2><p>text</p>");
        assert!(result.has_headings);
    }

    #[test]
    fn test_fenced_code_block() {
        let result = render("```rust ignore\nfn main() {}\n```");
        assert_eq!(
            result.html,
            r#"<ac:structured-macro ac:name="code" ac:schema-version="1"><ac:parameter ac:name="language">rust</ac:parameter><ac:plain-text-body><![CDATA[fn main() {}
]]></ac:plain-text-body></ac:structured-macro>"#
        );
    }

    #[test]
    fn test_code_is_not_escaped_in_cdata() {
        let result = render("    if a < b && c {}\n");
        assert!(result.html.contains("<![CDATA[if a < b && c {}\n]]>"));
        assert!(!result.html.contains(r#"ac:name="language""#));
    }

    #[test]
    fn test_blockquote_becomes_info_panel() {
        let result = render("> Note");
        assert_eq!(
            result.html,
            r#"<ac:structured-macro ac:name="info" ac:schema-version="1"><ac:rich-text-body><p>Note</p></ac:rich-text-body></ac:structured-macro>"#
        );
    }

    #[test]
    fn test_local_images_are_attachments() {
        let result = render(
            "![Diagram](img/diagram.png) ![again](img/diagram.png) ![remote](https://example.com/x.png)",
        );
        assert_eq!(result.attachments, vec![PathBuf::from("img/diagram.png")]);
        assert!(result.html.contains(r#"<ri:attachment ri:filename="diagram.png" />"#));
        assert!(result.html.contains(r#"<ri:url ri:value="https://example.com/x.png" />"#));
        assert!(!result.html.contains("Diagram"));
    }

    #[test]
    fn test_table_with_alignment() {
        let result = render("| A | B |\n|---|--:|\n| 1 | 2 |");
        assert_eq!(
            result.html,
            r#"<table><thead><tr><th>A</th><th style="text-align:right">B</th></tr></thead><tbody><tr><td>1</td><td style="text-align:right">2</td></tr></tbody></table>"#
        );
    }

    #[test]
    fn test_lists_and_tasks() {
        let result = render("3. three\n4. four\n\n- [x] done\n- [ ] todo");
        assert!(result.html.starts_with(r#"<ol start="3"><li>three</li>"#));
        assert!(result.html.contains("<li>[x] done</li>"));
        assert!(result.html.contains("<li>[ ] todo</li>"));
    }

    #[test]
    fn test_strikethrough_link_and_breaks() {
        let result = render("~~old~~ [site](https://a.example/?q=1&r=2)  \nnext\n\n---");
        assert_eq!(
            result.html,
            r#"<p><s>old</s> <a href="https://a.example/?q=1&amp;r=2">site</a><br />next</p><hr />"#
        );
    }
}
