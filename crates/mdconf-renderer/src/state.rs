//! Context the renderer carries between parser events.

use pulldown_cmark::Alignment;

/// Text the renderer diverts away from the output.
///
/// Code blocks and images cannot nest, so one slot covers both.
#[derive(Debug, Default, PartialEq, Eq)]
pub enum Capture {
    #[default]
    None,
    /// Code block text, emitted raw inside CDATA once the block closes.
    Code {
        language: Option<String>,
        text: String,
    },
    /// Image alt text is swallowed; storage images carry none.
    Image { src: String },
}

impl Capture {
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }

    /// Take in `text` if something is being captured.
    ///
    /// Returns `false` when the text belongs in the output.
    pub fn absorb(&mut self, text: &str) -> bool {
        match self {
            Self::None => false,
            Self::Code { text: buffer, .. } => {
                buffer.push_str(text);
                true
            }
            Self::Image { .. } => true,
        }
    }

    /// Stop capturing and hand back what was captured.
    pub fn finish(&mut self) -> Self {
        std::mem::take(self)
    }
}

/// Column alignment and header tracking for the current table.
#[derive(Debug, Default)]
pub struct TableState {
    alignments: Vec<Alignment>,
    column: usize,
    in_head: bool,
}

impl TableState {
    pub fn start(&mut self, alignments: Vec<Alignment>) {
        *self = Self {
            alignments,
            ..Self::default()
        };
    }

    /// Begin a row; the header row renders `th` cells.
    pub fn start_row(&mut self, head: bool) {
        self.in_head = head;
        self.column = 0;
    }

    /// Opening tag for the current cell, with its alignment style.
    pub fn open_cell(&self) -> String {
        let style = match self.alignments.get(self.column) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        };
        format!("<{}{style}>", self.cell_tag())
    }

    /// Closing tag for the current cell; moves on to the next column.
    pub fn close_cell(&mut self) -> String {
        self.column += 1;
        format!("</{}>", self.cell_tag())
    }

    fn cell_tag(&self) -> &'static str {
        if self.in_head { "th" } else { "td" }
    }
}

/// Escape XML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_table_cells() {
        let mut table = TableState::default();
        table.start(vec![Alignment::None, Alignment::Right]);

        table.start_row(true);
        assert_eq!(table.open_cell(), "<th>");
        assert_eq!(table.close_cell(), "</th>");
        assert_eq!(table.open_cell(), r#"<th style="text-align:right">"#);
        assert_eq!(table.close_cell(), "</th>");

        table.start_row(false);
        assert_eq!(table.open_cell(), "<td>");
    }

    #[test]
    fn test_code_capture() {
        let mut capture = Capture::Code {
            language: Some("rust".to_owned()),
            text: String::new(),
        };
        assert!(capture.absorb("fn main() {}\n"));
        assert_eq!(
            capture.finish(),
            Capture::Code {
                language: Some("rust".to_owned()),
                text: "fn main() {}\n".to_owned(),
            }
        );
        assert!(!capture.is_active());
        assert!(!capture.absorb("text"));
    }

    #[test]
    fn test_image_capture_swallows_alt_text() {
        let mut capture = Capture::Image {
            src: "a.png".to_owned(),
        };
        assert!(capture.is_image());
        assert!(capture.absorb("alt"));
        assert_eq!(
            capture.finish(),
            Capture::Image {
                src: "a.png".to_owned()
            }
        );
    }
}
