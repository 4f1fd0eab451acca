//! Front matter and body extraction.
//!
//! Documents open with a YAML block delimited by `---` lines:
//!
//! ```text
//! ---
//! title: Release process
//! authors: [jdoe]
//! tags: [process]
//! wiki:
//!   share: true
//!   space: ENG
//!   ancestor_id: 123456
//! ---
//! # Body
//! ```
//!
//! A file without such a block has default front matter, which never opts in
//! to publishing.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::error::ParseError;
use crate::placement::Placement;

/// Front matter delimiter line.
const YAML_BOUNDARY: &str = "---";

/// Parsed document configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    /// Page title.
    pub title: Option<String>,
    /// Author identifiers, in display order.
    pub authors: Vec<String>,
    /// Labels to apply to the page.
    pub tags: Vec<String>,
    /// Wiki publishing settings.
    pub wiki: WikiConfig,
}

/// The `wiki` section of the front matter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    /// Publish gate.
    pub share: bool,
    /// Explicit space key.
    pub space: Option<String>,
    /// Explicit parent page ID.
    #[serde(deserialize_with = "page_id")]
    pub ancestor_id: Option<String>,
}

/// Page IDs are numeric in Confluence and often written unquoted in YAML.
fn page_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PageId {
        Text(String),
        Number(u64),
    }

    Ok(Option::<PageId>::deserialize(deserializer)?.map(|id| match id {
        PageId::Text(text) => text,
        PageId::Number(number) => number.to_string(),
    }))
}

/// Front matter plus Markdown body of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedContent {
    /// Document configuration.
    pub front_matter: FrontMatter,
    /// Markdown body, trimmed.
    pub body: String,
}

/// Extracts front matter and body from a content file.
pub trait ContentParser {
    /// Parse the file at `path`.
    fn parse(&self, path: &Path) -> Result<ParsedContent, ParseError>;
}

/// Reads content files from disk and splits off the YAML front matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontMatterParser;

impl ContentParser for FrontMatterParser {
    fn parse(&self, path: &Path) -> Result<ParsedContent, ParseError> {
        let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse_content(&text, path)
    }
}

/// Split `text` into front matter and body.
///
/// `path` is only used for error messages.
pub fn parse_content(text: &str, path: &Path) -> Result<ParsedContent, ParseError> {
    let Some((yaml, body)) = split_front_matter(text) else {
        if is_boundary(text.lines().next().unwrap_or_default()) {
            return Err(ParseError::Unterminated(path.to_path_buf()));
        }
        return Ok(ParsedContent {
            front_matter: FrontMatter::default(),
            body: text.trim().to_owned(),
        });
    };

    let front_matter = if yaml.trim().is_empty() {
        FrontMatter::default()
    } else {
        serde_yaml::from_str(yaml).map_err(|e| ParseError::FrontMatter {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    };

    Ok(ParsedContent {
        front_matter,
        body: body.trim().to_owned(),
    })
}

fn is_boundary(line: &str) -> bool {
    line.trim_end() == YAML_BOUNDARY
}

/// Returns `(yaml, body)` when `text` opens with a closed `---` block.
fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let first_line_end = text.find('\n')?;
    if !is_boundary(&text[..first_line_end]) {
        return None;
    }

    let rest = &text[first_line_end + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if is_boundary(line.trim_end_matches(['\r', '\n'])) {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// A document paired with its parsed content for one sync attempt.
#[derive(Debug, Clone)]
pub struct DocumentToSync {
    /// Index of the document in the working set.
    pub index: usize,
    /// Parsed front matter and body.
    pub content: ParsedContent,
    /// Directory the content file lives in, for resolving attachments.
    pub base_dir: Option<PathBuf>,
    display_name: String,
}

impl DocumentToSync {
    /// Pair a document with its parsed content.
    pub fn new(
        index: usize,
        display_name: impl Into<String>,
        content: ParsedContent,
        base_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            index,
            content,
            base_dir,
            display_name: display_name.into(),
        }
    }

    /// Stand-in for a content-less directory: empty front matter and body.
    pub fn shell(index: usize, display_name: impl Into<String>) -> Self {
        Self::new(index, display_name, ParsedContent::default(), None)
    }

    /// Whether the document opts in to publishing.
    #[must_use]
    pub fn should_publish(&self) -> bool {
        self.content.front_matter.wiki.share
    }

    /// Declared author identifiers.
    #[must_use]
    pub fn authors(&self) -> &[String] {
        &self.content.front_matter.authors
    }

    /// Page title: front matter title, else the document's display name.
    #[must_use]
    pub fn title(&self) -> &str {
        self.content
            .front_matter
            .title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or(&self.display_name)
    }

    /// Placement the document declares for itself (either half may be missing).
    #[must_use]
    pub fn placement_override(&self) -> Placement {
        let wiki = &self.content.front_matter.wiki;
        Placement::new(wiki.space.clone(), wiki.ancestor_id.clone())
    }

    /// Resolve an attachment reference against the content file's directory.
    #[must_use]
    pub fn resolve_attachment(&self, reference: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if reference.is_relative() => dir.join(reference),
            _ => reference.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(text: &str) -> Result<ParsedContent, ParseError> {
        parse_content(text, Path::new("test.md"))
    }

    #[test]
    fn test_parse_full_front_matter() {
        let text = "---\ntitle: Release process\nauthors:\n  - jdoe\n  - asmith\ntags: [process, ops]\nwiki:\n  share: true\n  space: ENG\n  ancestor_id: 123456\n---\n\n# Steps\n\nDo things.\n";
        let parsed = parse(text).unwrap();

        assert_eq!(
            parsed.front_matter,
            FrontMatter {
                title: Some("Release process".to_owned()),
                authors: vec!["jdoe".to_owned(), "asmith".to_owned()],
                tags: vec!["process".to_owned(), "ops".to_owned()],
                wiki: WikiConfig {
                    share: true,
                    space: Some("ENG".to_owned()),
                    ancestor_id: Some("123456".to_owned()),
                },
            }
        );
        assert_eq!(parsed.body, "# Steps\n\nDo things.");
    }

    #[test]
    fn test_quoted_ancestor_id() {
        let text = "---\nwiki:\n  share: true\n  ancestor_id: \"42\"\n---\nbody";
        let parsed = parse(text).unwrap();
        assert_eq!(parsed.front_matter.wiki.ancestor_id, Some("42".to_owned()));
    }

    #[test]
    fn test_missing_wiki_section_is_not_shared() {
        let parsed = parse("---\ntitle: Draft\n---\nbody").unwrap();
        assert!(!parsed.front_matter.wiki.share);
        assert_eq!(parsed.front_matter.wiki.space, None);
    }

    #[test]
    fn test_no_front_matter() {
        let parsed = parse("# Just markdown\n\ntext").unwrap();
        assert_eq!(parsed.front_matter, FrontMatter::default());
        assert_eq!(parsed.body, "# Just markdown\n\ntext");
    }

    #[test]
    fn test_empty_front_matter() {
        let parsed = parse("---\n---\nbody").unwrap();
        assert_eq!(parsed.front_matter, FrontMatter::default());
        assert_eq!(parsed.body, "body");
    }

    #[test]
    fn test_body_keeps_later_rules() {
        let parsed = parse("---\ntitle: T\n---\nabove\n\n---\n\nbelow").unwrap();
        assert_eq!(parsed.body, "above\n\n---\n\nbelow");
    }

    #[test]
    fn test_crlf_line_endings() {
        let parsed = parse("---\r\ntitle: T\r\n---\r\nbody\r\n").unwrap();
        assert_eq!(parsed.front_matter.title, Some("T".to_owned()));
        assert_eq!(parsed.body, "body");
    }

    #[test]
    fn test_unterminated_front_matter() {
        let err = parse("---\ntitle: T\nbody").unwrap_err();
        assert!(matches!(err, ParseError::Unterminated(_)));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = parse("---\ntitle: [broken\n---\nbody").unwrap_err();
        assert!(matches!(err, ParseError::FrontMatter { .. }));
    }

    #[test]
    fn test_parser_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.md");
        std::fs::write(&path, "---\nwiki:\n  share: true\n---\nHello").unwrap();

        let parsed = FrontMatterParser.parse(&path).unwrap();
        assert!(parsed.front_matter.wiki.share);
        assert_eq!(parsed.body, "Hello");
    }

    #[test]
    fn test_parser_missing_file() {
        let err = FrontMatterParser
            .parse(Path::new("/nonexistent/file.md"))
            .unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }

    #[test]
    fn test_title_falls_back_to_display_name() {
        let doc = DocumentToSync::shell(0, "guide");
        assert_eq!(doc.title(), "guide");

        let content = parse("---\ntitle: User Guide\n---\n").unwrap();
        let doc = DocumentToSync::new(0, "guide", content, None);
        assert_eq!(doc.title(), "User Guide");
    }

    #[test]
    fn test_resolve_attachment() {
        let doc = DocumentToSync::new(
            0,
            "a",
            ParsedContent::default(),
            Some(PathBuf::from("/src/docs")),
        );
        assert_eq!(
            doc.resolve_attachment(Path::new("img/x.png")),
            PathBuf::from("/src/docs/img/x.png")
        );
        assert_eq!(
            doc.resolve_attachment(Path::new("/abs/y.png")),
            PathBuf::from("/abs/y.png")
        );
    }
}
