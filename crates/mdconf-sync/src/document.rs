//! Document model and lifecycle.
//!
//! A [`Document`] is one discovered Markdown file or one directory node of the
//! scanned tree. Directories either carry their `index.md` as content or are
//! content-less shells that only exist to hold child pages.
//!
//! # Relative Path Convention
//!
//! `relative_path` always uses `/` separators and never has a leading or
//! trailing slash:
//! - `"guide.md"` - root-level file
//! - `"domain"` - directory
//! - `"domain/setup.md"` - nested file
//!
//! The parent of a document is the directory component of its relative path,
//! so `"domain/setup.md"` belongs under `"domain"` and `"guide.md"` under the
//! root (the run-level default placement).

use std::collections::HashMap;
use std::fmt::Write;
use std::path::PathBuf;

use crate::error::SyncError;

/// Prefix of the label that identifies a synced page.
const ID_LABEL_PREFIX: &str = "aid_";

/// Markdown file extension.
const MARKDOWN_EXTENSION: &str = ".md";

/// Lifecycle state of a document within one sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentState {
    /// Discovered or synthesized, nothing done remotely yet.
    ToBeSynced,
    /// Placement resolved and the remote page is known to exist.
    Created,
    /// Content pushed (terminal).
    Synced,
    /// Opted out of publishing or failed to parse (terminal).
    Skipped,
}

impl DocumentState {
    /// Whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Synced | Self::Skipped)
    }

    /// Whether `self -> next` is an allowed forward transition.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::ToBeSynced, Self::Created | Self::Skipped) | (Self::Created, Self::Synced)
        )
    }

    /// Lowercase name used in logs and reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ToBeSynced => "to_be_synced",
            Self::Created => "created",
            Self::Synced => "synced",
            Self::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for DocumentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered file or directory node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Absolute filesystem path of the file or directory.
    pub absolute_path: PathBuf,
    /// Path relative to the scanned root, `/`-separated.
    pub relative_path: String,
    /// Markdown body to publish, if any.
    pub content_path: Option<PathBuf>,
    /// Whether this node is a directory.
    pub is_directory: bool,
    /// Resolved space key.
    pub space: Option<String>,
    /// Resolved parent page ID.
    pub ancestor_id: Option<String>,
    /// Remote page ID, set once the page is known to exist.
    pub confluence_id: Option<String>,
    /// Remote page version, required for the next update.
    pub page_version: Option<u32>,
    state: DocumentState,
}

impl Document {
    /// Create a document for a Markdown file.
    pub fn file(absolute_path: impl Into<PathBuf>, relative_path: &str) -> Self {
        let absolute_path = absolute_path.into();
        let mut document = Self::new(absolute_path, relative_path, false);
        document.content_path = Some(document.absolute_path.clone());
        document
    }

    /// Create a directory document, optionally backed by an index file.
    pub fn directory(
        absolute_path: impl Into<PathBuf>,
        relative_path: &str,
        index_path: Option<PathBuf>,
    ) -> Self {
        let mut document = Self::new(absolute_path.into(), relative_path, true);
        document.content_path = index_path;
        document
    }

    fn new(absolute_path: PathBuf, relative_path: &str, is_directory: bool) -> Self {
        Self {
            absolute_path,
            relative_path: normalize_relative_path(relative_path),
            content_path: None,
            is_directory,
            space: None,
            ancestor_id: None,
            confluence_id: None,
            page_version: None,
            state: DocumentState::ToBeSynced,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> DocumentState {
        self.state
    }

    /// Move to `next`, rejecting anything but a forward transition.
    pub fn advance(&mut self, next: DocumentState) -> Result<(), SyncError> {
        if !self.state.can_advance_to(next) {
            return Err(SyncError::InvalidTransition {
                path: self.relative_path.clone(),
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Whether there is a Markdown body to parse and push.
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.content_path.is_some()
    }

    /// Last component of the relative path.
    #[must_use]
    pub fn name(&self) -> &str {
        self.relative_path
            .rsplit_once('/')
            .map_or(self.relative_path.as_str(), |(_, name)| name)
    }

    /// Name without the Markdown extension, used as the fallback page title.
    #[must_use]
    pub fn display_name(&self) -> &str {
        let name = self.name();
        if self.is_directory {
            return name;
        }
        name.strip_suffix(MARKDOWN_EXTENSION).unwrap_or(name)
    }

    /// Relative path of the parent directory, `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.relative_path
            .rsplit_once('/')
            .map(|(parent, _)| parent)
            .filter(|parent| !parent.is_empty())
    }

    /// Stable label used to look the page up remotely.
    #[must_use]
    pub fn id_label(&self) -> String {
        id_label(&self.relative_path)
    }

    /// Whether both the remote ID and version are known.
    #[must_use]
    pub fn has_remote_page(&self) -> bool {
        self.confluence_id.is_some() && self.page_version.is_some()
    }
}

/// Encode a relative path as a Confluence label.
///
/// ASCII lowercase letters and digits are kept; every other byte becomes `_`
/// followed by two lowercase hex digits. Distinct paths always map to distinct
/// labels, and the result only contains characters Confluence keeps verbatim.
#[must_use]
pub fn id_label(relative_path: &str) -> String {
    let mut label = String::with_capacity(ID_LABEL_PREFIX.len() + relative_path.len() * 2);
    label.push_str(ID_LABEL_PREFIX);
    for byte in relative_path.bytes() {
        if byte.is_ascii_lowercase() || byte.is_ascii_digit() {
            label.push(char::from(byte));
        } else {
            write!(label, "_{byte:02x}").unwrap();
        }
    }
    label
}

fn normalize_relative_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Append-only working set of documents, indexed by relative path.
///
/// Documents are addressed by their insertion index, which never changes:
/// the set only grows while a run synthesizes missing ancestors.
#[derive(Debug, Default)]
pub struct DocumentSet {
    documents: Vec<Document>,
    by_path: HashMap<String, usize>,
}

impl DocumentSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document and return its index.
    ///
    /// If a document with the same relative path already exists, the new one
    /// is dropped and the existing index is returned.
    pub fn push(&mut self, document: Document) -> usize {
        if let Some(&index) = self.by_path.get(&document.relative_path) {
            tracing::warn!(
                "Duplicate document path '{}' ({}), keeping the first one",
                document.relative_path,
                document.absolute_path.display()
            );
            return index;
        }
        let index = self.documents.len();
        self.by_path.insert(document.relative_path.clone(), index);
        self.documents.push(document);
        index
    }

    /// Index of the document with the given relative path.
    #[must_use]
    pub fn find(&self, relative_path: &str) -> Option<usize> {
        self.by_path.get(relative_path).copied()
    }

    /// Document at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> &Document {
        &self.documents[index]
    }

    /// Mutable document at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn get_mut(&mut self, index: usize) -> &mut Document {
        &mut self.documents[index]
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate documents in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }
}

impl FromIterator<Document> for DocumentSet {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        let mut set = Self::new();
        for document in iter {
            set.push(document);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_document_defaults() {
        let doc = Document::file("/src/docs/guide.md", "docs/guide.md");
        assert_eq!(doc.state(), DocumentState::ToBeSynced);
        assert!(!doc.is_directory);
        assert!(doc.has_content());
        assert_eq!(doc.name(), "guide.md");
        assert_eq!(doc.display_name(), "guide");
        assert_eq!(doc.parent(), Some("docs"));
    }

    #[test]
    fn test_root_document_has_no_parent() {
        let doc = Document::file("/src/a.md", "a.md");
        assert_eq!(doc.parent(), None);
    }

    #[test]
    fn test_directory_without_index() {
        let doc = Document::directory("/src/docs", "docs", None);
        assert!(doc.is_directory);
        assert!(!doc.has_content());
        assert_eq!(doc.display_name(), "docs");
    }

    #[test]
    fn test_relative_path_is_normalized() {
        let doc = Document::file("/src/a/b.md", "./a//b.md");
        assert_eq!(doc.relative_path, "a/b.md");

        let doc = Document::directory("/src/a", "a/", None);
        assert_eq!(doc.relative_path, "a");
    }

    #[test]
    fn test_id_label_encoding() {
        assert_eq!(id_label("a.md"), "aid_a_2emd");
        assert_eq!(id_label("docs/child.md"), "aid_docs_2fchild_2emd");
        assert_eq!(id_label("My Doc.md"), "aid__4dy_20_44oc_2emd");
    }

    #[test]
    fn test_id_label_distinguishes_sanitized_collisions() {
        assert_ne!(id_label("a b.md"), id_label("a_b.md"));
        assert_ne!(id_label("a-b.md"), id_label("a_b.md"));
        assert_ne!(id_label("A.md"), id_label("a.md"));
        assert_ne!(id_label("a/b.md"), id_label("a_2fb.md"));
    }

    #[test]
    fn test_id_label_is_stable() {
        let doc = Document::file("/src/docs/x.md", "docs/x.md");
        assert_eq!(doc.id_label(), doc.id_label());
        assert_eq!(doc.id_label(), id_label("docs/x.md"));
    }

    #[test]
    fn test_forward_transitions() {
        let mut doc = Document::file("/src/a.md", "a.md");
        doc.advance(DocumentState::Created).unwrap();
        doc.advance(DocumentState::Synced).unwrap();
        assert!(doc.state().is_terminal());
    }

    #[test]
    fn test_transitions_never_regress() {
        let mut doc = Document::file("/src/a.md", "a.md");
        doc.advance(DocumentState::Skipped).unwrap();

        let err = doc.advance(DocumentState::Created).unwrap_err();
        assert!(matches!(err, SyncError::InvalidTransition { .. }));
        assert_eq!(doc.state(), DocumentState::Skipped);

        let mut doc = Document::file("/src/b.md", "b.md");
        doc.advance(DocumentState::Created).unwrap();
        assert!(doc.advance(DocumentState::ToBeSynced).is_err());
        assert!(doc.advance(DocumentState::Skipped).is_err());
        assert_eq!(doc.state(), DocumentState::Created);
    }

    #[test]
    fn test_document_set_keeps_first_duplicate() {
        let mut set = DocumentSet::new();
        let first = set.push(Document::file("/one/a.md", "a.md"));
        let second = set.push(Document::file("/two/a.md", "a.md"));
        assert_eq!(first, second);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(0).absolute_path, PathBuf::from("/one/a.md"));
    }

    #[test]
    fn test_document_set_find() {
        let set: DocumentSet = [
            Document::file("/src/a.md", "a.md"),
            Document::directory("/src/docs", "docs", None),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.find("docs"), Some(1));
        assert_eq!(set.find("missing"), None);
    }
}
