//! Remote content API abstraction.
//!
//! The orchestrator talks to the wiki only through [`ContentApi`]. The
//! Confluence REST client implements it for real runs; tests use
//! `MockRemote` (feature `mock`).

use std::path::PathBuf;

/// Remote page reference returned by lookups, creates and updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePage {
    /// Page ID.
    pub id: String,
    /// Current version number.
    pub version: u32,
    /// Web UI link, if the API returned one.
    pub url: Option<String>,
}

/// Remote user resolved from an author identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Author {
    /// Identifier as written in the front matter.
    pub identifier: String,
    /// Cloud account ID.
    pub account_id: Option<String>,
    /// Server/Data Center user key.
    pub user_key: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
}

impl Author {
    /// Key the renderer should reference the user by.
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.user_key.as_deref().or(self.account_id.as_deref())
    }
}

/// Body of a content page between its creation and its first update.
pub const PLACEHOLDER_BODY: &str = "Upload in progress...";

/// Page to create, tagged with its ID label.
#[derive(Debug, Clone)]
pub struct NewPage<'a> {
    /// Stable ID label.
    pub label: &'a str,
    /// Space key.
    pub space: &'a str,
    /// Page title.
    pub title: &'a str,
    /// Parent page ID.
    pub ancestor_id: &'a str,
    /// Initial storage markup: [`PLACEHOLDER_BODY`] for content pages,
    /// empty for directory shells.
    pub body: &'a str,
    /// Labels besides the ID label.
    pub tags: &'a [String],
}

/// Content update pushed for an existing page.
#[derive(Debug, Clone)]
pub struct PageUpdate<'a> {
    /// Page ID.
    pub page_id: &'a str,
    /// Storage markup.
    pub content: &'a str,
    /// Page title.
    pub title: &'a str,
    /// Labels besides the ID label.
    pub tags: &'a [String],
    /// Stable ID label, re-applied on every update.
    pub label: &'a str,
    /// Space key.
    pub space: &'a str,
    /// Parent page ID.
    pub ancestor_id: &'a str,
    /// Version the update is based on.
    pub page_version: u32,
    /// Local files to upload before the content.
    pub attachments: &'a [PathBuf],
}

/// Semantic category of a remote failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RemoteErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Credentials rejected or missing permission.
    Unauthorized,
    /// Server answered with an error status.
    Http,
    /// Request never got a response (DNS, TLS, timeout).
    Transport,
    /// Anything else.
    Other,
}

/// Error from a [`ContentApi`] call with semantic kind and backend source.
#[derive(Debug)]
pub struct RemoteError {
    /// Semantic error category.
    pub kind: RemoteErrorKind,
    /// HTTP status, when there was a response.
    pub status: Option<u16>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl RemoteError {
    /// Create a new remote error.
    #[must_use]
    pub fn new(kind: RemoteErrorKind) -> Self {
        Self {
            kind,
            status: None,
            source: None,
        }
    }

    /// Create an error from an HTTP status code.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        let kind = match status {
            401 | 403 => RemoteErrorKind::Unauthorized,
            404 => RemoteErrorKind::NotFound,
            _ => RemoteErrorKind::Http,
        };
        Self {
            status: Some(status),
            ..Self::new(kind)
        }
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind_str = match self.kind {
            RemoteErrorKind::NotFound => "Not found",
            RemoteErrorKind::Unauthorized => "Unauthorized",
            RemoteErrorKind::Http => "HTTP error",
            RemoteErrorKind::Transport => "Transport error",
            RemoteErrorKind::Other => "Error",
        };
        write!(f, "{kind_str}")?;

        if let Some(status) = self.status {
            write!(f, " ({status})")?;
        }
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Remote wiki operations consumed by the orchestrator.
pub trait ContentApi {
    /// Find the page carrying `label`, scoped to `space` and `ancestor_id`.
    fn exists(
        &self,
        label: &str,
        space: &str,
        ancestor_id: &str,
    ) -> Result<Option<RemotePage>, RemoteError>;

    /// Create a page and apply its labels.
    ///
    /// Content pages are created with a placeholder body and followed up
    /// with [`update`](Self::update); directory shells are final as created.
    fn create(&self, page: &NewPage<'_>) -> Result<RemotePage, RemoteError>;

    /// Upload attachments, push content and re-apply labels.
    ///
    /// Returns the page at its new version.
    fn update(&self, update: &PageUpdate<'_>) -> Result<RemotePage, RemoteError>;

    /// Resolve an author identifier to a remote user, `None` if unknown.
    fn get_author(&self, identifier: &str) -> Result<Option<Author>, RemoteError>;
}
