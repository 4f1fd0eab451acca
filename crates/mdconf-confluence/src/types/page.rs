//! Confluence page types.

use serde::Deserialize;

/// Confluence page.
///
/// Only the fields the sync needs; the body is never read back.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// Page title.
    #[serde(default)]
    pub title: String,
    /// Version information (present when expanded).
    #[serde(default)]
    pub version: Option<Version>,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

impl Page {
    /// Version number, `1` when the response did not include it.
    #[must_use]
    pub fn version_number(&self) -> u32 {
        self.version.as_ref().map_or(1, |v| v.number)
    }

    /// Web UI path relative to the site root.
    #[must_use]
    pub fn webui(&self) -> Option<&str> {
        self.links.as_ref()?.webui.as_deref()
    }
}

/// Page version.
#[derive(Debug, Clone, Deserialize)]
pub struct Version {
    /// Version number.
    pub number: u32,
}

/// Hypermedia links.
#[derive(Debug, Clone, Deserialize)]
pub struct Links {
    /// Web UI link.
    #[serde(default)]
    pub webui: Option<String>,
}

/// CQL search response.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// Matching pages.
    #[serde(default)]
    pub results: Vec<Page>,
    /// Number of results in this response.
    #[serde(default)]
    pub size: usize,
}
