//! Mock remote and renderer for testing.
//!
//! Provides [`MockRemote`], an in-memory wiki keyed by ID label, and
//! [`StaticRenderer`], which passes the Markdown body through unchanged.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::RwLock;

use crate::remote::{Author, ContentApi, NewPage, PageUpdate, RemoteError, RemotePage};
use crate::render::{MarkupRenderer, RenderedMarkup};

/// Remote call recorded by [`MockRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// Label lookup.
    Exists {
        /// ID label searched for.
        label: String,
        /// Space key.
        space: String,
        /// Parent page ID.
        ancestor_id: String,
    },
    /// Page creation.
    Create {
        /// ID label.
        label: String,
        /// Space key.
        space: String,
        /// Page title.
        title: String,
        /// Parent page ID.
        ancestor_id: String,
        /// Initial body.
        body: String,
    },
    /// Content update.
    Update {
        /// Page ID.
        page_id: String,
        /// Page title.
        title: String,
    },
    /// Author lookup.
    GetAuthor(String),
}

/// Page stored by [`MockRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockPage {
    /// Page ID.
    pub id: String,
    /// Current version.
    pub version: u32,
    /// Space key.
    pub space: String,
    /// Parent page ID.
    pub ancestor_id: String,
    /// Page title.
    pub title: String,
    /// Last pushed markup.
    pub content: String,
    /// Labels, ID label first.
    pub labels: Vec<String>,
    /// Uploaded attachment paths.
    pub attachments: Vec<PathBuf>,
}

/// In-memory [`ContentApi`] for testing.
///
/// Pages are keyed by ID label, so a second run against the same mock sees
/// the pages the first run created. Lookups only match a page in the same
/// space under the same parent, like the label search they stand in for.
/// Every call is recorded.
///
/// # Example
///
/// ```ignore
/// use mdconf_sync::MockRemote;
///
/// let remote = MockRemote::new()
///     .with_author("jdoe", "Jane Doe")
///     .with_failing_update("aid_broken_2emd");
/// ```
#[derive(Debug)]
pub struct MockRemote {
    pages: RwLock<HashMap<String, MockPage>>,
    calls: RwLock<Vec<MockCall>>,
    next_id: RwLock<u64>,
    authors: HashMap<String, Author>,
    failing_updates: HashSet<String>,
}

impl Default for MockRemote {
    fn default() -> Self {
        Self {
            pages: RwLock::new(HashMap::new()),
            calls: RwLock::new(Vec::new()),
            next_id: RwLock::new(1000),
            authors: HashMap::new(),
            failing_updates: HashSet::new(),
        }
    }
}

impl MockRemote {
    /// Create an empty mock remote.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a known author.
    #[must_use]
    pub fn with_author(mut self, identifier: &str, display_name: &str) -> Self {
        self.authors.insert(
            identifier.to_owned(),
            Author {
                identifier: identifier.to_owned(),
                account_id: Some(format!("account-{identifier}")),
                user_key: None,
                display_name: Some(display_name.to_owned()),
            },
        );
        self
    }

    /// Seed an existing page carrying `label` below `ancestor_id` in `space`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(
        self,
        label: &str,
        id: &str,
        version: u32,
        space: &str,
        ancestor_id: &str,
    ) -> Self {
        self.pages.write().unwrap().insert(
            label.to_owned(),
            MockPage {
                id: id.to_owned(),
                version,
                space: space.to_owned(),
                ancestor_id: ancestor_id.to_owned(),
                title: String::new(),
                content: String::new(),
                labels: vec![label.to_owned()],
                attachments: Vec::new(),
            },
        );
        self
    }

    /// Make updates of the page carrying `label` fail with HTTP 500.
    #[must_use]
    pub fn with_failing_update(mut self, label: &str) -> Self {
        self.failing_updates.insert(label.to_owned());
        self
    }

    /// All calls made so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.read().unwrap().clone()
    }

    /// Forget recorded calls, keeping pages.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    /// Page carrying `label`, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn page(&self, label: &str) -> Option<MockPage> {
        self.pages.read().unwrap().get(label).cloned()
    }

    /// Number of stored pages.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.read().unwrap().len()
    }

    /// Number of `create` calls made so far.
    #[must_use]
    pub fn create_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, MockCall::Create { .. }))
            .count()
    }

    fn record(&self, call: MockCall) {
        self.calls.write().unwrap().push(call);
    }
}

impl ContentApi for MockRemote {
    fn exists(
        &self,
        label: &str,
        space: &str,
        ancestor_id: &str,
    ) -> Result<Option<RemotePage>, RemoteError> {
        self.record(MockCall::Exists {
            label: label.to_owned(),
            space: space.to_owned(),
            ancestor_id: ancestor_id.to_owned(),
        });
        let pages = self.pages.read().unwrap();
        Ok(pages
            .get(label)
            .filter(|page| page.space == space && page.ancestor_id == ancestor_id)
            .map(|page| RemotePage {
                id: page.id.clone(),
                version: page.version,
                url: None,
            }))
    }

    fn create(&self, new: &NewPage<'_>) -> Result<RemotePage, RemoteError> {
        self.record(MockCall::Create {
            label: new.label.to_owned(),
            space: new.space.to_owned(),
            title: new.title.to_owned(),
            ancestor_id: new.ancestor_id.to_owned(),
            body: new.body.to_owned(),
        });

        let id = {
            let mut next_id = self.next_id.write().unwrap();
            *next_id += 1;
            next_id.to_string()
        };
        self.pages.write().unwrap().insert(
            new.label.to_owned(),
            MockPage {
                id: id.clone(),
                version: 1,
                space: new.space.to_owned(),
                ancestor_id: new.ancestor_id.to_owned(),
                title: new.title.to_owned(),
                content: new.body.to_owned(),
                labels: std::iter::once(new.label.to_owned())
                    .chain(new.tags.iter().cloned())
                    .collect(),
                attachments: Vec::new(),
            },
        );
        Ok(RemotePage {
            id,
            version: 1,
            url: None,
        })
    }

    fn update(&self, update: &PageUpdate<'_>) -> Result<RemotePage, RemoteError> {
        self.record(MockCall::Update {
            page_id: update.page_id.to_owned(),
            title: update.title.to_owned(),
        });
        if self.failing_updates.contains(update.label) {
            return Err(RemoteError::from_status(500)
                .with_source(std::io::Error::other("injected failure")));
        }

        let mut pages = self.pages.write().unwrap();
        let page = pages
            .values_mut()
            .find(|page| page.id == update.page_id)
            .ok_or_else(|| RemoteError::from_status(404))?;

        page.version = update.page_version + 1;
        page.title = update.title.to_owned();
        page.content = update.content.to_owned();
        page.space = update.space.to_owned();
        page.ancestor_id = update.ancestor_id.to_owned();
        page.labels = std::iter::once(update.label.to_owned())
            .chain(update.tags.iter().cloned())
            .collect();
        page.attachments = update.attachments.to_vec();

        Ok(RemotePage {
            id: page.id.clone(),
            version: page.version,
            url: None,
        })
    }

    fn get_author(&self, identifier: &str) -> Result<Option<Author>, RemoteError> {
        self.record(MockCall::GetAuthor(identifier.to_owned()));
        Ok(self.authors.get(identifier).cloned())
    }
}

/// Renderer that emits the Markdown body as-is, followed by author names.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticRenderer;

impl MarkupRenderer for StaticRenderer {
    fn render(&self, body: &str, authors: &[Author]) -> RenderedMarkup {
        let mut markup = body.to_owned();
        for author in authors {
            markup.push_str("\n@");
            markup.push_str(author.display_name.as_deref().unwrap_or(&author.identifier));
        }
        RenderedMarkup {
            markup,
            attachments: Vec::new(),
        }
    }
}
