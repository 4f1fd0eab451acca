//! Article sync orchestrator.
//!
//! [`Syncer`] drives every document of a [`DocumentSet`] through its
//! lifecycle:
//!
//! 1. Parse content and check the publish gate
//! 2. Resolve placement, syncing (or synthesizing) the parent directory first
//! 3. Ensure the remote page exists, creating a placeholder if needed
//! 4. Render markup and push it with labels and attachments
//!
//! The working set is processed as an append-only queue: ancestors
//! synthesized during the pass are appended and processed like any other
//! document. A document that fails is recorded in the [`SyncReport`] and the
//! pass continues; descendants of a failed document fail without further
//! remote calls.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::content::{ContentParser, DocumentToSync};
use crate::document::{Document, DocumentSet, DocumentState};
use crate::error::SyncError;
use crate::placement::{Placement, ResolvedPlacement};
use crate::remote::{Author, ContentApi, NewPage, PLACEHOLDER_BODY, PageUpdate, RemoteError};
use crate::render::MarkupRenderer;

/// Run-level settings.
#[derive(Debug, Clone, Default)]
pub struct SyncSettings {
    /// Placement for documents at the root of the scanned tree.
    pub defaults: Placement,
    /// Label added to every synced page.
    pub global_label: Option<String>,
}

/// Final outcome of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOutcome {
    /// Relative path of the document.
    pub relative_path: String,
    /// State at the end of the run.
    pub state: DocumentState,
    /// Whether the document was synthesized as a missing ancestor.
    pub synthesized: bool,
    /// Remote page ID, if one was resolved.
    pub page_id: Option<String>,
    /// Error that stopped the document, with its source chain.
    pub error: Option<String>,
}

/// Summary of a sync run, one outcome per document in working-set order.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Per-document outcomes.
    pub outcomes: Vec<DocumentOutcome>,
}

impl SyncReport {
    /// Number of documents that ended in `state` without an error.
    #[must_use]
    pub fn count(&self, state: DocumentState) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.state == state && o.error.is_none())
            .count()
    }

    /// Outcomes that ended with an error.
    pub fn failures(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.outcomes.iter().filter(|o| o.error.is_some())
    }

    /// Whether any document ended with an error.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Mutable bookkeeping for one pass over the working set.
struct RunState<'d> {
    documents: &'d mut DocumentSet,
    /// Relative paths whose placement is being resolved right now.
    resolving: HashSet<String>,
    errors: HashMap<usize, String>,
    synthesized: HashSet<usize>,
}

impl<'d> RunState<'d> {
    fn new(documents: &'d mut DocumentSet) -> Self {
        Self {
            documents,
            resolving: HashSet::new(),
            errors: HashMap::new(),
            synthesized: HashSet::new(),
        }
    }

    fn fail(&mut self, index: usize, err: &SyncError) {
        let message = error_chain(err);
        error!(
            "Failed to sync {}: {}",
            self.documents.get(index).relative_path,
            message
        );
        self.errors.insert(index, message);
    }

    fn has_failed(&self, index: usize) -> bool {
        self.errors.contains_key(&index)
    }

    fn into_report(self) -> SyncReport {
        let outcomes = self
            .documents
            .iter()
            .enumerate()
            .map(|(index, doc)| DocumentOutcome {
                relative_path: doc.relative_path.clone(),
                state: doc.state(),
                synthesized: self.synthesized.contains(&index),
                page_id: doc.confluence_id.clone(),
                error: self.errors.get(&index).cloned(),
            })
            .collect();
        SyncReport { outcomes }
    }
}

/// Syncs a working set of documents to the remote wiki.
pub struct Syncer<'a> {
    remote: &'a dyn ContentApi,
    parser: &'a dyn ContentParser,
    renderer: &'a dyn MarkupRenderer,
    settings: SyncSettings,
}

impl<'a> Syncer<'a> {
    /// Create a syncer over the given collaborators.
    #[must_use]
    pub fn new(
        remote: &'a dyn ContentApi,
        parser: &'a dyn ContentParser,
        renderer: &'a dyn MarkupRenderer,
        settings: SyncSettings,
    ) -> Self {
        Self {
            remote,
            parser,
            renderer,
            settings,
        }
    }

    /// Sync every document once, including ancestors synthesized on the way.
    ///
    /// Never aborts early: per-document errors are logged and reported.
    pub fn sync(&self, documents: &mut DocumentSet) -> SyncReport {
        let mut run = RunState::new(documents);

        // The set grows while we walk it, so iterate by index.
        let mut index = 0;
        while index < run.documents.len() {
            if !run.has_failed(index) {
                let path = run.documents.get(index).relative_path.clone();
                info!("Attempting to sync {}", path);
                match self.sync_one(&mut run, index) {
                    Ok(()) => info!("{} is {}", path, run.documents.get(index).state()),
                    Err(err) => run.fail(index, &err),
                }
            }
            index += 1;
        }

        run.into_report()
    }

    fn sync_one(&self, run: &mut RunState<'_>, index: usize) -> Result<(), SyncError> {
        let doc = run.documents.get(index);
        let state = doc.state();
        if state.is_terminal() {
            return Ok(());
        }

        let Some(content_path) = doc.content_path.clone() else {
            if state == DocumentState::ToBeSynced {
                let shell = DocumentToSync::shell(index, doc.display_name());
                self.place(run, &shell)?;
            }
            return Ok(());
        };

        let display_name = doc.display_name().to_owned();
        let content = match self.parser.parse(&content_path) {
            Ok(content) => content,
            Err(err) => {
                warn!(
                    "Unable to process {}, skipping: {}",
                    content_path.display(),
                    error_chain(&err)
                );
                return run.documents.get_mut(index).advance(DocumentState::Skipped);
            }
        };
        let base_dir = content_path.parent().map(Path::to_path_buf);
        let to_sync = DocumentToSync::new(index, display_name, content, base_dir);

        if !to_sync.should_publish() {
            info!("{} not set to be shared, skipping", content_path.display());
            return run.documents.get_mut(index).advance(DocumentState::Skipped);
        }

        let authors = self.resolve_authors(to_sync.authors());

        if state == DocumentState::ToBeSynced {
            self.place(run, &to_sync)?;
        }

        self.push(run.documents.get_mut(index), &to_sync, &authors)
    }

    /// Look up declared authors, dropping the ones the remote does not know.
    fn resolve_authors(&self, identifiers: &[String]) -> Vec<Author> {
        identifiers
            .iter()
            .filter_map(|identifier| match self.remote.get_author(identifier) {
                Ok(Some(author)) => Some(author),
                Ok(None) => {
                    debug!("Unknown author '{}', leaving it out", identifier);
                    None
                }
                Err(err) => {
                    warn!("Author lookup for '{}' failed: {}", identifier, err);
                    None
                }
            })
            .collect()
    }

    /// Resolve placement and make sure the remote page exists.
    fn place(&self, run: &mut RunState<'_>, to_sync: &DocumentToSync) -> Result<(), SyncError> {
        let path = run.documents.get(to_sync.index).relative_path.clone();
        if !run.resolving.insert(path.clone()) {
            return Err(SyncError::CycleDetected {
                revisited: path.clone(),
                path,
            });
        }
        let resolved = self.resolve_placement(run, to_sync, &path);
        run.resolving.remove(&path);

        self.ensure_exists(run.documents.get_mut(to_sync.index), to_sync.title(), resolved?)
    }

    fn resolve_placement(
        &self,
        run: &mut RunState<'_>,
        to_sync: &DocumentToSync,
        path: &str,
    ) -> Result<ResolvedPlacement, SyncError> {
        let own = to_sync.placement_override();
        if own.is_complete() {
            debug!("{} declares its own placement", path);
            return own.into_resolved().map_err(|missing| unresolved(path, missing));
        }

        let parent_path = run.documents.get(to_sync.index).parent().map(str::to_owned);
        let placement = match parent_path {
            None => own.or(&self.settings.defaults),
            Some(parent_path) => {
                let parent_index = parent_index(run, to_sync.index, &parent_path);
                self.sync_parent(run, path, parent_index)?;

                let parent = run.documents.get(parent_index);
                if parent.confluence_id.is_none() {
                    warn!(
                        "Parent {} of {} has no page ({}), falling back to defaults",
                        parent.relative_path,
                        path,
                        parent.state()
                    );
                }
                own.or(&Placement::new(
                    parent.space.clone(),
                    parent.confluence_id.clone(),
                ))
                .or(&self.settings.defaults)
            }
        };

        placement
            .into_resolved()
            .map_err(|missing| unresolved(path, missing))
    }

    /// Sync the parent now so its page exists before the child needs it.
    fn sync_parent(
        &self,
        run: &mut RunState<'_>,
        path: &str,
        parent_index: usize,
    ) -> Result<(), SyncError> {
        let parent_path = run.documents.get(parent_index).relative_path.clone();
        let parent_failed = || SyncError::ParentFailed {
            path: path.to_owned(),
            parent: parent_path.clone(),
        };

        if run.resolving.contains(&parent_path) {
            return Err(SyncError::CycleDetected {
                path: path.to_owned(),
                revisited: parent_path.clone(),
            });
        }
        if run.has_failed(parent_index) {
            return Err(parent_failed());
        }
        if let Err(err) = self.sync_one(run, parent_index) {
            if matches!(err, SyncError::CycleDetected { .. }) {
                return Err(err);
            }
            run.fail(parent_index, &err);
            return Err(parent_failed());
        }
        Ok(())
    }

    /// Adopt the page carrying the document's label, or create it.
    fn ensure_exists(
        &self,
        doc: &mut Document,
        title: &str,
        placement: ResolvedPlacement,
    ) -> Result<(), SyncError> {
        let label = doc.id_label();
        let remote_err = |source: RemoteError| SyncError::Remote {
            path: doc.relative_path.clone(),
            source,
        };

        let existing = self
            .remote
            .exists(&label, &placement.space, &placement.ancestor_id)
            .map_err(remote_err)?;
        let page = if let Some(page) = existing {
            info!(
                "Page for {} exists (id={}, version={})",
                doc.relative_path, page.id, page.version
            );
            page
        } else {
            info!(
                "Creating page '{}' for {} in space {} under {}",
                title, doc.relative_path, placement.space, placement.ancestor_id
            );
            // Directory shells never get an update, so they are created final.
            let (body, tags) = if doc.has_content() {
                (PLACEHOLDER_BODY, Vec::new())
            } else {
                ("", self.tags(&[]))
            };
            self.remote
                .create(&NewPage {
                    label: &label,
                    space: &placement.space,
                    title,
                    ancestor_id: &placement.ancestor_id,
                    body,
                    tags: &tags,
                })
                .map_err(remote_err)?
        };

        doc.space = Some(placement.space);
        doc.ancestor_id = Some(placement.ancestor_id);
        doc.confluence_id = Some(page.id);
        doc.page_version = Some(page.version);
        doc.advance(DocumentState::Created)
    }

    /// Render content and push it to the tracked page.
    fn push(
        &self,
        doc: &mut Document,
        to_sync: &DocumentToSync,
        authors: &[Author],
    ) -> Result<(), SyncError> {
        let (Some(page_id), Some(page_version), Some(space), Some(ancestor_id)) = (
            doc.confluence_id.as_deref(),
            doc.page_version,
            doc.space.as_deref(),
            doc.ancestor_id.as_deref(),
        ) else {
            return Err(SyncError::MissingRemotePage(doc.relative_path.clone()));
        };

        let rendered = self.renderer.render(&to_sync.content.body, authors);
        let attachments = dedup_paths(
            rendered
                .attachments
                .iter()
                .map(|reference| to_sync.resolve_attachment(reference)),
        );
        for name in shared_file_names(&attachments) {
            warn!(
                "Several attachments of {} are named {}; only the last upload is kept",
                doc.relative_path, name
            );
        }
        let tags = self.tags(&to_sync.content.front_matter.tags);
        let label = doc.id_label();

        let update = PageUpdate {
            page_id,
            content: &rendered.markup,
            title: to_sync.title(),
            tags: &tags,
            label: &label,
            space,
            ancestor_id,
            page_version,
            attachments: &attachments,
        };
        let page = self
            .remote
            .update(&update)
            .map_err(|source| SyncError::Remote {
                path: doc.relative_path.clone(),
                source,
            })?;

        info!(
            "Updated {} (id={}) to version {}",
            doc.relative_path, page.id, page.version
        );
        doc.page_version = Some(page.version);
        doc.advance(DocumentState::Synced)
    }

    /// Document tags plus the global label, as valid label names.
    fn tags(&self, declared: &[String]) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for tag in declared.iter().chain(self.settings.global_label.as_ref()) {
            let tag = tag.split_whitespace().collect::<Vec<_>>().join("_");
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }
}

/// Index of the parent document, synthesizing a directory node if needed.
fn parent_index(run: &mut RunState<'_>, child: usize, parent_path: &str) -> usize {
    if let Some(index) = run.documents.find(parent_path) {
        return index;
    }

    let child = run.documents.get(child);
    let absolute_path = child
        .absolute_path
        .parent()
        .map_or_else(|| PathBuf::from(parent_path), Path::to_path_buf);
    info!("Adding missing parent directory {}", parent_path);
    let index = run
        .documents
        .push(Document::directory(absolute_path, parent_path, None));
    run.synthesized.insert(index);
    index
}

fn unresolved(path: &str, missing: &'static str) -> SyncError {
    SyncError::PlacementUnresolved {
        path: path.to_owned(),
        missing,
    }
}

/// File names used by more than one attachment path.
///
/// Attachments are stored per page by file name, so such paths overwrite
/// each other.
fn shared_file_names(paths: &[PathBuf]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut shared = Vec::new();
    for name in paths.iter().filter_map(|path| path.file_name()) {
        let name = name.to_string_lossy().into_owned();
        if !seen.insert(name.clone()) && !shared.contains(&name) {
            shared.push(name);
        }
    }
    shared
}

fn dedup_paths(paths: impl Iterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut unique: Vec<PathBuf> = Vec::new();
    for path in paths {
        if !unique.contains(&path) {
            unique.push(path);
        }
    }
    unique
}

/// Format an error with all of its sources, `outer: inner: root`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        // RemoteError already prints its source inline.
        let cause_message = cause.to_string();
        if !message.ends_with(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}
