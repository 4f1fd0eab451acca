//! Article sync core for mdconf.
//!
//! This crate turns a tree of Markdown files into a set of wiki pages that
//! mirrors it. It owns the document model and lifecycle, discovery, front
//! matter parsing, placement resolution and the orchestrator, and talks to
//! the outside world only through three traits:
//!
//! - [`ContentApi`]: remote page operations (implemented by `mdconf-confluence`)
//! - [`ContentParser`]: front matter and body extraction ([`FrontMatterParser`])
//! - [`MarkupRenderer`]: Markdown to storage markup (implemented by `mdconf-renderer`)
//!
//! [`MockRemote`] and [`StaticRenderer`] (behind the `mock` feature) make the
//! orchestrator testable without a wiki.
//!
//! # Example
//!
//! ```ignore
//! use mdconf_sync::{FrontMatterParser, Placement, SyncSettings, Syncer, discover};
//!
//! let mut documents = discover(&["docs"]);
//! let settings = SyncSettings {
//!     defaults: Placement::new(Some("DOCS".to_owned()), Some("12345".to_owned())),
//!     global_label: None,
//! };
//! let syncer = Syncer::new(&client, &FrontMatterParser, &renderer, settings);
//! let report = syncer.sync(&mut documents);
//! ```

mod content;
mod document;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod placement;
mod remote;
mod render;
mod scanner;
mod syncer;

pub use content::{
    ContentParser, DocumentToSync, FrontMatter, FrontMatterParser, ParsedContent, WikiConfig,
    parse_content,
};
pub use document::{Document, DocumentSet, DocumentState, id_label};
pub use error::{ParseError, SyncError};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCall, MockPage, MockRemote, StaticRenderer};
pub use placement::{Placement, ResolvedPlacement};
pub use remote::{
    Author, ContentApi, NewPage, PLACEHOLDER_BODY, PageUpdate, RemoteError, RemoteErrorKind,
    RemotePage,
};
pub use render::{MarkupRenderer, RenderedMarkup};
pub use scanner::discover;
pub use syncer::{DocumentOutcome, SyncReport, SyncSettings, Syncer};
