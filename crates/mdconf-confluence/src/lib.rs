//! Confluence integration for mdconf.
//!
//! This crate provides the remote side of a sync run:
//! - [`ConfluenceClient`]: REST API client with basic or bearer authentication
//! - [`ContentApi`](mdconf_sync::ContentApi) implementation for the client
//!
//! # API Client
//!
//! ```ignore
//! use mdconf_confluence::{Auth, ConfluenceClient};
//!
//! let client = ConfluenceClient::new(
//!     "https://confluence.example.com",
//!     Auth::Bearer("token".to_owned()),
//! )
//! .with_headers(vec![("X-Trace".to_owned(), "1".to_owned())])
//! .with_dry_run(true);
//!
//! let me = client.current_user()?;
//! ```

mod api;
mod auth;
mod client;
mod types;

pub mod error;

pub use auth::Auth;
pub use client::{ConfluenceClient, DRY_RUN_ID_PREFIX, parse_header};
pub use error::ConfluenceError;
pub use types::User;
