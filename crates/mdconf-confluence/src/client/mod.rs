//! Confluence REST API client.
//!
//! Provides a sync HTTP client for the Confluence REST API with basic or
//! bearer authentication, extra per-request headers and a dry-run mode in
//! which only read requests reach the server.

mod attachments;
mod labels;
mod pages;
mod users;

pub(crate) use pages::PageContent;

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::info;
use ureq::http::Response;
use ureq::typestate::WithBody;
use ureq::{Agent, Body, RequestBuilder};

use crate::auth::Auth;
use crate::error::ConfluenceError;
use crate::types::Page;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// REST API path below the site root.
const API_PATH: &str = "/rest/api";

/// Value of the `User-Agent` header.
const USER_AGENT: &str = "mdconf";

/// Prefix of page IDs handed out in dry-run mode.
pub const DRY_RUN_ID_PREFIX: &str = "dry-run:";

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    site_url: String,
    api_url: String,
    auth: Auth,
    headers: Vec<(String, String)>,
    dry_run: bool,
}

impl ConfluenceClient {
    /// Create a client for the site at `base_url`.
    ///
    /// `base_url` may be the site root (`https://wiki.example.com`) or the
    /// API root (`https://wiki.example.com/rest/api`).
    #[must_use]
    pub fn new(base_url: &str, auth: Auth) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        let trimmed = base_url.trim_end_matches('/');
        let site_url = trimmed.strip_suffix(API_PATH).unwrap_or(trimmed).to_owned();

        Self {
            agent,
            api_url: format!("{site_url}{API_PATH}"),
            site_url,
            auth,
            headers: Vec::new(),
            dry_run: false,
        }
    }

    /// Send `headers` with every request.
    #[must_use]
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    /// Log mutating requests instead of sending them.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Whether mutating requests are suppressed.
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Get the API base URL.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Browser URL of a page.
    #[must_use]
    pub fn page_url(&self, page: &Page) -> String {
        match page.webui() {
            Some(webui) => format!("{}{}", self.site_url, webui),
            None => format!(
                "{}/pages/viewpage.action?pageId={}",
                self.site_url, page.id
            ),
        }
    }

    /// Add auth, identification and user-supplied headers to a request.
    fn authorize<B>(&self, mut request: RequestBuilder<B>) -> RequestBuilder<B> {
        request = request
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json");
        if let Some(auth) = self.auth.header_value() {
            request = request.header("Authorization", &auth);
        }
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request
    }

    /// GET `url` and decode the JSON response.
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ConfluenceError> {
        let response = self.authorize(self.agent.get(url)).call()?;
        read_json(response)
    }

    /// POST a JSON payload to `url` and decode the JSON response.
    fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<T, ConfluenceError> {
        self.send_json(self.agent.post(url), payload)
    }

    /// PUT a JSON payload to `url` and decode the JSON response.
    fn put_json<T: DeserializeOwned>(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<T, ConfluenceError> {
        self.send_json(self.agent.put(url), payload)
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder<WithBody>,
        payload: &serde_json::Value,
    ) -> Result<T, ConfluenceError> {
        let payload_bytes = serde_json::to_vec(payload)?;
        let response = self
            .authorize(request)
            .header("Content-Type", "application/json")
            .send(&payload_bytes[..])?;
        read_json(response)
    }
}

/// Log a suppressed mutating request.
fn log_dry_run(method: &str, url: &str, detail: &str) {
    info!("[dry-run] {} {}: {}", method, url, detail);
}

/// Split a `Name: value` header line. A line without a colon is a header
/// with an empty value.
#[must_use]
pub fn parse_header(raw: &str) -> (String, String) {
    match raw.split_once(':') {
        Some((name, value)) => (name.trim().to_owned(), value.trim().to_owned()),
        None => (raw.trim().to_owned(), String::new()),
    }
}

/// Decode a JSON body, turning error statuses into [`ConfluenceError::HttpResponse`].
fn read_json<T: DeserializeOwned>(response: Response<Body>) -> Result<T, ConfluenceError> {
    let status = response.status().as_u16();
    let mut body_reader = response.into_body();

    if status >= 400 {
        let error_body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ConfluenceError::HttpResponse {
            status,
            body: error_body,
        });
    }
    Ok(body_reader.read_json()?)
}

/// Percent-encode a query parameter value.
fn encode_query(value: &str) -> String {
    percent_encoding::utf8_percent_encode(value, percent_encoding::NON_ALPHANUMERIC).to_string()
}
