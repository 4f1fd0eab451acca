//! Page operations for Confluence API.

use serde_json::json;
use tracing::{debug, info};

use super::{ConfluenceClient, DRY_RUN_ID_PREFIX, encode_query, log_dry_run};
use crate::error::ConfluenceError;
use crate::types::{Page, SearchResponse, Version};

/// Content fields of a create or update request.
pub(crate) struct PageContent<'a> {
    pub title: &'a str,
    pub space: &'a str,
    pub ancestor_id: &'a str,
    pub body: &'a str,
}

impl ConfluenceClient {
    /// Find the page carrying `label` below `ancestor_id` in `space`.
    pub(crate) fn find_by_label(
        &self,
        label: &str,
        space: &str,
        ancestor_id: &str,
    ) -> Result<Option<Page>, ConfluenceError> {
        if self.dry_run && ancestor_id.starts_with(DRY_RUN_ID_PREFIX) {
            debug!("Parent {} only exists in this dry run", ancestor_id);
            return Ok(None);
        }

        let cql = label_query(label, space, ancestor_id);
        let url = format!(
            "{}/content/search?cql={}&expand=version",
            self.api_url(),
            encode_query(&cql)
        );

        info!("Searching for page with label {}", label);
        let response: SearchResponse = self.get_json(&url)?;
        if response.size == 0 {
            return Ok(None);
        }
        Ok(response.results.into_iter().next())
    }

    /// Create a page; dry runs answer with a `dry-run:<label>` ID.
    pub(crate) fn create_page(
        &self,
        label: &str,
        content: &PageContent<'_>,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content", self.api_url());
        let payload = page_payload(content, None);

        if self.dry_run {
            log_dry_run("POST", &url, &payload.to_string());
            return Ok(synthetic_page(
                &format!("{DRY_RUN_ID_PREFIX}{label}"),
                content.title,
                1,
            ));
        }

        info!(
            "Creating page '{}' in space {} under {}",
            content.title, content.space, content.ancestor_id
        );
        let page: Page = self.post_json(&url, &payload)?;
        info!(
            "Page '{}' (id {}) created at {}",
            content.title,
            page.id,
            self.page_url(&page)
        );
        Ok(page)
    }

    /// Replace page content (auto-increments version).
    pub(crate) fn update_page(
        &self,
        page_id: &str,
        content: &PageContent<'_>,
        version: u32,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), page_id);
        let payload = page_payload(content, Some(version + 1));

        if self.dry_run {
            log_dry_run("PUT", &url, &format!("'{}' version {}", content.title, version + 1));
            return Ok(synthetic_page(page_id, content.title, version + 1));
        }

        info!(
            "Updating page {} from version {} to {}",
            page_id,
            version,
            version + 1
        );
        let page: Page = self.put_json(&url, &payload)?;
        info!(
            "Page '{}' (id {}) updated at {}",
            content.title,
            page_id,
            self.page_url(&page)
        );
        Ok(page)
    }
}

/// CQL matching the page labelled `label` under `ancestor_id` in `space`.
fn label_query(label: &str, space: &str, ancestor_id: &str) -> String {
    format!(
        "label=\"{}\" and ancestor=\"{}\" and space=\"{}\"",
        escape_cql(label),
        escape_cql(ancestor_id),
        escape_cql(space)
    )
}

fn escape_cql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// JSON body for creating (`version` unset) or updating a page.
fn page_payload(content: &PageContent<'_>, version: Option<u32>) -> serde_json::Value {
    let mut payload = json!({
        "type": "page",
        "title": content.title,
        "space": {"key": content.space},
        "body": {
            "storage": {
                "value": content.body,
                "representation": "storage"
            }
        },
        "ancestors": [{"id": content.ancestor_id}]
    });

    if let Some(number) = version {
        payload["version"] = json!({"number": number});
    }
    payload
}

fn synthetic_page(id: &str, title: &str, version: u32) -> Page {
    Page {
        id: id.to_owned(),
        title: title.to_owned(),
        version: Some(Version { number: version }),
        links: None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::auth::Auth;

    fn content() -> PageContent<'static> {
        PageContent {
            title: "Release process",
            space: "DOCS",
            ancestor_id: "12345",
            body: "<p>Hi</p>",
        }
    }

    #[test]
    fn test_label_query() {
        assert_eq!(
            label_query("aid_a_2emd", "DOCS", "12345"),
            "label=\"aid_a_2emd\" and ancestor=\"12345\" and space=\"DOCS\""
        );
    }

    #[test]
    fn test_label_query_escapes_quotes() {
        assert_eq!(
            label_query("x", "A\"B", "1"),
            "label=\"x\" and ancestor=\"1\" and space=\"A\\\"B\""
        );
    }

    #[test]
    fn test_label_query_keeps_ancestor_quoted() {
        assert_eq!(
            label_query("x", "DOCS", "1 or space=\"OTHER\""),
            "label=\"x\" and ancestor=\"1 or space=\\\"OTHER\\\"\" and space=\"DOCS\""
        );
    }

    #[test]
    fn test_create_payload_has_no_version() {
        let payload = page_payload(&content(), None);
        assert_eq!(
            payload,
            json!({
                "type": "page",
                "title": "Release process",
                "space": {"key": "DOCS"},
                "body": {"storage": {"value": "<p>Hi</p>", "representation": "storage"}},
                "ancestors": [{"id": "12345"}]
            })
        );
    }

    #[test]
    fn test_update_payload_carries_version() {
        let payload = page_payload(&content(), Some(4));
        assert_eq!(payload["version"], json!({"number": 4}));
        assert_eq!(payload["ancestors"][0]["id"], "12345");
    }

    #[test]
    fn test_dry_run_create_and_update_are_synthetic() {
        let client = ConfluenceClient::new("https://wiki.invalid", Auth::Anonymous).with_dry_run(true);

        let page = client.create_page("aid_a", &content()).unwrap();
        assert_eq!(page.id, "dry-run:aid_a");
        assert_eq!(page.version_number(), 1);

        let page = client.update_page(&page.id, &content(), 1).unwrap();
        assert_eq!(page.version_number(), 2);
    }

    #[test]
    fn test_dry_run_search_under_synthetic_parent_is_local() {
        let client = ConfluenceClient::new("https://wiki.invalid", Auth::Anonymous).with_dry_run(true);
        let found = client
            .find_by_label("aid_a", "DOCS", "dry-run:aid_guide")
            .unwrap();
        assert!(found.is_none());
    }
}
