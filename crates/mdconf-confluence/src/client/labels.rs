//! Label operations for Confluence API.

use tracing::{error, info};

use super::{ConfluenceClient, log_dry_run};
use crate::error::ConfluenceError;
use crate::types::{Label, LabelsResponse};

impl ConfluenceClient {
    /// Add the ID label and `tags` to a page.
    ///
    /// The ID label is how the page is found again, so a response without it
    /// is logged as an error. Existing labels are left in place.
    pub(crate) fn add_labels(
        &self,
        page_id: &str,
        id_label: &str,
        tags: &[String],
    ) -> Result<Vec<Label>, ConfluenceError> {
        let url = format!("{}/content/{}/label", self.api_url(), page_id);
        let labels = label_payload(id_label, tags);

        if self.dry_run {
            let names: Vec<_> = labels.iter().map(|l| l.name.as_str()).collect();
            log_dry_run("POST", &url, &names.join(", "));
            return Ok(labels);
        }

        let response: LabelsResponse = self.post_json(&url, &serde_json::to_value(&labels)?)?;
        if !contains_label(&response.results, id_label) {
            error!(
                "Labels returned for page {} are missing {}: {:?}",
                page_id, id_label, response.results
            );
            return Ok(response.results);
        }

        info!(
            "Labels on page {}: {}",
            page_id,
            response
                .results
                .iter()
                .map(|l| l.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(response.results)
    }
}

/// Labels to send: the ID label first, then the tags.
fn label_payload(id_label: &str, tags: &[String]) -> Vec<Label> {
    std::iter::once(id_label)
        .chain(tags.iter().map(String::as_str))
        .map(Label::global)
        .collect()
}

fn contains_label(labels: &[Label], name: &str) -> bool {
    labels.iter().any(|l| l.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_label_payload() {
        let labels = label_payload(
            "example-post",
            &["knowledge".to_owned(), "testing".to_owned()],
        );
        assert_eq!(
            serde_json::to_value(&labels).unwrap(),
            json!([
                {"prefix": "global", "name": "example-post"},
                {"prefix": "global", "name": "knowledge"},
                {"prefix": "global", "name": "testing"}
            ])
        );
    }

    #[test]
    fn test_response_sanity_check() {
        let response: LabelsResponse = serde_json::from_value(json!({
            "results": [
                {"prefix": "global", "name": "aid_a_2emd", "id": "1"},
                {"prefix": "global", "name": "ops", "id": "2"}
            ],
            "size": 2
        }))
        .unwrap();

        assert!(contains_label(&response.results, "aid_a_2emd"));
        assert!(!contains_label(&response.results, "aid_b_2emd"));
    }
}
