//! Attachment operations for Confluence API.

use std::path::Path;

use rand::RngExt;
use tracing::{info, warn};

use super::{ConfluenceClient, log_dry_run, read_json};
use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentsResponse};

impl ConfluenceClient {
    /// Upload a local file to a page, updating a same-named attachment in place.
    ///
    /// Returns `None` when the file does not exist; the page is still updated
    /// and the image shows as broken until the file is added.
    pub(crate) fn upload_file(
        &self,
        page_id: &str,
        path: &Path,
    ) -> Result<Option<Attachment>, ConfluenceError> {
        if !path.is_file() {
            warn!("Attachment {} does not exist, skipping", path.display());
            return Ok(None);
        }
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if self.dry_run {
            let url = format!("{}/content/{}/child/attachment", self.api_url(), page_id);
            log_dry_run("POST", &url, &path.display().to_string());
            return Ok(None);
        }

        let data = std::fs::read(path)?;
        self.upload_attachment(page_id, &filename, &data, content_type(path))
            .map(Some)
    }

    /// Upload or update attachment (upsert by filename).
    fn upload_attachment(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<Attachment, ConfluenceError> {
        // Check if attachment already exists
        let existing = self.find_attachment_by_name(page_id, filename)?;

        let url = if let Some(ref att) = existing {
            info!(
                "Updating existing attachment '{}' (id={})",
                filename, att.id
            );
            format!(
                "{}/content/{}/child/attachment/{}/data",
                self.api_url(),
                page_id,
                att.id
            )
        } else {
            info!(
                "Uploading new attachment '{}' to page {}",
                filename, page_id
            );
            format!("{}/content/{}/child/attachment", self.api_url(), page_id)
        };

        let boundary = format!("----MdconfFormBoundary{:016x}", rand::rng().random::<u64>());
        let body = multipart_body(&boundary, filename, content_type, data);

        let response = self
            .authorize(self.agent.post(&url))
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("X-Atlassian-Token", "nocheck")
            .send(&body[..])?;

        // Response is a list for new uploads, single object for updates
        if existing.is_some() {
            read_json(response)
        } else {
            let response: AttachmentsResponse = read_json(response)?;
            response.results.into_iter().next().ok_or_else(|| {
                ConfluenceError::UnexpectedResponse("empty attachment response".to_owned())
            })
        }
    }

    /// List attachments on a page.
    fn get_attachments(&self, page_id: &str) -> Result<AttachmentsResponse, ConfluenceError> {
        let url = format!("{}/content/{}/child/attachment", self.api_url(), page_id);
        self.get_json(&url)
    }

    /// Find attachment by filename on a page.
    fn find_attachment_by_name(
        &self,
        page_id: &str,
        filename: &str,
    ) -> Result<Option<Attachment>, ConfluenceError> {
        let attachments = self.get_attachments(page_id)?;
        Ok(attachments
            .results
            .into_iter()
            .find(|a| a.title == filename))
    }
}

/// Build a `multipart/form-data` body with a single `file` part.
fn multipart_body(boundary: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

/// MIME type by file extension.
fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::auth::Auth;

    #[test]
    fn test_multipart_body() {
        let body = multipart_body("XYZ", "a.png", "image/png", b"DATA");
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "--XYZ\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"a.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             DATA\r\n\
             --XYZ--\r\n"
        );
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type(Path::new("img/Logo.PNG")), "image/png");
        assert_eq!(content_type(Path::new("diagram.svg")), "image/svg+xml");
        assert_eq!(content_type(Path::new("archive")), "application/octet-stream");
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let client = ConfluenceClient::new("https://wiki.invalid", Auth::Anonymous);
        let uploaded = client
            .upload_file("1", Path::new("/nonexistent/img.png"))
            .unwrap();
        assert!(uploaded.is_none());
    }

    #[test]
    fn test_dry_run_does_not_upload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.png");
        std::fs::write(&path, b"png").unwrap();

        let client = ConfluenceClient::new("https://wiki.invalid", Auth::Anonymous).with_dry_run(true);
        assert!(client.upload_file("dry-run:aid_a", &path).unwrap().is_none());
    }
}
