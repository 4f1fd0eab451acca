//! Error types for Confluence integration.

use mdconf_sync::{RemoteError, RemoteErrorKind};

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// Response parsed but lacked something the caller needs.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<ConfluenceError> for RemoteError {
    fn from(err: ConfluenceError) -> Self {
        let remote = match &err {
            ConfluenceError::HttpResponse { status, .. } => RemoteError::from_status(*status),
            ConfluenceError::HttpRequest(_) => RemoteError::new(RemoteErrorKind::Transport),
            ConfluenceError::Io(_)
            | ConfluenceError::Json(_)
            | ConfluenceError::UnexpectedResponse(_) => RemoteError::new(RemoteErrorKind::Other),
        };
        remote.with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_response_maps_to_status_kind() {
        let err: RemoteError = ConfluenceError::HttpResponse {
            status: 403,
            body: "forbidden".to_owned(),
        }
        .into();
        assert_eq!(err.kind, RemoteErrorKind::Unauthorized);
        assert_eq!(err.status, Some(403));
        assert!(err.downcast_source::<ConfluenceError>().is_some());
    }

    #[test]
    fn test_unexpected_response_maps_to_other() {
        let err: RemoteError = ConfluenceError::UnexpectedResponse("no id".to_owned()).into();
        assert_eq!(err.kind, RemoteErrorKind::Other);
        assert_eq!(err.to_string(), "Error: unexpected response: no id");
    }
}
