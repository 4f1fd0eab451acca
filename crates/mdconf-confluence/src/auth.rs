//! Request authentication.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// How requests authenticate against Confluence.
#[derive(Clone, Default)]
pub enum Auth {
    /// No `Authorization` header.
    #[default]
    Anonymous,
    /// HTTP basic auth with a username and password (or API token).
    Basic {
        /// Login name or e-mail.
        username: String,
        /// Password or API token.
        password: String,
    },
    /// Personal access token.
    Bearer(String),
}

impl Auth {
    /// Pick bearer auth when a token is set, else basic auth when a username
    /// is set, else anonymous.
    #[must_use]
    pub fn from_credentials(
        username: Option<&str>,
        password: Option<&str>,
        token: Option<&str>,
    ) -> Self {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            return Self::Bearer(token.to_owned());
        }
        match username.filter(|u| !u.is_empty()) {
            Some(username) => Self::Basic {
                username: username.to_owned(),
                password: password.unwrap_or_default().to_owned(),
            },
            None => Self::Anonymous,
        }
    }

    /// Value of the `Authorization` header, if any.
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        match self {
            Self::Anonymous => None,
            Self::Basic { username, password } => Some(format!(
                "Basic {}",
                STANDARD.encode(format!("{username}:{password}"))
            )),
            Self::Bearer(token) => Some(format!("Bearer {token}")),
        }
    }
}

// Credentials stay out of logs.
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::Bearer(_) => f.write_str("Bearer(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_header() {
        let auth = Auth::from_credentials(Some("foo"), Some("bar"), None);
        assert_eq!(auth.header_value().as_deref(), Some("Basic Zm9vOmJhcg=="));
    }

    #[test]
    fn test_token_wins_over_basic() {
        let auth = Auth::from_credentials(Some("foo"), Some("bar"), Some("pat"));
        assert_eq!(auth.header_value().as_deref(), Some("Bearer pat"));
    }

    #[test]
    fn test_anonymous() {
        let auth = Auth::from_credentials(None, None, Some(""));
        assert!(auth.header_value().is_none());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let auth = Auth::from_credentials(Some("foo"), Some("secret"), None);
        let debug = format!("{auth:?}");
        assert!(!debug.contains("secret"));
        assert!(format!("{:?}", Auth::Bearer("pat".to_owned())).contains(".."));
    }
}
