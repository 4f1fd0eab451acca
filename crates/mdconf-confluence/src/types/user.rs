//! Confluence user types.

use serde::Deserialize;

/// Confluence user profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Cloud account ID.
    #[serde(default)]
    pub account_id: Option<String>,
    /// Server/Data Center user key.
    #[serde(default)]
    pub user_key: Option<String>,
    /// Login name.
    #[serde(default)]
    pub username: Option<String>,
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl User {
    /// Whether the response identifies an actual user.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.account_id.as_deref().is_some_and(|id| !id.is_empty())
            || self.user_key.as_deref().is_some_and(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cloud_user() {
        let json = r#"{
            "type": "known",
            "username": "foo",
            "accountId": "1234567890",
            "profilePicture": {"path": "/download/attachments/123456/user-avatar", "width": 48},
            "displayName": "Foo Bar"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();

        assert!(user.is_known());
        assert_eq!(user.account_id.as_deref(), Some("1234567890"));
        assert_eq!(user.display_name.as_deref(), Some("Foo Bar"));
    }

    #[test]
    fn test_anonymous_user_is_unknown() {
        let user: User = serde_json::from_str(r#"{"type": "anonymous"}"#).unwrap();
        assert!(!user.is_known());
    }
}
