//! Confluence label types.

use serde::{Deserialize, Serialize};

/// Label prefix used for every label we set.
const GLOBAL_PREFIX: &str = "global";

/// Content label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Label {
    /// Label namespace.
    #[serde(default = "global_prefix")]
    pub prefix: String,
    /// Label name (Confluence lowercases it).
    pub name: String,
}

fn global_prefix() -> String {
    GLOBAL_PREFIX.to_owned()
}

impl Label {
    /// Create a label in the global namespace.
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            prefix: global_prefix(),
            name: name.into(),
        }
    }
}

/// Labels API response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelsResponse {
    /// Labels now on the page.
    #[serde(default)]
    pub results: Vec<Label>,
}
