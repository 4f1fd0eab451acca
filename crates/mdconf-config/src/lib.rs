//! Configuration management for mdconf.
//!
//! Parses `mdconf.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`]; they take
//! precedence over file values, and validation runs after they are applied.
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Values that expand to an empty string count as unset, so
//! `token = "${CONFLUENCE_TOKEN:-}"` is a token only when the variable is set.

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override Confluence base URL.
    pub base_url: Option<String>,
    /// Override basic auth username.
    pub username: Option<String>,
    /// Override basic auth password.
    pub password: Option<String>,
    /// Override bearer token.
    pub token: Option<String>,
    /// Extra headers, replacing file headers with the same name.
    pub headers: Vec<(String, String)>,
    /// Override default space key.
    pub space: Option<String>,
    /// Override default ancestor page ID.
    pub ancestor_id: Option<String>,
    /// Override label added to every page.
    pub global_label: Option<String>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "mdconf.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence connection.
    pub confluence: ConfluenceConfig,
    /// Sync defaults.
    pub sync: SyncConfig,
    /// Path to the loaded file, if any.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[confluence]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfluenceConfig {
    /// Confluence server URL, either the site root or its `/rest/api` root.
    pub base_url: String,
    /// Basic auth username.
    pub username: Option<String>,
    /// Basic auth password or API token.
    pub password: Option<String>,
    /// Bearer token; wins over basic auth when set.
    pub token: Option<String>,
    /// Extra headers sent with every request.
    pub headers: BTreeMap<String, String>,
}

/// `[sync]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Space key for pages whose placement is not otherwise known.
    pub space: Option<String>,
    /// Parent page ID for pages at the root of the tree.
    pub ancestor_id: Option<String>,
    /// Label added to every synced page.
    pub global_label: Option<String>,
}

impl ConfluenceConfig {
    /// Validate connection settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if `base_url` is missing or not an
    /// http(s) URL, or a username is given without a password.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "confluence.base_url")?;
        require_http_url(&self.base_url, "confluence.base_url")?;
        if self.username.is_some() && self.password.is_none() && self.token.is_none() {
            return Err(ConfigError::Validation(
                "confluence.username requires confluence.password".to_owned(),
            ));
        }
        Ok(())
    }

    /// Headers as name/value pairs, sorted by name.
    #[must_use]
    pub fn header_pairs(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`confluence.token`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_TOKEN`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Turn blank strings into `None`.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdconf.toml` in current directory and parents,
    /// falling back to an empty configuration when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing or
    /// expansion fails, or the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Some(path.to_path_buf())
            }
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| discover_config(&cwd)),
        };

        let mut config = match discovered {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.normalize();
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.confluence.validate()
    }

    /// Load configuration from a specific file without validating it.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        let confluence = &mut self.confluence;
        if let Some(base_url) = &settings.base_url {
            confluence.base_url.clone_from(base_url);
        }
        if let Some(username) = &settings.username {
            confluence.username = Some(username.clone());
        }
        if let Some(password) = &settings.password {
            confluence.password = Some(password.clone());
        }
        if let Some(token) = &settings.token {
            confluence.token = Some(token.clone());
        }
        for (name, value) in &settings.headers {
            confluence.headers.insert(name.clone(), value.clone());
        }

        let sync = &mut self.sync;
        if let Some(space) = &settings.space {
            sync.space = Some(space.clone());
        }
        if let Some(ancestor_id) = &settings.ancestor_id {
            sync.ancestor_id = Some(ancestor_id.clone());
        }
        if let Some(global_label) = &settings.global_label {
            sync.global_label = Some(global_label.clone());
        }
    }

    fn normalize(&mut self) {
        let confluence = &mut self.confluence;
        confluence.base_url = confluence.base_url.trim().to_owned();
        confluence.username = non_blank(confluence.username.take());
        confluence.password = non_blank(confluence.password.take());
        confluence.token = non_blank(confluence.token.take());

        let sync = &mut self.sync;
        sync.space = non_blank(sync.space.take());
        sync.ancestor_id = non_blank(sync.ancestor_id.take());
        sync.global_label = non_blank(sync.global_label.take());
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let confluence = &mut self.confluence;
        expand::expand_field(&mut confluence.base_url, "confluence.base_url")?;
        expand::expand_opt_field(&mut confluence.username, "confluence.username")?;
        expand::expand_opt_field(&mut confluence.password, "confluence.password")?;
        expand::expand_opt_field(&mut confluence.token, "confluence.token")?;
        for (name, value) in &mut confluence.headers {
            expand::expand_field(value, &format!("confluence.headers.{name}"))?;
        }

        let sync = &mut self.sync;
        expand::expand_opt_field(&mut sync.space, "sync.space")?;
        expand::expand_opt_field(&mut sync.ancestor_id, "sync.ancestor_id")?;
        expand::expand_opt_field(&mut sync.global_label, "sync.global_label")?;

        Ok(())
    }
}

/// Search for config file in `start` and its parents.
fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}
