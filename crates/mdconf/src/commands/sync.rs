//! `mdconf sync` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdconf_config::{CliSettings, Config};
use mdconf_confluence::{Auth, ConfluenceClient, parse_header};
use mdconf_renderer::ConfluenceRenderer;
use mdconf_sync::{
    DocumentState, FrontMatterParser, Placement, SyncReport, SyncSettings, Syncer, discover,
};

use crate::error::CliError;
use crate::output::Output;

/// Environment variables with this prefix become extra request headers.
const HEADER_ENV_PREFIX: &str = "CONFLUENCE_HEADER_";

/// Arguments for the sync command.
#[derive(Args)]
pub(crate) struct SyncArgs {
    /// Markdown files or directories to sync.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Confluence URL, site root or `/rest/api` root (overrides config).
    #[arg(long, env = "CONFLUENCE_API_URL")]
    api_url: Option<String>,

    /// Username for basic authentication.
    #[arg(long, env = "CONFLUENCE_USERNAME")]
    username: Option<String>,

    /// Password or API token for basic authentication.
    #[arg(long, env = "CONFLUENCE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Personal access token (takes precedence over basic authentication).
    #[arg(long, env = "CONFLUENCE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Space for pages without an explicit placement.
    #[arg(long, env = "CONFLUENCE_SPACE")]
    space: Option<String>,

    /// Parent page ID for pages at the root of the tree.
    #[arg(long, env = "CONFLUENCE_ANCESTOR_ID")]
    ancestor_id: Option<String>,

    /// Label added to every page for easier discovery.
    #[arg(long, env = "CONFLUENCE_GLOBAL_LABEL")]
    global_label: Option<String>,

    /// Extra request header as `Name: value`. May be given multiple times
    /// (default: env `CONFLUENCE_HEADER_<NAME>`).
    #[arg(long = "header", value_name = "NAME: VALUE")]
    headers: Vec<String>,

    /// Log mutating requests instead of sending them.
    #[arg(long)]
    dry_run: bool,

    /// Path to configuration file (default: auto-discover mdconf.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output and check credentials before syncing.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl SyncArgs {
    /// Execute the sync command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid, nothing was found to
    /// sync, or any document failed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let env = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
        let cli_settings = self.cli_settings(env);
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            output.detail(&format!("Using {}", path.display()));
        }

        let mut documents = discover(&self.paths);
        if documents.is_empty() {
            return Err(CliError::Validation(
                "no Markdown documents found in the given paths".to_owned(),
            ));
        }

        let confluence = &config.confluence;
        let auth = Auth::from_credentials(
            confluence.username.as_deref(),
            confluence.password.as_deref(),
            confluence.token.as_deref(),
        );
        let client = ConfluenceClient::new(&confluence.base_url, auth)
            .with_headers(confluence.header_pairs())
            .with_dry_run(self.dry_run);

        if self.verbose {
            let user = client.current_user()?;
            output.detail(&format!(
                "Authenticated as {}",
                user.display_name
                    .or(user.username)
                    .unwrap_or_else(|| "unknown user".to_owned())
            ));
        }

        let settings = SyncSettings {
            defaults: Placement::new(config.sync.space.clone(), config.sync.ancestor_id.clone()),
            global_label: config.sync.global_label.clone(),
        };
        output.info(&format!(
            "Syncing {} document(s) to {}...",
            documents.len(),
            client.api_url()
        ));

        let renderer = ConfluenceRenderer;
        let syncer = Syncer::new(&client, &FrontMatterParser, &renderer, settings);
        let report = syncer.sync(&mut documents);

        print_report(&output, &report, self.dry_run);

        let failed = report.failures().count();
        if failed > 0 {
            return Err(CliError::SyncFailed(failed));
        }
        Ok(())
    }

    /// CLI overrides, with `CONFLUENCE_HEADER_*` variables before `--header`
    /// values so explicit flags win.
    fn cli_settings(&self, vars: impl Iterator<Item = (String, String)>) -> CliSettings {
        let mut headers = env_headers(vars);
        headers.extend(self.headers.iter().map(|raw| parse_header(raw)));

        CliSettings {
            base_url: self.api_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            token: self.token.clone(),
            headers,
            space: self.space.clone(),
            ancestor_id: self.ancestor_id.clone(),
            global_label: self.global_label.clone(),
        }
    }
}

/// Headers from `CONFLUENCE_HEADER_<NAME>` variables, sorted by name.
fn env_headers(vars: impl Iterator<Item = (String, String)>) -> Vec<(String, String)> {
    let mut headers: Vec<_> = vars
        .filter_map(|(key, value)| {
            let name = key.strip_prefix(HEADER_ENV_PREFIX)?;
            (!name.is_empty()).then(|| (name.to_owned(), value))
        })
        .collect();
    headers.sort();
    headers
}

fn print_report(output: &Output, report: &SyncReport, dry_run: bool) {
    if dry_run {
        output.highlight("\n[DRY RUN] No pages were changed.");
    }

    for outcome in &report.outcomes {
        let page = outcome.page_id.as_deref().unwrap_or("-");
        let line = format!("  {} ({}) -> {}", outcome.relative_path, outcome.state, page);
        match (&outcome.error, outcome.state) {
            (Some(error), _) => output.error(&format!("{line}: {error}")),
            (None, DocumentState::Skipped) => output.detail(&line),
            (None, _) => output.info(&line),
        }
    }

    output.separator();
    let summary = format!(
        "Synced: {}  Created: {}  Skipped: {}  Failed: {}",
        report.count(DocumentState::Synced),
        report.count(DocumentState::Created),
        report.count(DocumentState::Skipped),
        report.failures().count()
    );
    if report.has_failures() {
        output.warning(&summary);
    } else {
        output.success(&summary);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: SyncArgs,
    }

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_env_headers() {
        let headers = env_headers(
            vars(&[
                ("CONFLUENCE_HEADER_X_TRACE", "1"),
                ("HOME", "/root"),
                ("CONFLUENCE_HEADER_", "ignored"),
                ("CONFLUENCE_HEADER_A", "first"),
            ])
            .into_iter(),
        );
        assert_eq!(
            headers,
            vec![
                ("A".to_owned(), "first".to_owned()),
                ("X_TRACE".to_owned(), "1".to_owned()),
            ]
        );
    }

    #[test]
    fn test_cli_settings_put_flags_after_env_headers() {
        let cli = TestCli::try_parse_from([
            "mdconf",
            "docs",
            "--api-url",
            "https://wiki.example.com",
            "--space",
            "DOCS",
            "--header",
            "X-Trace: 2",
            "--dry-run",
        ])
        .unwrap();
        assert!(cli.args.dry_run);
        assert_eq!(cli.args.paths, vec![PathBuf::from("docs")]);

        let settings = cli
            .args
            .cli_settings(vars(&[("CONFLUENCE_HEADER_X-Trace", "1")]).into_iter());
        assert_eq!(settings.base_url.as_deref(), Some("https://wiki.example.com"));
        assert_eq!(settings.space.as_deref(), Some("DOCS"));
        assert_eq!(
            settings.headers,
            vec![
                ("X-Trace".to_owned(), "1".to_owned()),
                ("X-Trace".to_owned(), "2".to_owned()),
            ]
        );
    }

    #[test]
    fn test_paths_are_required() {
        assert!(TestCli::try_parse_from(["mdconf"]).is_err());
    }
}
