//! `${VAR}` and `${VAR:-default}` expansion for configuration values.
//!
//! Values are expanded in place after parsing. A value without `${` is
//! never touched, so passwords containing a bare `$` survive as written.

use crate::ConfigError;

/// Expand `value` in place against the process environment.
pub(crate) fn expand_field(value: &mut String, field: &str) -> Result<(), ConfigError> {
    expand_with(value, field, |var| std::env::var(var).ok())
}

/// Expand an optional value in place; `None` stays `None`.
pub(crate) fn expand_opt_field(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    match value {
        Some(value) => expand_field(value, field),
        None => Ok(()),
    }
}

fn expand_with(
    value: &mut String,
    field: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if !value.contains("${") {
        return Ok(());
    }

    let expanded = shellexpand::env_with_context(value.as_str(), |var| {
        lookup(var).map(Some).ok_or(())
    })
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.var_name),
    })?;
    *value = expanded.into_owned();
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn expand(value: &str, vars: &[(&str, &str)]) -> Result<String, ConfigError> {
        let vars: HashMap<_, _> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        let mut value = value.to_owned();
        expand_with(&mut value, "confluence.token", |var| vars.get(var).cloned())?;
        Ok(value)
    }

    #[test]
    fn test_expands_embedded_variables() {
        assert_eq!(
            expand(
                "https://${HOST}/${BASE:-wiki}",
                &[("HOST", "example.com")]
            )
            .unwrap(),
            "https://example.com/wiki"
        );
    }

    #[test]
    fn test_empty_default_expands_to_empty() {
        assert_eq!(expand("${CONFLUENCE_TOKEN:-}", &[]).unwrap(), "");
    }

    #[test]
    fn test_unset_variable_names_field_and_variable() {
        let err = expand("${CONFLUENCE_TOKEN}", &[]).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert_eq!(
            err.to_string(),
            "Environment variable error in confluence.token: ${CONFLUENCE_TOKEN} not set"
        );
    }

    #[test]
    fn test_bare_dollar_is_literal() {
        assert_eq!(expand("pa$word", &[]).unwrap(), "pa$word");
        assert_eq!(expand("$HOME", &[("HOME", "/root")]).unwrap(), "$HOME");
    }

    #[test]
    fn test_none_stays_none() {
        let mut value = None;
        expand_opt_field(&mut value, "confluence.username").unwrap();
        assert_eq!(value, None);
    }
}
