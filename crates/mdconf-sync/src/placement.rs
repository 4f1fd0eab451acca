//! Page placement: the (space, parent page) pair a page lives under.
//!
//! Placement comes from three sources, in priority order:
//! 1. the document's own front matter override,
//! 2. the parent document's resolved page,
//! 3. the run-level default.
//!
//! Each field is merged independently with [`Placement::or`], so a document
//! that only declares a space still inherits its parent page.

/// Optional space key and optional parent page ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    /// Space key.
    pub space: Option<String>,
    /// Parent page ID.
    pub ancestor_id: Option<String>,
}

impl Placement {
    /// Create a placement, treating blank strings as unset.
    pub fn new(space: Option<String>, ancestor_id: Option<String>) -> Self {
        Self {
            space: space.filter(|s| !s.trim().is_empty()),
            ancestor_id: ancestor_id.filter(|s| !s.trim().is_empty()),
        }
    }

    /// Fill missing fields from `fallback`, keeping the ones already set.
    #[must_use]
    pub fn or(self, fallback: &Placement) -> Self {
        Self {
            space: self.space.or_else(|| fallback.space.clone()),
            ancestor_id: self.ancestor_id.or_else(|| fallback.ancestor_id.clone()),
        }
    }

    /// Whether both fields are set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.space.is_some() && self.ancestor_id.is_some()
    }

    /// Both fields, or the name of the first missing one.
    pub fn into_resolved(self) -> Result<ResolvedPlacement, &'static str> {
        match (self.space, self.ancestor_id) {
            (Some(space), Some(ancestor_id)) => Ok(ResolvedPlacement { space, ancestor_id }),
            (None, _) => Err("space"),
            (Some(_), None) => Err("ancestor_id"),
        }
    }
}

/// Placement with both fields known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlacement {
    /// Space key.
    pub space: String,
    /// Parent page ID.
    pub ancestor_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(space: Option<&str>, ancestor: Option<&str>) -> Placement {
        Placement::new(space.map(str::to_owned), ancestor.map(str::to_owned))
    }

    #[test]
    fn test_or_keeps_set_fields() {
        let merged = placement(Some("OWN"), Some("1")).or(&placement(Some("DEF"), Some("2")));
        assert_eq!(merged, placement(Some("OWN"), Some("1")));
    }

    #[test]
    fn test_or_fills_missing_fields_independently() {
        let merged = placement(Some("OWN"), None).or(&placement(Some("DEF"), Some("2")));
        assert_eq!(merged, placement(Some("OWN"), Some("2")));

        let merged = placement(None, Some("1")).or(&placement(Some("DEF"), Some("2")));
        assert_eq!(merged, placement(Some("DEF"), Some("1")));
    }

    #[test]
    fn test_chain_of_three_sources() {
        let own = placement(None, None);
        let parent = placement(None, Some("10"));
        let default = placement(Some("DEF"), Some("99"));
        let merged = own.or(&parent).or(&default);
        assert_eq!(merged, placement(Some("DEF"), Some("10")));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let p = placement(Some("  "), Some(""));
        assert_eq!(p, Placement::default());
    }

    #[test]
    fn test_into_resolved_reports_missing_field() {
        assert_eq!(placement(None, Some("1")).into_resolved(), Err("space"));
        assert_eq!(placement(Some("S"), None).into_resolved(), Err("ancestor_id"));
        assert_eq!(
            placement(Some("S"), Some("1")).into_resolved(),
            Ok(ResolvedPlacement {
                space: "S".to_owned(),
                ancestor_id: "1".to_owned(),
            })
        );
    }
}
