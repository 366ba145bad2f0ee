//! Typed queries against the context graph.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A query `{types, name, property, value, fuzzy}` resolved against the
/// context graph.
///
/// An empty `types` list means "use the expected types supplied by the
/// caller".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Selector {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fuzzy: bool,
}

impl Selector {
    /// Select a struct by name, with types left to the caller.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        let fuzzy = name.split_whitespace().nth(1).is_some();
        Selector {
            name: Some(name),
            fuzzy,
            ..Selector::default()
        }
    }

    /// Select a struct of one of `types` by name.
    pub fn typed(types: &[&str], name: impl Into<String>) -> Self {
        Selector {
            types: types.iter().map(|t| (*t).to_string()).collect(),
            ..Selector::named(name)
        }
    }

    /// Select the first struct whose `property` equals `value`.
    pub fn by_property(
        types: &[&str],
        property: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        Selector {
            types: types.iter().map(|t| (*t).to_string()).collect(),
            property: Some(property.into()),
            value: Some(value),
            ..Selector::default()
        }
    }

    #[must_use]
    pub fn with_fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    /// Candidate types: the selector's own, else the expected ones.
    pub fn candidate_types<'a>(&'a self, expected: &'a [String]) -> &'a [String] {
        if self.types.is_empty() {
            expected
        } else {
            &self.types
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.types.is_empty() {
            write!(f, "{}", self.types.join("|"))?;
        }
        if let Some(name) = &self.name {
            write!(f, ".{name}")?;
        }
        if let Some(property) = &self.property {
            write!(f, "[{property}")?;
            if let Some(value) = &self.value {
                write!(f, "={value}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_word_names_are_fuzzy() {
        assert!(!Selector::named("hero").fuzzy);
        assert!(Selector::named("hero happy").fuzzy);
    }

    #[test]
    fn test_candidate_types_fall_back_to_expected() {
        let expected = vec!["image".to_string()];
        assert_eq!(Selector::named("hero").candidate_types(&expected), &expected[..]);

        let explicit = Selector::typed(&["audio"], "theme");
        assert_eq!(explicit.candidate_types(&expected), &["audio".to_string()][..]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Selector::typed(&["image"], "hero").to_string(), "image.hero");
        let by_prop = Selector::by_property(&["font"], "family", serde_json::json!("Roboto"));
        assert_eq!(by_prop.to_string(), "font[family=\"Roboto\"]");
    }
}
