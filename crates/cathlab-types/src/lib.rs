//! Shared value types for the cathlab workspace.
//!
//! Catalog keys and preset names must never be blank, so they are carried as
//! [`NonEmptyText`]. Free-text patient fields are plain `String`s because blank
//! values are legitimate there.

use std::borrow::Borrow;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input was empty or contained only whitespace.
    #[error("text cannot be empty")]
    Empty,
}

/// A trimmed string that holds at least one non-whitespace character.
///
/// Used for equipment names and operation names, which act as lookup keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText`, trimming leading and trailing whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if nothing remains after trimming.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NonEmptyText {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for NonEmptyText {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn trims_surrounding_whitespace() {
        let text = NonEmptyText::new("  Contrast media \t").expect("non-empty");
        assert_eq!(text.as_str(), "Contrast media");
    }

    #[test]
    fn rejects_blank_input() {
        assert_eq!(NonEmptyText::new(""), Err(TextError::Empty));
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
    }

    #[test]
    fn borrows_as_str_for_map_lookups() {
        let mut map = HashMap::new();
        map.insert(NonEmptyText::new("Coil").expect("non-empty"), 5u32);
        assert_eq!(map.get("Coil"), Some(&5));
    }

    #[test]
    fn deserialize_rejects_blank_strings() {
        let ok: NonEmptyText = serde_json::from_str("\"SL10\"").expect("valid");
        assert_eq!(ok.as_str(), "SL10");

        let err = serde_json::from_str::<NonEmptyText>("\"  \"").expect_err("blank");
        assert!(err.to_string().contains("cannot be empty"));
    }
}
