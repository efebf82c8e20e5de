//! Small validated value types shared across the catalog crates.

use std::fmt;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
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

/// A numeric score attached to a movie or an opinion.
///
/// Ratings are never rejected. Input that does not start with a number becomes the
/// *invalid* rating, which is stored and serialised as JSON `null`. The 0-10 range shown
/// in the UI is a convention and is not enforced here.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rating(Option<f64>);

impl Rating {
    /// Wraps a number. Non-finite values become the invalid rating.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(Some(value))
        } else {
            Self(None)
        }
    }

    /// The invalid rating.
    pub const fn invalid() -> Self {
        Self(None)
    }

    /// Parses the longest numeric prefix of `input`, ignoring leading whitespace.
    ///
    /// `"9"`, `" 7.5 "` and `"8/10"` all yield a number; `"great"` and `""` yield the
    /// invalid rating.
    pub fn parse_lenient(input: &str) -> Self {
        let trimmed = input.trim_start();
        let end = numeric_prefix_len(trimmed);
        trimmed[..end]
            .parse::<f64>()
            .map(Self::new)
            .unwrap_or_default()
    }

    /// Returns the numeric value, or `None` for the invalid rating.
    pub fn value(&self) -> Option<f64> {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }
}

impl From<f64> for Rating {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{}", value),
            None => write!(f, "invalid"),
        }
    }
}

/// Length in bytes of the leading `[+-]digits[.digits][e[+-]digits]` run of `input`.
fn numeric_prefix_len(input: &str) -> usize {
    let bytes = input.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }

    if digits == 0 {
        return 0;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    i
}

impl serde::Serialize for Rating {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.0 {
            Some(value) => serializer.serialize_f64(value),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Rating {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum RawRating {
            Number(f64),
            Text(String),
        }

        Ok(match Option::<RawRating>::deserialize(deserializer)? {
            Some(RawRating::Number(value)) => Rating::new(value),
            Some(RawRating::Text(text)) => Rating::parse_lenient(&text),
            None => Rating::invalid(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  poster.png ").unwrap();
        assert_eq!(text.as_str(), "poster.png");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert!(matches!(NonEmptyText::new("   "), Err(TextError::Empty)));
    }

    #[test]
    fn parse_lenient_reads_plain_numbers() {
        assert_eq!(Rating::parse_lenient("9").value(), Some(9.0));
        assert_eq!(Rating::parse_lenient(" 7.5 ").value(), Some(7.5));
        assert_eq!(Rating::parse_lenient("-1").value(), Some(-1.0));
        assert_eq!(Rating::parse_lenient(".5").value(), Some(0.5));
        assert_eq!(Rating::parse_lenient("1e1").value(), Some(10.0));
    }

    #[test]
    fn parse_lenient_takes_numeric_prefix() {
        assert_eq!(Rating::parse_lenient("8/10").value(), Some(8.0));
        assert_eq!(Rating::parse_lenient("6.").value(), Some(6.0));
        assert_eq!(Rating::parse_lenient("3e").value(), Some(3.0));
    }

    #[test]
    fn parse_lenient_yields_invalid_for_text() {
        assert!(!Rating::parse_lenient("great").is_valid());
        assert!(!Rating::parse_lenient("").is_valid());
        assert!(!Rating::parse_lenient(".").is_valid());
        assert!(!Rating::parse_lenient("-").is_valid());
    }

    #[test]
    fn non_finite_values_are_invalid() {
        assert!(!Rating::new(f64::NAN).is_valid());
        assert!(!Rating::new(f64::INFINITY).is_valid());
    }

    #[test]
    fn invalid_rating_serialises_as_null() {
        let json = serde_json::to_string(&Rating::invalid()).unwrap();
        assert_eq!(json, "null");
        let json = serde_json::to_string(&Rating::new(9.0)).unwrap();
        assert_eq!(json, "9.0");
    }

    #[test]
    fn rating_deserialises_numbers_strings_and_null() {
        let from_int: Rating = serde_json::from_str("9").unwrap();
        let from_float: Rating = serde_json::from_str("7.5").unwrap();
        let from_text: Rating = serde_json::from_str("\"8\"").unwrap();
        let from_junk: Rating = serde_json::from_str("\"meh\"").unwrap();
        let from_null: Rating = serde_json::from_str("null").unwrap();

        assert_eq!(from_int.value(), Some(9.0));
        assert_eq!(from_float.value(), Some(7.5));
        assert_eq!(from_text.value(), Some(8.0));
        assert!(!from_junk.is_valid());
        assert!(!from_null.is_valid());
    }

    #[test]
    fn display_shows_value_or_invalid() {
        assert_eq!(Rating::new(9.5).to_string(), "9.5");
        assert_eq!(Rating::invalid().to_string(), "invalid");
    }
}
