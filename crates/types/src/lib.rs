//! Validated value types shared by the HMS crates.
//!
//! Everything here is constructed through a checking constructor, so code that
//! receives one of these types can rely on the invariant without re-validating.

/// Errors that can occur when creating validated values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    /// The input text contained a comma, which the flat CSV files cannot hold
    #[error("Text cannot contain ','")]
    ContainsDelimiter,

    /// A priority level outside `1..=5`, or not a number at all
    #[error("priority must be a number from 1 to 5, got '{0}'")]
    InvalidPriority(String),
}

/// A string type that guarantees non-empty, comma-free content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
/// Commas are rejected because every HMS data file is an unquoted CSV.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if the trimmed input is empty and
    /// [`TextError::ContainsDelimiter`] if it contains a comma.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        if trimmed.contains(',') {
            return Err(TextError::ContainsDelimiter);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
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

/// Triage priority of an emergency case, `1` (most urgent) to `5` (least urgent).
///
/// Ordering follows urgency: `PriorityLevel(1) < PriorityLevel(5)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PriorityLevel(u8);

impl PriorityLevel {
    pub const LEAST_URGENT: PriorityLevel = PriorityLevel(5);

    /// Creates a priority level, rejecting values outside `1..=5`.
    pub fn new(level: u8) -> Result<Self, TextError> {
        if (1..=5).contains(&level) {
            Ok(Self(level))
        } else {
            Err(TextError::InvalidPriority(level.to_string()))
        }
    }

    /// Lenient parse used for stored rows: anything unreadable becomes
    /// [`PriorityLevel::LEAST_URGENT`].
    pub fn from_stored(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::LEAST_URGENT)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for PriorityLevel {
    fn default() -> Self {
        Self::LEAST_URGENT
    }
}

impl std::str::FromStr for PriorityLevel {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let level: u8 = trimmed
            .parse()
            .map_err(|_| TextError::InvalidPriority(trimmed.to_owned()))?;
        Self::new(level)
    }
}

impl std::fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for PriorityLevel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PriorityLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let level = u8::deserialize(deserializer)?;
        PriorityLevel::new(level).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Trauma  ").unwrap();
        assert_eq!(text.as_str(), "Trauma");
    }

    #[test]
    fn non_empty_text_rejects_blank_and_commas() {
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
        assert_eq!(
            NonEmptyText::new("Smith, John"),
            Err(TextError::ContainsDelimiter)
        );
    }

    #[test]
    fn priority_accepts_only_one_to_five() {
        assert_eq!("1".parse::<PriorityLevel>().unwrap().get(), 1);
        assert_eq!(" 5 ".parse::<PriorityLevel>().unwrap().get(), 5);
        assert!("0".parse::<PriorityLevel>().is_err());
        assert!("6".parse::<PriorityLevel>().is_err());
        assert!("high".parse::<PriorityLevel>().is_err());
    }

    #[test]
    fn stored_priority_defaults_to_least_urgent() {
        assert_eq!(PriorityLevel::from_stored("abc"), PriorityLevel::LEAST_URGENT);
        assert_eq!(PriorityLevel::from_stored("9"), PriorityLevel::LEAST_URGENT);
        assert_eq!(PriorityLevel::from_stored("2").get(), 2);
    }

    #[test]
    fn priority_serialises_as_number() {
        let level = PriorityLevel::new(3).unwrap();
        assert_eq!(serde_json::to_string(&level).unwrap(), "3");
        let back: PriorityLevel = serde_json::from_str("3").unwrap();
        assert_eq!(back, level);
        assert!(serde_json::from_str::<PriorityLevel>("7").is_err());
    }
}
