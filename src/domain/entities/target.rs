//! Group and delivery target identifiers.

use serde::{Deserialize, Serialize};

/// Logical scope (a Discord guild) owning at most one delivery target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Creates a group identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<u64> for GroupId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// Platform delivery endpoint (a Discord channel).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    /// Creates a target identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the identifier as a Discord snowflake.
    ///
    /// Returns `None` for anything that is not a positive integer.
    #[must_use]
    pub fn snowflake(&self) -> Option<u64> {
        self.0.parse::<u64>().ok().filter(|id| *id != 0)
    }

    /// Returns the channel mention markup for this target.
    #[must_use]
    pub fn mention(&self) -> String {
        format!("<#{}>", self.0)
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<u64> for TargetId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_parsing() {
        assert_eq!(TargetId::new("1234567890").snowflake(), Some(1_234_567_890));
        assert_eq!(TargetId::new(" 42 ").snowflake(), Some(42));
        assert_eq!(TargetId::new("general").snowflake(), None);
        assert_eq!(TargetId::new("0").snowflake(), None);
        assert_eq!(TargetId::new("-5").snowflake(), None);
    }

    #[test]
    fn test_mention() {
        assert_eq!(TargetId::from(99_u64).mention(), "<#99>");
    }
}
