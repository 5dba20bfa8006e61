//! Strongly-typed identifier types for the leaderboard domain.
//!
//! Submission and metric identifiers are both plain names on disk, but mixing
//! them up silently corrupts a ranking, so each gets its own newtype. Both are
//! ordered lexicographically, which is the final deterministic tie-break of the
//! ranker.

use crate::errors::IdentifierError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

macro_rules! define_id {
    ($name:ident, $kind:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create an identifier, trimming surrounding whitespace.
            ///
            /// Fails when the trimmed value is empty or contains control characters.
            pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(IdentifierError::Empty { kind: $kind });
                }
                if trimmed.chars().any(char::is_control) {
                    return Err(IdentifierError::ControlCharacter {
                        kind: $kind,
                        value: trimmed.escape_debug().to_string(),
                    });
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Borrow the identifier as a string slice
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert into the underlying string
            #[inline]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

define_id!(
    SubmissionId,
    "submission id",
    "Identifier of a challenge submission (usually its directory name)"
);

define_id!(
    MetricId,
    "metric id",
    "Identifier of a score metric such as `accuracy` or `nll`"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_trims_whitespace() {
        let id = SubmissionId::new("  starting_kit ").unwrap();
        assert_eq!(id.as_str(), "starting_kit");
    }

    #[test]
    fn test_empty_id_rejected() {
        assert!(matches!(
            MetricId::new("   "),
            Err(IdentifierError::Empty { kind: "metric id" })
        ));
    }

    #[test]
    fn test_control_characters_rejected() {
        assert!(SubmissionId::new("bad\tname").is_err());
    }

    #[test]
    fn test_ids_order_lexicographically() {
        let a: SubmissionId = "alpha".parse().unwrap();
        let b: SubmissionId = "beta".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_id_serialization() {
        let id: MetricId = "accuracy".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"accuracy\"");

        let back: MetricId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let empty: Result<MetricId, _> = serde_json::from_str("\"\"");
        assert!(empty.is_err());
    }
}
