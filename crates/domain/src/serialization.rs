//! Serde helpers for score values.
//!
//! JSON has no NaN, and `serde_json` writes non-finite floats as `null` but
//! refuses to read `null` back into an `f64`. Scores use NaN as the "no valid
//! fold" sentinel, so they go through [`nan_as_null`].

/// Serialize non-finite floats as `null` and read `null` back as NaN.
///
/// # Examples
///
/// ```
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Score {
///     #[serde(with = "ramp_leaderboard_domain::serialization::nan_as_null")]
///     value: f64,
/// }
///
/// let json = serde_json::to_string(&Score { value: f64::NAN }).unwrap();
/// assert_eq!(json, r#"{"value":null}"#);
///
/// let back: Score = serde_json::from_str(&json).unwrap();
/// assert!(back.value.is_nan());
/// ```
pub mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}
