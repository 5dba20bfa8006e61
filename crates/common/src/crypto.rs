//! Cryptography utilities.
//!
//! This module provides the content fingerprints used as cache keys and the
//! checksums guarding cached files.

use anyhow::{Context, Result};
use blake3::Hasher as Blake3Hasher;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute the BLAKE3 fingerprint of raw bytes, hex-encoded.
///
/// # Examples
///
/// ```
/// use ramp_leaderboard_common::crypto::fingerprint;
///
/// let key = fingerprint(b"accuracy");
/// assert_eq!(key.len(), 64);
/// assert_eq!(key, fingerprint(b"accuracy"));
/// ```
pub fn fingerprint(data: &[u8]) -> String {
    ChecksumVerifier::Blake3.compute(data)
}

/// Fingerprint a value through its JSON serialization.
///
/// Two values with the same JSON text share a fingerprint, so callers must
/// only pass types whose serialization is deterministic (no hash maps).
pub fn fingerprint_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let bytes = serde_json::to_vec(value).context("Failed to serialize value for fingerprint")?;
    Ok(fingerprint(&bytes))
}

/// Checksum verifier supporting multiple algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumVerifier {
    /// SHA-256 checksums
    Sha256,
    /// BLAKE3 checksums
    Blake3,
}

impl ChecksumVerifier {
    /// Algorithm name as written next to stored checksums
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }

    /// Look up an algorithm by its stored name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sha256" => Some(Self::Sha256),
            "blake3" => Some(Self::Blake3),
            _ => None,
        }
    }

    /// Compute a checksum for the given data.
    ///
    /// # Examples
    ///
    /// ```
    /// use ramp_leaderboard_common::crypto::ChecksumVerifier;
    ///
    /// let data = b"Hello, world!";
    /// assert_eq!(ChecksumVerifier::Sha256.compute(data).len(), 64);
    /// assert_eq!(ChecksumVerifier::Blake3.compute(data).len(), 64);
    /// ```
    pub fn compute(&self, data: &[u8]) -> String {
        match self {
            Self::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(data);
                hex::encode(hasher.finalize())
            }
            Self::Blake3 => {
                let mut hasher = Blake3Hasher::new();
                hasher.update(data);
                hex::encode(hasher.finalize().as_bytes())
            }
        }
    }

    /// Verify data against a checksum.
    pub fn verify(&self, data: &[u8], expected_checksum: &str) -> bool {
        let actual_checksum = self.compute(data);

        if actual_checksum.len() != expected_checksum.len() {
            return false;
        }

        let mut result = 0u8;
        for (a, b) in actual_checksum.bytes().zip(expected_checksum.bytes()) {
            result |= a ^ b;
        }

        result == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_checksum() {
        let data = b"Hello, world!";
        let checksum = ChecksumVerifier::Sha256.compute(data);

        // SHA-256 produces 64 hex characters (32 bytes)
        assert_eq!(checksum.len(), 64);
        assert!(ChecksumVerifier::Sha256.verify(data, &checksum));
        assert!(!ChecksumVerifier::Sha256.verify(b"Wrong data", &checksum));
    }

    #[test]
    fn test_blake3_checksum() {
        let data = b"Hello, world!";
        let checksum = ChecksumVerifier::Blake3.compute(data);

        assert_eq!(checksum.len(), 64);
        assert!(ChecksumVerifier::Blake3.verify(data, &checksum));
        assert!(!ChecksumVerifier::Blake3.verify(data, "short"));
    }

    #[test]
    fn test_algorithm_names_round_trip() {
        for algorithm in [ChecksumVerifier::Sha256, ChecksumVerifier::Blake3] {
            assert_eq!(ChecksumVerifier::from_name(algorithm.name()), Some(algorithm));
        }
        assert_eq!(ChecksumVerifier::from_name("md5"), None);
    }

    #[test]
    fn test_fingerprint_json_is_stable() {
        let a = fingerprint_json(&vec![("acc", 0.5)]).unwrap();
        let b = fingerprint_json(&vec![("acc", 0.5)]).unwrap();
        let c = fingerprint_json(&vec![("acc", 0.6)]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
