//! Leaderboard cache
//!
//! Leaderboards are cached under the fingerprint of their inputs, so an
//! entry never needs invalidation; a changed input has a different key.
//! The filesystem cache stores each leaderboard in a JSON envelope with a
//! checksum of the payload and drops entries that fail verification.

use crate::{Error, Result};
use parking_lot::RwLock;
use ramp_leaderboard_common::crypto::ChecksumVerifier;
use ramp_leaderboard_domain::Leaderboard;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Storage for computed leaderboards keyed by input fingerprint
pub trait LeaderboardCache: Send + Sync {
    /// Cached leaderboard for a fingerprint, if present and intact
    fn get(&self, fingerprint: &str) -> Result<Option<Leaderboard>>;

    /// Store a leaderboard under a fingerprint
    fn put(&self, fingerprint: &str, leaderboard: &Leaderboard) -> Result<()>;

    /// Drop a cached leaderboard; returns whether one existed
    fn remove(&self, fingerprint: &str) -> Result<bool>;
}

/// Process-local cache
#[derive(Debug, Default)]
pub struct InMemoryLeaderboardCache {
    entries: RwLock<HashMap<String, Leaderboard>>,
}

impl InMemoryLeaderboardCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl LeaderboardCache for InMemoryLeaderboardCache {
    fn get(&self, fingerprint: &str) -> Result<Option<Leaderboard>> {
        Ok(self.entries.read().get(fingerprint).cloned())
    }

    fn put(&self, fingerprint: &str, leaderboard: &Leaderboard) -> Result<()> {
        self.entries
            .write()
            .insert(fingerprint.to_string(), leaderboard.clone());
        Ok(())
    }

    fn remove(&self, fingerprint: &str) -> Result<bool> {
        Ok(self.entries.write().remove(fingerprint).is_some())
    }
}

/// On-disk entry
#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope {
    fingerprint: String,
    algorithm: String,
    checksum: String,
    /// Serialized leaderboard
    payload: String,
}

/// Filesystem cache, one JSON file per fingerprint
#[derive(Debug, Clone)]
pub struct FsLeaderboardCache {
    dir: PathBuf,
    verifier: ChecksumVerifier,
}

impl FsLeaderboardCache {
    /// Cache in `dir`, created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            verifier: ChecksumVerifier::Blake3,
        }
    }

    pub fn with_verifier(mut self, verifier: ChecksumVerifier) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, fingerprint: &str) -> Result<PathBuf> {
        if fingerprint.is_empty() || !fingerprint.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::Cache(format!("Invalid fingerprint '{}'", fingerprint)));
        }
        Ok(self.dir.join(format!("{}.json", fingerprint)))
    }

    fn read_envelope(&self, path: &Path) -> Result<Option<CacheEnvelope>> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(Error::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Ok(Some(serde_json::from_slice(&data)?))
    }
}

impl LeaderboardCache for FsLeaderboardCache {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    fn get(&self, fingerprint: &str) -> Result<Option<Leaderboard>> {
        let path = self.entry_path(fingerprint)?;
        let envelope = match self.read_envelope(&path) {
            Ok(Some(envelope)) => envelope,
            Ok(None) => {
                debug!("Cache miss");
                return Ok(None);
            }
            Err(e) => {
                warn!(error = %e, "Discarding unreadable cache entry");
                self.remove(fingerprint)?;
                return Ok(None);
            }
        };

        let intact = envelope.fingerprint == fingerprint
            && ChecksumVerifier::from_name(&envelope.algorithm)
                .map(|v| v.verify(envelope.payload.as_bytes(), &envelope.checksum))
                .unwrap_or(false);
        if !intact {
            warn!("Discarding cache entry that failed verification");
            self.remove(fingerprint)?;
            return Ok(None);
        }

        let leaderboard = serde_json::from_str(&envelope.payload)?;
        debug!("Cache hit");
        Ok(Some(leaderboard))
    }

    #[instrument(skip(self, leaderboard), fields(dir = %self.dir.display()))]
    fn put(&self, fingerprint: &str, leaderboard: &Leaderboard) -> Result<()> {
        let path = self.entry_path(fingerprint)?;
        let payload = serde_json::to_string(leaderboard)?;
        let envelope = CacheEnvelope {
            fingerprint: fingerprint.to_string(),
            algorithm: self.verifier.name().to_string(),
            checksum: self.verifier.compute(payload.as_bytes()),
            payload,
        };

        std::fs::create_dir_all(&self.dir).map_err(|source| Error::Io {
            path: self.dir.clone(),
            source,
        })?;

        // Write then rename so readers never see a partial entry
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&envelope)?).map_err(|source| {
            Error::Io {
                path: tmp.clone(),
                source,
            }
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), "Cached leaderboard");
        Ok(())
    }

    fn remove(&self, fingerprint: &str) -> Result<bool> {
        let path = self.entry_path(fingerprint)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(Error::Io { path, source }),
        }
    }
}
