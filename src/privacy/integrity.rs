//! Payload integrity fingerprints
//!
//! The payload is serialized as JSON with keys sorted lexicographically and
//! hashed with SHA-256, so equal payloads produce equal digests regardless
//! of insertion order.

use crate::packet::Fields;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::collections::BTreeMap;

/// Hex-encoded payload digest
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Hex string form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading characters for compact display
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(10)]
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of comparing raw and transformed payload digests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntegrityStatus {
    Pass,
    Fail,
}

impl IntegrityStatus {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

impl From<bool> for IntegrityStatus {
    fn from(ok: bool) -> Self {
        if ok {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

impl std::fmt::Display for IntegrityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute the digest of a payload
pub fn fingerprint(payload: &Fields) -> Digest {
    let sorted: BTreeMap<&String, &serde_json::Value> = payload.iter().collect();
    // A map of scalar JSON values always serializes; fall back to empty bytes
    // rather than panic if that ever changes.
    let canonical = serde_json::to_vec(&sorted).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Digest(format!("{:x}", hasher.finalize()))
}

/// Compare the digests of the raw and transformed payloads
pub fn verify(raw: &Fields, clean: &Fields) -> IntegrityStatus {
    IntegrityStatus::from(fingerprint(raw) == fingerprint(clean))
}
