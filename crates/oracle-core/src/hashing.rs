// crates/oracle-core/src/hashing.rs
// ============================================================================
// Module: Oracle Canonical Hashing
// Description: RFC 8785 JSON canonicalization and content hashing utilities.
// Purpose: Provide deterministic hashes for forecast, resolution, and manifest identifiers.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! The ledger's content-addressed identifiers (`forecast_id`, `resolution_id`,
//! `manifest_id`) all route through this module so that identical records hash
//! identically regardless of field insertion order. Binary payloads (manifest
//! files) are hashed directly over raw bytes instead of through JCS.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Hash Algorithm
// ============================================================================

/// Supported hash algorithms for Oracle ledger artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256 hashing (the only algorithm this subsystem ever produces).
    Sha256,
}

/// Default hash algorithm for Oracle ledger artifacts.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

// ============================================================================
// SECTION: Hash Digest
// ============================================================================

/// Deterministic content hash representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDigest {
    /// Hash algorithm identifier.
    pub algorithm: HashAlgorithm,
    /// Lowercase hex-encoded digest bytes.
    pub value: String,
}

impl HashDigest {
    /// Creates a new digest from raw bytes.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm, bytes: &[u8]) -> Self {
        Self {
            algorithm,
            value: hex_encode(bytes),
        }
    }

    /// Renders the digest in `sha256:<hex>` textual form, as used in
    /// `manifest_id` and evidence-snapshot hash fields.
    #[must_use]
    pub fn to_prefixed_string(&self) -> String {
        match self.algorithm {
            HashAlgorithm::Sha256 => format!("sha256:{}", self.value),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when computing canonical hashes.
#[derive(Debug, Error)]
pub enum HashError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Hashing Helpers
// ============================================================================

/// Returns canonical JSON bytes for a serializable value using RFC 8785.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Hashes canonical JSON using the provided algorithm.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn hash_canonical_json<T: Serialize + ?Sized>(
    algorithm: HashAlgorithm,
    value: &T,
) -> Result<HashDigest, HashError> {
    let bytes = canonical_json_bytes(value)?;
    Ok(hash_bytes(algorithm, &bytes))
}

/// Hashes raw bytes using the provided algorithm.
#[must_use]
pub fn hash_bytes(algorithm: HashAlgorithm, bytes: &[u8]) -> HashDigest {
    match algorithm {
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(bytes);
            let digest = hasher.finalize();
            HashDigest::new(HashAlgorithm::Sha256, &digest)
        }
    }
}

/// Hashes raw bytes and renders the result as `sha256:<hex>`.
#[must_use]
pub fn hash_bytes_prefixed(bytes: &[u8]) -> String {
    hash_bytes(DEFAULT_HASH_ALGORITHM, bytes).to_prefixed_string()
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "test-only assertions"
    )]
    use super::*;

    #[test]
    fn hash_is_stable_under_key_order_permutation() {
        let a = serde_json::json!({"b": 1, "a": 2});
        let b = serde_json::json!({"a": 2, "b": 1});
        let digest_a = hash_canonical_json(HashAlgorithm::Sha256, &a).unwrap();
        let digest_b = hash_canonical_json(HashAlgorithm::Sha256, &b).unwrap();
        assert_eq!(digest_a, digest_b);
    }

    #[test]
    fn prefixed_string_uses_sha256_prefix() {
        let digest = hash_bytes(HashAlgorithm::Sha256, b"hello");
        assert!(digest.to_prefixed_string().starts_with("sha256:"));
    }

    #[test]
    fn hex_encoding_is_lowercase() {
        let digest = hash_bytes(HashAlgorithm::Sha256, b"x");
        assert_eq!(digest.value, digest.value.to_lowercase());
    }
}
