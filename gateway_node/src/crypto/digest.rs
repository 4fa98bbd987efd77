//! Digest construction for signed gateway responses.
//!
//! The on-chain verifier recomputes the digest from the returned payload, so
//! both sides must agree on the exact byte layout of the preimage.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// Leading bytes of the personal-message-over-hash convention (EIP-191, version 0x00).
pub const SIGNATURE_PREFIX: [u8; 2] = [0x19, 0x00];

/// Keccak-256 of arbitrary bytes
pub fn keccak256(data: impl AsRef<[u8]>) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data.as_ref());
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// How the signed digest is derived from an ABI-encoded payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestScheme {
    /// `keccak256(0x1900 ‖ keccak256(payload))`
    #[default]
    Prefixed,
    /// `keccak256(payload)`, for verifiers deployed before the prefix was introduced
    Plain,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown digest scheme '{0}' (expected 'prefixed' or 'plain')")]
pub struct UnknownDigestScheme(pub String);

impl DigestScheme {
    /// Compute the 32-byte digest that gets signed for `payload`
    pub fn digest(&self, payload: &[u8]) -> [u8; 32] {
        match self {
            DigestScheme::Prefixed => {
                let mut preimage = Vec::with_capacity(SIGNATURE_PREFIX.len() + 32);
                preimage.extend_from_slice(&SIGNATURE_PREFIX);
                preimage.extend_from_slice(&keccak256(payload));
                keccak256(preimage)
            }
            DigestScheme::Plain => keccak256(payload),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DigestScheme::Prefixed => "prefixed",
            DigestScheme::Plain => "plain",
        }
    }
}

impl fmt::Display for DigestScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestScheme {
    type Err = UnknownDigestScheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefixed" => Ok(DigestScheme::Prefixed),
            "plain" => Ok(DigestScheme::Plain),
            other => Err(UnknownDigestScheme(other.to_string())),
        }
    }
}
