//! Server signing key for authenticated gateway responses.
//!
//! Uses secp256k1 ECDSA with RFC 6979 deterministic nonces, so the same key
//! and digest always produce the same signature. Signatures are serialized as
//! `r ‖ s ‖ v` with `v ∈ {27, 28}`, which is what `ecrecover` expects.

use ethers::types::Address;
use rand::RngCore;
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    All, Message, PublicKey, Secp256k1, SecretKey,
};
use std::fmt;

use super::digest::keccak256;

/// Serialized length of a recoverable signature
pub const SIGNATURE_LENGTH: usize = 65;

/// Offset added to the recovery id when serializing `v`
const RECOVERY_ID_OFFSET: u8 = 27;

#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("Invalid private key hex: {0}")]
    InvalidKeyHex(#[from] hex::FromHexError),

    #[error("Private key must be 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("Invalid secp256k1 secret key: {0}")]
    InvalidKey(secp256k1::Error),

    #[error("Signature must be {SIGNATURE_LENGTH} bytes, got {0}")]
    InvalidSignatureLength(usize),

    #[error("Invalid recovery byte: {0}")]
    InvalidRecoveryId(u8),

    #[error("Public key recovery failed: {0}")]
    Recovery(secp256k1::Error),
}

pub type Result<T> = std::result::Result<T, SignerError>;

/// 65-byte recoverable signature (`r ‖ s ‖ v`)
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature65([u8; SIGNATURE_LENGTH]);

impl Signature65 {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(SignerError::InvalidSignatureLength(bytes.len()));
        }
        let mut out = [0u8; SIGNATURE_LENGTH];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    fn from_recoverable(signature: &RecoverableSignature) -> Self {
        let (recovery_id, compact) = signature.serialize_compact();
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..64].copy_from_slice(&compact);
        out[64] = recovery_id.to_i32() as u8 + RECOVERY_ID_OFFSET;
        Self(out)
    }

    pub fn r(&self) -> &[u8] {
        &self.0[..32]
    }

    pub fn s(&self) -> &[u8] {
        &self.0[32..64]
    }

    pub fn v(&self) -> u8 {
        self.0[64]
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// `0x`-prefixed hex, 132 characters
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    fn to_recoverable(&self) -> Result<RecoverableSignature> {
        // Accept both the Ethereum form (27/28) and a raw recovery id (0/1)
        let v = self.v();
        let raw = if v >= RECOVERY_ID_OFFSET { v - RECOVERY_ID_OFFSET } else { v };
        let recovery_id =
            RecoveryId::from_i32(raw as i32).map_err(|_| SignerError::InvalidRecoveryId(v))?;
        RecoverableSignature::from_compact(&self.0[..64], recovery_id)
            .map_err(SignerError::Recovery)
    }
}

impl fmt::Debug for Signature65 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature65({})", self.to_hex())
    }
}

impl fmt::Display for Signature65 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// The gateway's signing identity
pub struct ServerSigner {
    secp: Secp256k1<All>,
    secret_key: SecretKey,
    public_key: PublicKey,
    address: Address,
}

impl ServerSigner {
    /// Parse a hex-encoded 32-byte scalar, with or without `0x`
    pub fn from_hex(key: &str) -> Result<Self> {
        let trimmed = key.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(stripped)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(SignerError::InvalidKeyLength(bytes.len()));
        }
        let secret_key = SecretKey::from_slice(bytes).map_err(SignerError::InvalidKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Fresh key from the thread RNG
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            // Out-of-range scalar, draw again
            if let Ok(secret_key) = SecretKey::from_slice(&bytes) {
                return Self::from_secret_key(secret_key);
            }
        }
    }

    fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        let address = public_key_to_address(&public_key);
        Self {
            secp,
            secret_key,
            public_key,
            address,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Uncompressed public key as `0x04…` (65 bytes)
    pub fn public_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.public_key.serialize_uncompressed()))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a precomputed 32-byte digest
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Signature65 {
        let message = Message::from_digest(*digest);
        let signature = self.secp.sign_ecdsa_recoverable(&message, &self.secret_key);
        Signature65::from_recoverable(&signature)
    }
}

impl fmt::Debug for ServerSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Ethereum address of a secp256k1 public key
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    Address::from_slice(&hash[12..])
}

/// Recover the signing public key from a digest and a 65-byte signature
pub fn recover_public_key(digest: &[u8; 32], signature: &Signature65) -> Result<PublicKey> {
    let recoverable = signature.to_recoverable()?;
    let message = Message::from_digest(*digest);
    Secp256k1::verification_only()
        .recover_ecdsa(&message, &recoverable)
        .map_err(SignerError::Recovery)
}

pub fn recover_address(digest: &[u8; 32], signature: &Signature65) -> Result<Address> {
    recover_public_key(digest, signature).map(|public_key| public_key_to_address(&public_key))
}
