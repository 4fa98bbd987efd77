use ethers::types::Address;
use secp256k1::PublicKey;

use super::digest::DigestScheme;
use super::signer::{self, ServerSigner, Signature65};

/// Immutable signing state shared by every signed handler
#[derive(Debug)]
pub struct SigningContext {
    signer: ServerSigner,
    scheme: DigestScheme,
}

impl SigningContext {
    pub fn new(signer: ServerSigner, scheme: DigestScheme) -> Self {
        Self { signer, scheme }
    }

    pub fn signer(&self) -> &ServerSigner {
        &self.signer
    }

    pub fn scheme(&self) -> DigestScheme {
        self.scheme
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Digest an ABI-encoded payload and sign it
    pub fn sign_payload(&self, payload: Vec<u8>) -> SignedResult {
        let digest = self.scheme.digest(&payload);
        let signature = self.signer.sign_digest(&digest);
        SignedResult {
            result: payload,
            signature,
        }
    }
}

/// ABI-encoded payload together with the server's signature over its digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedResult {
    pub result: Vec<u8>,
    pub signature: Signature65,
}

impl SignedResult {
    /// `0x`-prefixed hex of the encoded payload
    pub fn result_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.result))
    }

    pub fn digest(&self, scheme: DigestScheme) -> [u8; 32] {
        scheme.digest(&self.result)
    }

    /// What a verifier using `scheme` would recover as the signer's key
    pub fn recover_public_key(&self, scheme: DigestScheme) -> signer::Result<PublicKey> {
        signer::recover_public_key(&self.digest(scheme), &self.signature)
    }

    pub fn recover_signer(&self, scheme: DigestScheme) -> signer::Result<Address> {
        signer::recover_address(&self.digest(scheme), &self.signature)
    }
}
