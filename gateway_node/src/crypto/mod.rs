pub mod context;
pub mod digest;
pub mod signer;

pub use context::{SignedResult, SigningContext};
pub use digest::{keccak256, DigestScheme, SIGNATURE_PREFIX};
pub use signer::{
    public_key_to_address, recover_address, recover_public_key, ServerSigner, Signature65,
    SignerError, SIGNATURE_LENGTH,
};
