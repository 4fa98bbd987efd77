//! CCIP-Read (EIP-3668) gateway node
//!
//! Serves `GET {base}/{sender}/{calldata}.json` by decoding the calldata
//! against a gateway ABI, running the matching handler and returning the
//! ABI-encoded result as `{"data": "0x…"}`. Signed handlers attach a
//! recoverable secp256k1 signature produced with the server key.

pub mod abi;
pub mod api;
pub mod artifacts;
pub mod config;
pub mod crypto;
pub mod handlers;

pub use abi::{FunctionDescriptor, GatewayAbi};
pub use api::{make_app, GatewayServer};
pub use config::GatewayConfig;
pub use crypto::{DigestScheme, ServerSigner, SigningContext};
