//! Gateway handlers
//!
//! Each handler serves one ABI function, matched by name. Handlers receive the
//! decoded call arguments and return values in the order of the function's
//! declared outputs; encoding is left to the dispatcher.

pub mod hello;
pub mod signed_hello;
pub mod version;

use ethers::abi::Token;
use std::sync::Arc;

use crate::crypto::{SignedResult, SigningContext};

pub use hello::{HelloHandler, HELLO_MESSAGE};
pub use signed_hello::SignedHelloHandler;
pub use version::{GetVersionHandler, VERSION};

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Handler '{handler}' failed: {reason}")]
    Internal { handler: String, reason: String },
}

/// A capability exposed through the gateway
pub trait Handler: Send + Sync {
    /// Name of the ABI function this handler serves (case-sensitive)
    fn type_tag(&self) -> &str;

    fn call(&self, args: &[Token]) -> Result<Vec<Token>, HandlerError>;
}

/// Handlers mounted by the gateway node
pub fn default_handlers(context: Arc<SigningContext>) -> Vec<Arc<dyn Handler>> {
    vec![
        Arc::new(HelloHandler::new()),
        Arc::new(SignedHelloHandler::new(context.clone())),
        Arc::new(GetVersionHandler::new(context)),
    ]
}

/// `(bytes result, bytes signature)` output values
pub(crate) fn signed_tokens(signed: SignedResult) -> Vec<Token> {
    vec![
        Token::Bytes(signed.result),
        Token::Bytes(signed.signature.to_vec()),
    ]
}

/// ABI-encode a single string and sign the encoding
pub(crate) fn sign_string(context: &SigningContext, value: &str) -> SignedResult {
    let payload = ethers::abi::encode(&[Token::String(value.to_string())]);
    context.sign_payload(payload)
}
