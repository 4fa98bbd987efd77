use ethers::abi::Token;
use std::sync::Arc;

use super::{sign_string, signed_tokens, Handler, HandlerError};
use crate::crypto::{SignedResult, SigningContext};

/// Gateway interface version reported to verifiers
pub const VERSION: &str = "1.0.0";

/// Signed version string, `getVersion() returns (bytes result, bytes signature)`
#[derive(Debug, Clone)]
pub struct GetVersionHandler {
    context: Arc<SigningContext>,
}

impl GetVersionHandler {
    pub fn new(context: Arc<SigningContext>) -> Self {
        Self { context }
    }

    pub fn get_version(&self) -> SignedResult {
        sign_string(&self.context, VERSION)
    }
}

impl Handler for GetVersionHandler {
    fn type_tag(&self) -> &str {
        "getVersion"
    }

    fn call(&self, _args: &[Token]) -> Result<Vec<Token>, HandlerError> {
        Ok(signed_tokens(self.get_version()))
    }
}
