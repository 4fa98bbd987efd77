use ethers::abi::Token;
use std::sync::Arc;

use super::{sign_string, signed_tokens, Handler, HandlerError, HELLO_MESSAGE};
use crate::crypto::{SignedResult, SigningContext};

/// Signed greeting, `signedHello() returns (bytes result, bytes signature)`
#[derive(Debug, Clone)]
pub struct SignedHelloHandler {
    context: Arc<SigningContext>,
}

impl SignedHelloHandler {
    pub fn new(context: Arc<SigningContext>) -> Self {
        Self { context }
    }

    /// `abi.encode("hello")` and the server's signature over its digest
    pub fn signed_hello(&self) -> SignedResult {
        sign_string(&self.context, HELLO_MESSAGE)
    }
}

impl Handler for SignedHelloHandler {
    fn type_tag(&self) -> &str {
        "signedHello"
    }

    fn call(&self, _args: &[Token]) -> Result<Vec<Token>, HandlerError> {
        Ok(signed_tokens(self.signed_hello()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{keccak256, recover_public_key, DigestScheme, ServerSigner};
    use ethers::abi::ParamType;

    fn handler() -> (Arc<SigningContext>, SignedHelloHandler) {
        let context = Arc::new(SigningContext::new(
            ServerSigner::random(),
            DigestScheme::Prefixed,
        ));
        (context.clone(), SignedHelloHandler::new(context))
    }

    #[test]
    fn test_result_decodes_to_hello() {
        let (_, handler) = handler();
        let signed = handler.signed_hello();
        let decoded = ethers::abi::decode(&[ParamType::String], &signed.result).unwrap();
        assert_eq!(decoded, vec![Token::String("hello".to_string())]);
    }

    #[test]
    fn test_signature_shape() {
        let (_, handler) = handler();
        let signed = handler.signed_hello();
        assert_eq!(signed.signature.to_hex().len(), 132);
        assert_eq!(signed.signature.as_bytes().len(), 65);
    }

    #[test]
    fn test_public_key_recovery() {
        let (context, handler) = handler();
        let signed = handler.signed_hello();

        // Verifier side: keccak256(0x1900 ‖ keccak256(result))
        let mut preimage = vec![0x19, 0x00];
        preimage.extend_from_slice(&keccak256(&signed.result));
        let digest = keccak256(&preimage);

        let recovered = recover_public_key(&digest, &signed.signature).unwrap();
        assert_eq!(&recovered, context.signer().public_key());
    }

    #[test]
    fn test_repeatable_for_same_key() {
        let (_, handler) = handler();
        assert_eq!(handler.signed_hello(), handler.signed_hello());
    }

    #[test]
    fn test_different_signers_differ() {
        let (_, first) = handler();
        let (_, second) = handler();

        let a = first.signed_hello();
        let b = second.signed_hello();
        assert_eq!(a.result, b.result);
        assert_ne!(a.signature, b.signature);
    }

    #[test]
    fn test_call_returns_result_and_signature() {
        let (_, handler) = handler();
        let values = handler.call(&[]).unwrap();
        let signed = handler.signed_hello();
        assert_eq!(
            values,
            vec![
                Token::Bytes(signed.result),
                Token::Bytes(signed.signature.to_vec()),
            ]
        );
    }
}
