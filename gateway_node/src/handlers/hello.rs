use ethers::abi::Token;

use super::{Handler, HandlerError};

pub const HELLO_MESSAGE: &str = "hello";

/// Unauthenticated greeting, `hello() returns (string)`
#[derive(Debug, Default, Clone)]
pub struct HelloHandler;

impl HelloHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn hello(&self) -> String {
        HELLO_MESSAGE.to_string()
    }
}

impl Handler for HelloHandler {
    fn type_tag(&self) -> &str {
        "hello"
    }

    fn call(&self, _args: &[Token]) -> Result<Vec<Token>, HandlerError> {
        Ok(vec![Token::String(self.hello())])
    }
}
