//! Selector-to-handler dispatch
//!
//! Built once at startup from an ABI and a handler list, then shared
//! read-only between request tasks.

use ethers::types::Address;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use crate::abi::{AbiError, FunctionDescriptor, GatewayAbi};
use crate::handlers::{Handler, HandlerError};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("No function named '{0}' in the ABI")]
    UnknownFunction(String),

    #[error("More than one handler registered for {0}")]
    DuplicateHandler(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Calldata must hold at least a 4-byte selector, got {0} bytes")]
    CalldataTooShort(usize),

    #[error("No implementation for function with selector {0}")]
    UnknownSelector(String),

    #[error("Invalid call arguments: {0}")]
    InvalidArguments(#[source] AbiError),

    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error("Handler returned invalid values: {0}")]
    InvalidOutput(#[source] AbiError),
}

struct Route {
    function: FunctionDescriptor,
    handler: Arc<dyn Handler>,
}

/// Mounted handlers keyed by function selector
#[derive(Default)]
pub struct GatewayServer {
    routes: HashMap<[u8; 4], Route>,
}

impl GatewayServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind each handler to the ABI function named by its type tag.
    /// Nothing is mounted if any handler fails to bind.
    pub fn add(&mut self, abi: &GatewayAbi, handlers: Vec<Arc<dyn Handler>>) -> Result<(), ServerError> {
        let mut pending: HashMap<[u8; 4], Route> = HashMap::new();
        for handler in handlers {
            let function = abi
                .function(handler.type_tag())
                .ok_or_else(|| ServerError::UnknownFunction(handler.type_tag().to_string()))?
                .clone();
            let selector = function.selector();
            if self.routes.contains_key(&selector) || pending.contains_key(&selector) {
                return Err(ServerError::DuplicateHandler(function.signature()));
            }
            pending.insert(selector, Route { function, handler });
        }
        self.routes.extend(pending);
        Ok(())
    }

    /// Mounted functions, sorted by signature
    pub fn functions(&self) -> Vec<&FunctionDescriptor> {
        let mut functions: Vec<&FunctionDescriptor> =
            self.routes.values().map(|route| &route.function).collect();
        functions.sort_by_key(|f| f.signature());
        functions
    }

    /// Decode `calldata`, run the matching handler and ABI-encode its return values
    pub fn call(&self, sender: Address, calldata: &[u8]) -> Result<Vec<u8>, DispatchError> {
        if calldata.len() < 4 {
            return Err(DispatchError::CalldataTooShort(calldata.len()));
        }
        let selector = [calldata[0], calldata[1], calldata[2], calldata[3]];
        let route = self
            .routes
            .get(&selector)
            .ok_or_else(|| DispatchError::UnknownSelector(format!("0x{}", hex::encode(selector))))?;

        let args = route
            .function
            .decode_input(&calldata[4..])
            .map_err(DispatchError::InvalidArguments)?;

        debug!(
            "Dispatching {} for sender {:?}",
            route.function.signature(),
            sender
        );
        let values = route.handler.call(&args)?;

        route
            .function
            .encode_output(&values)
            .map_err(DispatchError::InvalidOutput)
    }
}
