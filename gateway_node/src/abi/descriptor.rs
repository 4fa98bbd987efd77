use ethers::abi::{Function, ParamType, StateMutability, Token};

use super::{AbiError, Result};
use crate::crypto::keccak256;

/// A single callable entry of the gateway ABI
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDescriptor {
    pub name: String,
    pub inputs: Vec<ParamType>,
    pub outputs: Vec<ParamType>,
    pub state_mutability: StateMutability,
}

impl FunctionDescriptor {
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<ParamType>,
        outputs: Vec<ParamType>,
        state_mutability: StateMutability,
    ) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            state_mutability,
        }
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> String {
        let inputs: Vec<String> = self.inputs.iter().map(ToString::to_string).collect();
        format!("{}({})", self.name, inputs.join(","))
    }

    /// First four bytes of the keccak256 of the canonical signature
    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.signature());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector()))
    }

    /// Decode call arguments (calldata without the selector)
    pub fn decode_input(&self, args: &[u8]) -> Result<Vec<Token>> {
        ethers::abi::decode(&self.inputs, args).map_err(|source| AbiError::Decode {
            function: self.signature(),
            source,
        })
    }

    /// Selector followed by the encoded arguments
    pub fn encode_call(&self, args: &[Token]) -> Result<Vec<u8>> {
        if !Token::types_check(args, &self.inputs) {
            return Err(AbiError::TypeMismatch {
                function: self.signature(),
                expected: render_types(&self.inputs),
            });
        }
        let mut calldata = self.selector().to_vec();
        calldata.extend(ethers::abi::encode(args));
        Ok(calldata)
    }

    /// Encode return values, checking them against the declared output types
    pub fn encode_output(&self, values: &[Token]) -> Result<Vec<u8>> {
        if !Token::types_check(values, &self.outputs) {
            return Err(AbiError::TypeMismatch {
                function: self.signature(),
                expected: render_types(&self.outputs),
            });
        }
        Ok(ethers::abi::encode(values))
    }

    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<Token>> {
        ethers::abi::decode(&self.outputs, data).map_err(|source| AbiError::Decode {
            function: self.signature(),
            source,
        })
    }
}

impl From<&Function> for FunctionDescriptor {
    fn from(function: &Function) -> Self {
        Self {
            name: function.name.clone(),
            inputs: function.inputs.iter().map(|p| p.kind.clone()).collect(),
            outputs: function.outputs.iter().map(|p| p.kind.clone()).collect(),
            state_mutability: function.state_mutability,
        }
    }
}

fn render_types(types: &[ParamType]) -> String {
    let rendered: Vec<String> = types.iter().map(ToString::to_string).collect();
    format!("({})", rendered.join(","))
}
