//! Gateway ABI resolution
//!
//! The mounted ABI can come from human-readable signatures, a raw JSON ABI, or
//! a compiled contract artifact. All three resolve to the same ordered list of
//! [`FunctionDescriptor`]s.

pub mod descriptor;

use ethers::abi::{Function, Param, ParamType};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub use descriptor::FunctionDescriptor;

/// Human-readable form of the gateway interface served by this node
pub const GATEWAY_SIGNATURES: &[&str] = &[
    "function hello() view returns (string)",
    "function signedHello() view returns (bytes, bytes)",
    "function getVersion() view returns (bytes, bytes)",
];

#[derive(Debug, thiserror::Error)]
pub enum AbiError {
    #[error("Failed to parse signature '{fragment}': {reason}")]
    Parse { fragment: String, reason: String },

    #[error("Invalid ABI JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ABI JSON must be an array or an artifact object with an 'abi' field")]
    UnexpectedShape,

    #[error("Failed to read ABI artifact {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Selector collision on {selector}: {existing} and {duplicate}")]
    DuplicateSelector {
        selector: String,
        existing: String,
        duplicate: String,
    },

    #[error("Failed to decode data for {function}: {source}")]
    Decode {
        function: String,
        #[source]
        source: ethers::abi::Error,
    },

    #[error("Values for {function} do not match the declared types {expected}")]
    TypeMismatch { function: String, expected: String },
}

pub type Result<T> = std::result::Result<T, AbiError>;

/// Ordered, selector-unique set of function descriptors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatewayAbi {
    functions: Vec<FunctionDescriptor>,
}

impl GatewayAbi {
    pub fn new(functions: Vec<FunctionDescriptor>) -> Result<Self> {
        let mut seen: HashMap<[u8; 4], String> = HashMap::new();
        for function in &functions {
            if let Some(existing) = seen.insert(function.selector(), function.signature()) {
                return Err(AbiError::DuplicateSelector {
                    selector: function.selector_hex(),
                    existing,
                    duplicate: function.signature(),
                });
            }
        }
        Ok(Self { functions })
    }

    /// The built-in gateway interface
    pub fn gateway() -> Result<Self> {
        Self::from_human_readable(GATEWAY_SIGNATURES)
    }

    /// Parse signatures such as `function hello() view returns (string)`.
    /// Fragments that are not functions (events, errors) are skipped.
    pub fn from_human_readable<S: AsRef<str>>(fragments: &[S]) -> Result<Self> {
        let mut functions = Vec::new();
        for fragment in fragments {
            let fragment = fragment.as_ref();
            let parsed = ethers::abi::parse_abi(&[fragment]).map_err(|e| AbiError::Parse {
                fragment: fragment.to_string(),
                reason: e.to_string(),
            })?;
            functions.extend(parsed.functions().map(FunctionDescriptor::from));
        }
        Self::new(functions)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(&value)
    }

    /// Accepts a raw ABI array or an artifact object carrying it under `abi`
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let items = match value {
            Value::Array(items) => items,
            Value::Object(map) => match map.get("abi") {
                Some(Value::Array(items)) => items,
                _ => return Err(AbiError::UnexpectedShape),
            },
            _ => return Err(AbiError::UnexpectedShape),
        };

        let mut functions = Vec::new();
        for item in items {
            // Entries without a type default to functions
            let kind = item.get("type").and_then(Value::as_str).unwrap_or("function");
            if kind != "function" {
                continue;
            }
            let function: Function = serde_json::from_value(item.clone())?;
            functions.push(FunctionDescriptor::from(&function));
        }
        Self::new(functions)
    }

    pub fn from_artifact_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| AbiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Render as a solc-style JSON ABI
    pub fn to_json_value(&self) -> Value {
        let items: Vec<JsonFunction<'_>> = self
            .functions
            .iter()
            .map(|function| JsonFunction {
                kind: "function",
                name: &function.name,
                inputs: unnamed_params(&function.inputs),
                outputs: unnamed_params(&function.outputs),
                state_mutability: function.state_mutability,
            })
            .collect();
        serde_json::to_value(items).unwrap_or(Value::Null)
    }

    pub fn to_json(&self) -> String {
        self.to_json_value().to_string()
    }

    pub fn functions(&self) -> &[FunctionDescriptor] {
        &self.functions
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn by_selector(&self, selector: [u8; 4]) -> Option<&FunctionDescriptor> {
        self.functions.iter().find(|f| f.selector() == selector)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[derive(Serialize)]
struct JsonFunction<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'a str,
    inputs: Vec<Param>,
    outputs: Vec<Param>,
    #[serde(rename = "stateMutability")]
    state_mutability: ethers::abi::StateMutability,
}

fn unnamed_params(types: &[ParamType]) -> Vec<Param> {
    types
        .iter()
        .map(|kind| Param {
            name: String::new(),
            kind: kind.clone(),
            internal_type: None,
        })
        .collect()
}
