//! Solidity compilation through `solc --standard-json`
//!
//! Only diagnostics with severity `error` fail a build. Warnings and info
//! messages are logged and otherwise ignored.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::abi::{AbiError, GatewayAbi};

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{binary} exited with {status}: {stderr}")]
    Exit {
        binary: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Malformed compiler output: {0}")]
    MalformedOutput(#[from] serde_json::Error),

    #[error("Contract {contract} not found in compiler output")]
    MissingContract { contract: String },

    #[error("Compilation errors:\n{}", .0.join("\n"))]
    Diagnostics(Vec<String>),

    #[error(transparent)]
    Abi(#[from] AbiError),
}

pub type Result<T> = std::result::Result<T, CompileError>;

/// One entry of the `errors` array in standard-json output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub formatted_message: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity.eq_ignore_ascii_case("error")
    }

    fn render(&self) -> String {
        self.formatted_message
            .clone()
            .unwrap_or_else(|| self.message.clone())
            .trim_end()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractOutput {
    #[serde(default)]
    pub abi: Value,
}

/// Parsed standard-json output. Contracts are keyed by source unit, then by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilerOutput {
    #[serde(default)]
    pub errors: Vec<Diagnostic>,
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, ContractOutput>>,
}

impl CompilerOutput {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Fail with every error-severity diagnostic; log the rest
    pub fn check_diagnostics(&self) -> Result<()> {
        let mut errors = Vec::new();
        for diagnostic in &self.errors {
            if diagnostic.is_error() {
                errors.push(diagnostic.render());
            } else {
                warn!("solc {}: {}", diagnostic.severity, diagnostic.message);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CompileError::Diagnostics(errors))
        }
    }

    pub fn contract(&self, name: &str) -> Option<&ContractOutput> {
        self.contracts
            .values()
            .find_map(|contracts| contracts.get(name))
    }

    /// ABI of the named contract, searched across all source units
    pub fn abi(&self, name: &str) -> Result<GatewayAbi> {
        let contract = self
            .contract(name)
            .ok_or_else(|| CompileError::MissingContract {
                contract: name.to_string(),
            })?;
        Ok(GatewayAbi::from_json_value(&contract.abi)?)
    }
}

/// Wrapper around a `solc` binary
#[derive(Debug, Clone)]
pub struct SolcCompiler {
    binary: String,
}

impl Default for SolcCompiler {
    fn default() -> Self {
        Self::new("solc")
    }
}

impl SolcCompiler {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Standard-json input requesting only ABIs
    pub fn standard_json_input(file_name: &str, source: &str) -> Value {
        json!({
            "language": "Solidity",
            "sources": {
                file_name: { "content": source }
            },
            "settings": {
                "outputSelection": {
                    "*": { "*": ["abi"] }
                }
            }
        })
    }

    /// Run `solc --standard-json` over a single in-memory source unit
    pub fn compile_source(&self, file_name: &str, source: &str) -> Result<CompilerOutput> {
        let input = Self::standard_json_input(file_name, source).to_string();
        debug!("Invoking {} --standard-json for {}", self.binary, file_name);

        let spawn_err = |source| CompileError::Spawn {
            binary: self.binary.clone(),
            source,
        };
        let mut child = Command::new(&self.binary)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.as_bytes()).map_err(spawn_err)?;
        }
        let output = child.wait_with_output().map_err(spawn_err)?;

        if !output.status.success() {
            return Err(CompileError::Exit {
                binary: self.binary.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let compiled = CompilerOutput::from_json(&String::from_utf8_lossy(&output.stdout))?;
        compiled.check_diagnostics()?;
        Ok(compiled)
    }

    pub fn compile_file(&self, path: impl AsRef<Path>) -> Result<CompilerOutput> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "contract.sol".to_string());
        self.compile_source(&file_name, &source)
    }

    /// Compile `path` and return the ABI of `contract`
    pub fn compile_abi(&self, path: impl AsRef<Path>, contract: &str) -> Result<GatewayAbi> {
        let path = path.as_ref();
        let abi = self.compile_file(path)?.abi(contract)?;
        info!(
            "Compiled {} from {:?}: {} functions",
            contract,
            path,
            abi.len()
        );
        Ok(abi)
    }
}
