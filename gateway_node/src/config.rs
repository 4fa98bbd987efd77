//! Gateway configuration
//!
//! Sources, lowest to highest priority: built-in defaults, an optional config
//! file, environment variables (`.env` is loaded by the binary beforehand),
//! then command-line overrides.

use config::{Config, Environment, File};
use log::info;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::abi::GatewayAbi;
use crate::artifacts::{self, SolcCompiler};
use crate::crypto::DigestScheme;

pub const DEFAULT_BASE_PATH: &str = "/";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_CONTRACT_NAME: &str = "IGateway";
pub const DEFAULT_SOLC_PATH: &str = "solc";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),

    #[error("{0} is required")]
    MissingKey(&'static str),

    #[error("Invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Command-line values that win over every other source
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub base_path: Option<String>,
}

#[derive(Deserialize)]
struct RawConfig {
    server_private_key: Option<String>,
    base_path: String,
    host: String,
    port: u16,
    digest_scheme: String,
    abi_path: Option<PathBuf>,
    contract_path: Option<PathBuf>,
    contract_name: String,
    solc_path: String,
}

/// Where the mounted ABI comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiSource {
    Builtin,
    Artifact(PathBuf),
    Solidity {
        path: PathBuf,
        contract: String,
        solc: String,
    },
}

impl AbiSource {
    pub fn load(&self) -> artifacts::Result<GatewayAbi> {
        let abi = match self {
            AbiSource::Builtin => GatewayAbi::gateway()?,
            AbiSource::Artifact(path) => GatewayAbi::from_artifact_file(path)?,
            AbiSource::Solidity {
                path,
                contract,
                solc,
            } => SolcCompiler::new(solc.as_str()).compile_abi(path, contract)?,
        };
        info!("Loaded gateway ABI from {}", self);
        Ok(abi)
    }
}

impl fmt::Display for AbiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiSource::Builtin => write!(f, "built-in signatures"),
            AbiSource::Artifact(path) => write!(f, "artifact {}", path.display()),
            AbiSource::Solidity { path, contract, .. } => {
                write!(f, "{} in {}", contract, path.display())
            }
        }
    }
}

#[derive(Clone)]
pub struct GatewayConfig {
    pub server_private_key: String,
    pub base_path: String,
    pub host: String,
    pub port: u16,
    pub digest_scheme: DigestScheme,
    pub abi_source: AbiSource,
}

impl GatewayConfig {
    /// Load from defaults, `config_file`, the process environment and `overrides`
    pub fn load(config_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        Self::from_sources(config_file, None, overrides)
    }

    /// Same as [`GatewayConfig::load`] with an explicit environment map in
    /// place of the process environment when `env` is `Some`
    pub fn from_sources(
        config_file: Option<&Path>,
        env: Option<HashMap<String, String>>,
        overrides: &ConfigOverrides,
    ) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("base_path", DEFAULT_BASE_PATH)?
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", DEFAULT_PORT as i64)?
            .set_default("digest_scheme", DigestScheme::default().as_str())?
            .set_default("contract_name", DEFAULT_CONTRACT_NAME)?
            .set_default("solc_path", DEFAULT_SOLC_PATH)?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let raw: RawConfig = builder
            .add_source(Environment::default().source(env))
            .set_override_option("host", overrides.host.clone())?
            .set_override_option("port", overrides.port.map(i64::from))?
            .set_override_option("base_path", overrides.base_path.clone())?
            .build()?
            .try_deserialize()?;

        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self> {
        let server_private_key = raw
            .server_private_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingKey("SERVER_PRIVATE_KEY"))?;

        if !raw.base_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                key: "BASE_PATH",
                reason: format!("'{}' must start with '/'", raw.base_path),
            });
        }

        let digest_scheme =
            raw.digest_scheme
                .parse::<DigestScheme>()
                .map_err(|e| ConfigError::Invalid {
                    key: "DIGEST_SCHEME",
                    reason: e.to_string(),
                })?;

        let abi_source = match (raw.abi_path, raw.contract_path) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid {
                    key: "ABI_PATH",
                    reason: "cannot be combined with CONTRACT_PATH".to_string(),
                })
            }
            (Some(path), None) => AbiSource::Artifact(path),
            (None, Some(path)) => AbiSource::Solidity {
                path,
                contract: raw.contract_name,
                solc: raw.solc_path,
            },
            (None, None) => AbiSource::Builtin,
        };

        Ok(Self {
            server_private_key: server_private_key.trim().to_string(),
            base_path: raw.base_path,
            host: raw.host,
            port: raw.port,
            digest_scheme,
            abi_source,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                key: "HOST",
                reason: e.to_string(),
            })
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("server_private_key", &"<redacted>")
            .field("base_path", &self.base_path)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("digest_scheme", &self.digest_scheme)
            .field("abi_source", &self.abi_source)
            .finish()
    }
}
