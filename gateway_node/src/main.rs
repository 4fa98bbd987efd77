use anyhow::{Context, Result};
use ccip_gateway_node::{
    api::make_app,
    config::{ConfigOverrides, GatewayConfig},
    crypto::{ServerSigner, SigningContext},
};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

/// Gateway Arguments
#[derive(Parser)]
#[clap(name = "ccip-gateway")]
#[clap(about = "CCIP-Read gateway serving signed off-chain responses")]
struct Args {
    /// Optional configuration file (toml, yaml or json)
    #[clap(long)]
    config: Option<PathBuf>,

    /// Interface to bind
    #[clap(long)]
    host: Option<String>,

    /// Port to listen on
    #[clap(long)]
    port: Option<u16>,

    /// Path the gateway is mounted under
    #[clap(long)]
    base_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if dotenv::dotenv().is_ok() {
        info!("Loaded environment from .env");
    }

    let args = Args::parse();
    let overrides = ConfigOverrides {
        host: args.host,
        port: args.port,
        base_path: args.base_path,
    };

    let config = GatewayConfig::load(args.config.as_deref(), &overrides)
        .context("Failed to load gateway configuration")?;

    let signer = ServerSigner::from_hex(&config.server_private_key)
        .context("SERVER_PRIVATE_KEY is not a valid secp256k1 secret key")?;
    info!("Signer address: {:?}", signer.address());
    info!("Digest scheme: {}", config.digest_scheme);

    let abi = config
        .abi_source
        .load()
        .with_context(|| format!("Failed to load gateway ABI from {}", config.abi_source))?;

    let context = Arc::new(SigningContext::new(signer, config.digest_scheme));
    let app = make_app(context, &abi, &config.base_path).context("Failed to mount handlers")?;

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("CCIP-Read gateway listening on http://{}{}", addr, config.base_path);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
