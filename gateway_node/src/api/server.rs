use axum::{
    extract::{Path, State},
    http::Method,
    response::Json,
    routing::{get, post},
    Router,
};
use ethers::types::Address;
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use super::dispatch::{GatewayServer, ServerError};
use super::errors::ApiResult;
use super::validation::{parse_address, parse_calldata};
use crate::abi::GatewayAbi;
use crate::crypto::SigningContext;
use crate::handlers::default_handlers;

// Application State
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<GatewayServer>,
    pub signer: Option<Address>,
}

/// Successful CCIP-Read response
#[derive(Debug, Serialize, Deserialize)]
pub struct CcipResponse {
    pub data: String,
}

/// POST form of a CCIP-Read request
#[derive(Debug, Serialize, Deserialize)]
pub struct CcipRequest {
    pub sender: String,
    pub data: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub signer: Option<String>,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        signer: state
            .signer
            .map(|address| ethers::utils::to_checksum(&address, None)),
    })
}

/// `GET {base}/{sender}/{calldata}.json`
pub async fn lookup_get(
    State(state): State<AppState>,
    Path((sender, call_data)): Path<(String, String)>,
) -> ApiResult<Json<CcipResponse>> {
    let call_data = call_data.strip_suffix(".json").unwrap_or(&call_data);
    lookup(&state, &sender, call_data)
}

/// `POST {base}` with `{"sender": "0x…", "data": "0x…"}`
pub async fn lookup_post(
    State(state): State<AppState>,
    Json(req): Json<CcipRequest>,
) -> ApiResult<Json<CcipResponse>> {
    lookup(&state, &req.sender, &req.data)
}

fn lookup(state: &AppState, sender: &str, call_data: &str) -> ApiResult<Json<CcipResponse>> {
    let sender = parse_address(sender)?;
    let call_data = parse_calldata(call_data)?;
    let encoded = state.gateway.call(sender, &call_data)?;
    Ok(Json(CcipResponse {
        data: format!("0x{}", hex::encode(encoded)),
    }))
}

/// Normalise a mount path to `/` or `/segment[/segment…]` without a trailing slash
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

// API Router
pub fn create_router(state: AppState, base_path: &str) -> Router {
    let lookups = Router::new()
        .route("/:sender/:call_data", get(lookup_get))
        .route("/", post(lookup_post));

    let base_path = normalize_base_path(base_path);
    let mounted = if base_path == "/" {
        lookups
    } else {
        Router::new().nest(&base_path, lookups)
    };

    mounted
        .route("/health", get(health_check))
        // CCIP-Read clients include browsers
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Mount the standard handlers for `abi` under `base_path`
pub fn make_app(
    context: Arc<SigningContext>,
    abi: &GatewayAbi,
    base_path: &str,
) -> Result<Router, ServerError> {
    let mut gateway = GatewayServer::new();
    gateway.add(abi, default_handlers(context.clone()))?;

    for function in gateway.functions() {
        info!(
            "Mounted {} ({}) at {}",
            function.signature(),
            function.selector_hex(),
            normalize_base_path(base_path)
        );
    }

    let state = AppState {
        gateway: Arc::new(gateway),
        signer: Some(context.address()),
    };
    Ok(create_router(state, base_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("/"), "/");
        assert_eq!(normalize_base_path(""), "/");
        assert_eq!(normalize_base_path("/gateway/"), "/gateway");
        assert_eq!(normalize_base_path("gateway"), "/gateway");
        assert_eq!(normalize_base_path("/api/ccip"), "/api/ccip");
    }
}
