use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use ccip_gateway_node::{
    abi::GatewayAbi,
    api::{make_app, ApiError, CcipResponse, HealthResponse},
    crypto::{keccak256, recover_address, DigestScheme, ServerSigner, Signature65, SigningContext},
};
use ethers::abi::{ParamType, Token};
use std::sync::Arc;
use tower::ServiceExt;

const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const SENDER: &str = "0x8464135c8f25da09e49bc8782676a84730c318bc";

fn context(scheme: DigestScheme) -> Arc<SigningContext> {
    Arc::new(SigningContext::new(ServerSigner::from_hex(KEY).unwrap(), scheme))
}

fn app(base_path: &str) -> Router {
    make_app(
        context(DigestScheme::Prefixed),
        &GatewayAbi::gateway().unwrap(),
        base_path,
    )
    .unwrap()
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn lookup(app: Router, uri: &str) -> Vec<u8> {
    let (status, body) = get(app, uri).await;
    assert_eq!(status, StatusCode::OK);
    let response: CcipResponse = serde_json::from_slice(&body).unwrap();
    assert!(response.data.starts_with("0x"));
    hex::decode(&response.data[2..]).unwrap()
}

fn decode_signed(data: &[u8]) -> (Vec<u8>, Signature65) {
    let tokens = ethers::abi::decode(&[ParamType::Bytes, ParamType::Bytes], data).unwrap();
    match (tokens[0].clone(), tokens[1].clone()) {
        (Token::Bytes(result), Token::Bytes(signature)) => {
            (result, Signature65::from_slice(&signature).unwrap())
        }
        other => panic!("unexpected tokens {other:?}"),
    }
}

fn prefixed_digest(payload: &[u8]) -> [u8; 32] {
    let mut message = vec![0x19, 0x00];
    message.extend_from_slice(&keccak256(payload));
    keccak256(message)
}

#[tokio::test]
async fn test_hello() {
    let data = lookup(app("/"), &format!("/{}/0x19ff1d21.json", SENDER)).await;
    let decoded = ethers::abi::decode(&[ParamType::String], &data).unwrap();
    assert_eq!(decoded, vec![Token::String("hello".to_string())]);
}

#[tokio::test]
async fn test_signed_hello_recovers_server_address() {
    let data = lookup(app("/"), &format!("/{}/0xf7085ce9.json", SENDER)).await;
    let (result, signature) = decode_signed(&data);

    let decoded = ethers::abi::decode(&[ParamType::String], &result).unwrap();
    assert_eq!(decoded, vec![Token::String("hello".to_string())]);
    assert_eq!(signature.to_hex().len(), 132);

    let recovered = recover_address(&prefixed_digest(&result), &signature).unwrap();
    assert_eq!(
        format!("{:?}", recovered),
        "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
    );
}

#[tokio::test]
async fn test_signed_responses_are_deterministic() {
    let uri = format!("/{}/0xf7085ce9.json", SENDER);
    let first = lookup(app("/"), &uri).await;
    let second = lookup(app("/"), &uri).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_get_version() {
    let data = lookup(app("/"), &format!("/{}/0x0d8e6e2c.json", SENDER)).await;
    let (result, signature) = decode_signed(&data);

    let decoded = ethers::abi::decode(&[ParamType::String], &result).unwrap();
    assert_eq!(decoded, vec![Token::String("1.0.0".to_string())]);

    let recovered = recover_address(&prefixed_digest(&result), &signature).unwrap();
    assert_eq!(recovered, ServerSigner::from_hex(KEY).unwrap().address());
}

#[tokio::test]
async fn test_plain_scheme_signs_single_hash() {
    let app = make_app(
        context(DigestScheme::Plain),
        &GatewayAbi::gateway().unwrap(),
        "/",
    )
    .unwrap();
    let data = lookup(app, &format!("/{}/0xf7085ce9.json", SENDER)).await;
    let (result, signature) = decode_signed(&data);

    let expected = ServerSigner::from_hex(KEY).unwrap().address();
    assert_eq!(recover_address(&keccak256(&result), &signature).unwrap(), expected);
    assert_ne!(
        recover_address(&prefixed_digest(&result), &signature).ok(),
        Some(expected)
    );
}

#[tokio::test]
async fn test_suffix_is_optional() {
    let with_suffix = lookup(app("/"), &format!("/{}/0x19ff1d21.json", SENDER)).await;
    let without = lookup(app("/"), &format!("/{}/0x19ff1d21", SENDER)).await;
    assert_eq!(with_suffix, without);
}

#[tokio::test]
async fn test_unknown_selector() {
    let (status, body) = get(app("/"), &format!("/{}/0xdeadbeef.json", SENDER)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: ApiError = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.code, 404);
    assert!(error.message.contains("0xdeadbeef"));
}

#[tokio::test]
async fn test_invalid_requests() {
    let (status, body) = get(app("/"), "/0x1234/0x19ff1d21.json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ApiError = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.details.unwrap()["field"], "sender");

    let (status, _) = get(app("/"), &format!("/{}/0x19ff1d2.json", SENDER)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(app("/"), &format!("/{}/0x19ff.json", SENDER)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_post_matches_get() {
    let from_get = lookup(app("/"), &format!("/{}/0x19ff1d21.json", SENDER)).await;

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "sender": SENDER, "data": "0x19ff1d21" }).to_string(),
        ))
        .unwrap();
    let response = app("/").oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let response: CcipResponse = serde_json::from_slice(&body).unwrap();

    assert_eq!(hex::decode(&response.data[2..]).unwrap(), from_get);
}

#[tokio::test]
async fn test_base_path() {
    let app = app("/gateway");
    let data = lookup(app.clone(), &format!("/gateway/{}/0x19ff1d21.json", SENDER)).await;
    assert!(!data.is_empty());

    let (status, _) = get(app, &format!("/{}/0x19ff1d21.json", SENDER)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(app("/"), "/health").await;
    assert_eq!(status, StatusCode::OK);
    let health: HealthResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(
        health.signer.as_deref(),
        Some("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
    );
}

#[tokio::test]
async fn test_live_listener() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app("/");
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{}/{}/0x0d8e6e2c.json", addr, SENDER))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: CcipResponse = response.json().await.unwrap();
    let (result, _) = decode_signed(&hex::decode(&body.data[2..]).unwrap());
    let decoded = ethers::abi::decode(&[ParamType::String], &result).unwrap();
    assert_eq!(decoded, vec![Token::String("1.0.0".to_string())]);

    let response = client
        .get(format!("http://{}/{}/0xdeadbeef.json", addr, SENDER))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}
