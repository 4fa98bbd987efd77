use ccip_gateway_node::{
    abi::GatewayAbi,
    config::{AbiSource, ConfigOverrides, GatewayConfig},
};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

fn shipped_abi_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../contracts/IGateway.abi.json")
}

#[test]
fn test_shipped_artifact_matches_builtin() {
    let from_file = GatewayAbi::from_artifact_file(shipped_abi_path()).unwrap();
    let builtin = GatewayAbi::gateway().unwrap();
    assert_eq!(from_file, builtin);

    let selectors: Vec<String> = from_file
        .functions()
        .iter()
        .map(|f| f.selector_hex())
        .collect();
    assert_eq!(selectors, vec!["0x19ff1d21", "0xf7085ce9", "0x0d8e6e2c"]);
}

#[test]
fn test_compiled_artifact_object() {
    let abi = std::fs::read_to_string(shipped_abi_path()).unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"contractName": "IGateway", "abi": {}, "bytecode": "0x"}}"#,
        abi
    )
    .unwrap();

    let from_artifact = GatewayAbi::from_artifact_file(file.path()).unwrap();
    assert_eq!(from_artifact, GatewayAbi::gateway().unwrap());
}

#[test]
fn test_configured_artifact_source() {
    let env: HashMap<String, String> = [
        (
            "SERVER_PRIVATE_KEY".to_string(),
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string(),
        ),
        (
            "ABI_PATH".to_string(),
            shipped_abi_path().to_string_lossy().into_owned(),
        ),
    ]
    .into_iter()
    .collect();

    let config =
        GatewayConfig::from_sources(None, Some(env), &ConfigOverrides::default()).unwrap();
    assert_eq!(config.abi_source, AbiSource::Artifact(shipped_abi_path()));
    assert_eq!(config.abi_source.load().unwrap(), GatewayAbi::gateway().unwrap());
}

#[test]
fn test_missing_artifact() {
    let source = AbiSource::Artifact(PathBuf::from("does/not/exist.json"));
    assert!(source.load().is_err());
}
