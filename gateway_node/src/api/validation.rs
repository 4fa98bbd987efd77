//! Request validation for the CCIP-Read endpoints

use ethers::types::Address;

use super::errors::ValidationError;

/// Parse an EVM-style `0x` address (20 bytes)
pub fn parse_address(address: &str) -> Result<Address, ValidationError> {
    if address.is_empty() {
        return Err(ValidationError::new("sender", "Address cannot be empty", address));
    }

    let Some(hex_part) = address.strip_prefix("0x") else {
        return Err(ValidationError::new(
            "sender",
            "Address must start with '0x'",
            address,
        ));
    };

    if address.len() != 42 {
        return Err(ValidationError::new(
            "sender",
            "Address must be 42 characters long (including '0x')",
            address,
        ));
    }

    if !is_valid_hex(hex_part) {
        return Err(ValidationError::new(
            "sender",
            "Address contains invalid hex characters",
            address,
        ));
    }

    let bytes = hex::decode(hex_part)
        .map_err(|_| ValidationError::new("sender", "Address is not valid hex", address))?;
    Ok(Address::from_slice(&bytes))
}

/// Parse `0x`-prefixed calldata
pub fn parse_calldata(data: &str) -> Result<Vec<u8>, ValidationError> {
    let Some(hex_part) = data.strip_prefix("0x") else {
        return Err(ValidationError::new("data", "Calldata must start with '0x'", data));
    };

    if hex_part.len() % 2 != 0 {
        return Err(ValidationError::new(
            "data",
            "Calldata must have an even number of hex characters",
            data,
        ));
    }

    if !is_valid_hex(hex_part) {
        return Err(ValidationError::new(
            "data",
            "Calldata contains invalid hex characters",
            data,
        ));
    }

    hex::decode(hex_part)
        .map_err(|_| ValidationError::new("data", "Calldata is not valid hex", data))
}

fn is_valid_hex(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_hexdigit())
}
