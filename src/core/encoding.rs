//! `0x`-hex helpers for JSON-RPC payloads.
//!
//! Data fields are even-length hex; quantities are minimal hex without
//! leading zeros (`0x0` for zero).

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexError {
    #[error("missing 0x prefix: {0}")]
    MissingPrefix(String),
    #[error("invalid hex: {0}")]
    Invalid(String),
    #[error("quantity overflows: {0}")]
    Overflow(String),
}

pub fn to_hex_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn from_hex_data(value: &str) -> Result<Vec<u8>, HexError> {
    let digits = value.strip_prefix("0x").ok_or_else(|| HexError::MissingPrefix(value.into()))?;
    hex::decode(digits).map_err(|e| HexError::Invalid(format!("{value}: {e}")))
}

pub fn to_quantity(value: u128) -> String {
    format!("{:#x}", value)
}

pub fn parse_quantity(value: &str) -> Result<u64, HexError> {
    let digits = value.strip_prefix("0x").ok_or_else(|| HexError::MissingPrefix(value.into()))?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HexError::Invalid(value.into()));
    }
    if digits.len() > 16 && digits.trim_start_matches('0').len() > 16 {
        return Err(HexError::Overflow(value.into()));
    }
    u64::from_str_radix(digits, 16).map_err(|e| HexError::Invalid(format!("{value}: {e}")))
}
