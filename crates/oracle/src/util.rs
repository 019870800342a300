use crate::{Error, Result};
use alloy::primitives::{
    Address, B256, U256,
    utils::{format_ether, parse_ether},
};
use std::str::FromStr;

/// Parse a 0x-prefixed 32-byte transaction hash.
pub fn parse_tx_hash(raw: &str) -> Result<B256> {
    let hex = raw.strip_prefix("0x").unwrap_or(raw);
    if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidTxHash(raw.to_string()));
    }
    B256::from_str(raw).map_err(|_| Error::InvalidTxHash(raw.to_string()))
}

/// Parse a 0x-prefixed 20-byte account address.
pub fn parse_address(raw: &str) -> Result<Address> {
    let hex = raw.strip_prefix("0x").unwrap_or(raw);
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidAddress(raw.to_string()));
    }
    Address::from_str(raw).map_err(|_| Error::InvalidAddress(raw.to_string()))
}

/// Render a smallest-unit amount as a trimmed human decimal, e.g.
/// 8_000_000_000_000_000_000 -> "8" and 1_500_000_000_000_000_000 -> "1.5".
///
/// The lucky-digit and death-number checks run over this representation, so
/// trailing zeros must not survive trimming.
pub fn format_amount(wei: U256) -> String {
    let s = format_ether(wei);
    match s.split_once('.') {
        Some((int, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                int.to_string()
            } else {
                format!("{int}.{frac}")
            }
        }
        None => s,
    }
}

/// Parse a human decimal amount (e.g. "8" or "0.88") into smallest units.
pub fn parse_amount(human: &str) -> Result<U256> {
    Ok(parse_ether(human)?)
}
