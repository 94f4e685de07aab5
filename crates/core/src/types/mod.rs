//! Shared type definitions and newtypes

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a `0x`-prefixed 20-byte hex address
pub const ADDRESS_LEN: usize = 42;

/// ERC-20 token contract address, validated on construction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenAddress(String);

impl TokenAddress {
    /// Parse and validate a `0x` + 40 hex digit address.
    /// Case is preserved so checksummed addresses round-trip.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.len() != ADDRESS_LEN {
            return Err(Error::InvalidAddress(format!(
                "expected {} characters, got {}",
                ADDRESS_LEN,
                trimmed.len()
            )));
        }
        let Some(hex) = trimmed.strip_prefix("0x") else {
            return Err(Error::InvalidAddress("missing 0x prefix".to_string()));
        };
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidAddress(format!("non-hex digits in {}", trimmed)));
        }
        Ok(TokenAddress(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short display form, e.g. `0x1f9840...01F984`
    pub fn short(&self) -> String {
        format!("{}...{}", &self.0[..8], &self.0[self.0.len() - 6..])
    }

    /// Placeholder ticker derived from the address until a token registry exists
    pub fn placeholder_symbol(&self) -> String {
        format!("TKN{}", self.0[2..6].to_uppercase())
    }
}

impl TryFrom<String> for TokenAddress {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        TokenAddress::parse(&value)
    }
}

impl From<TokenAddress> for String {
    fn from(address: TokenAddress) -> Self {
        address.0
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Percentage value (e.g., for price change, sell fraction)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Percent(pub f64);

impl Percent {
    pub fn new(value: f64) -> Self {
        Percent(value)
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }

    /// Relative change from `from` to `to`, in percent
    pub fn change(from: f64, to: f64) -> Self {
        Percent((to - from) / from * 100.0)
    }

    /// Apply this percentage to a quantity
    pub fn of(&self, quantity: f64) -> f64 {
        quantity * self.0 / 100.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}
