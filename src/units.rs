//! Conversion between raw token integers and decimal strings.
//!
//! A raw amount can only be scaled once the token's `decimals()` is known.

use alloy::primitives::utils::{format_units, parse_units, ParseUnits};
use alloy::primitives::U256;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitsError {
    #[error("invalid decimal number '{0}'")]
    Malformed(String),

    #[error("negative amounts are not allowed: '{0}'")]
    Negative(String),

    #[error("'{value}' has more than {decimals} fractional digits")]
    TooPrecise { value: String, decimals: u8 },

    #[error("unsupported decimals {0}")]
    Decimals(u8),
}

/// Render `raw` shifted right by `decimals`, without trailing zeros.
pub fn to_decimal_string(raw: U256, decimals: u8) -> Result<String, UnitsError> {
    if decimals == 0 {
        return Ok(raw.to_string());
    }
    let formatted = format_units(raw, decimals).map_err(|_| UnitsError::Decimals(decimals))?;
    Ok(trim_fraction(&formatted).to_string())
}

fn trim_fraction(formatted: &str) -> &str {
    if !formatted.contains('.') {
        return formatted;
    }
    formatted.trim_end_matches('0').trim_end_matches('.')
}

/// Parse a user-entered decimal and shift it left by `decimals`.
pub fn parse_decimal(value: &str, decimals: u8) -> Result<U256, UnitsError> {
    let value = value.trim();
    if value.starts_with('-') {
        return Err(UnitsError::Negative(value.to_string()));
    }

    let (int_part, frac_part) = value.split_once('.').unwrap_or((value, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !is_digits(int_part) || !is_digits(frac_part)
    {
        return Err(UnitsError::Malformed(value.to_string()));
    }
    if frac_part.len() > decimals as usize {
        return Err(UnitsError::TooPrecise {
            value: value.to_string(),
            decimals,
        });
    }

    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let normalized = if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    };
    match parse_units(&normalized, decimals) {
        Ok(ParseUnits::U256(v)) => Ok(v),
        Ok(ParseUnits::I256(_)) => Err(UnitsError::Negative(value.to_string())),
        Err(_) => Err(UnitsError::Malformed(value.to_string())),
    }
}
