//! Amount Codec
//!
//! Converts decimal major-unit amounts ("0.02" ETH) into the minor-unit
//! integer (wei) that transaction payloads carry as `0x`-prefixed hex.
//!
//! Precision is fixed at 18 fractional digits. Digits beyond that are
//! discarded, never rounded.

use alloy_primitives::U256;

use crate::error::{PaymentError, Result};

/// Fractional digits of the native currency
pub const MINOR_UNIT_DECIMALS: usize = 18;

/// Split a decimal string into integer and fractional digits.
///
/// Accepts `^\d+(\.\d*)?$`; an empty fraction reads as zero.
fn split_decimal(amount: &str) -> Result<(&str, &str)> {
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PaymentError::InvalidAmount(format!(
            "'{amount}' is not a non-negative decimal"
        )));
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PaymentError::InvalidAmount(format!(
            "'{amount}' has a malformed fractional part"
        )));
    }

    Ok((whole, fraction))
}

/// Check that an amount is well formed and within the supported precision
pub fn validate(amount: &str) -> Result<()> {
    let (_, fraction) = split_decimal(amount)?;
    if fraction.len() > MINOR_UNIT_DECIMALS {
        return Err(PaymentError::InvalidAmount(format!(
            "'{amount}' has more than {MINOR_UNIT_DECIMALS} fractional digits"
        )));
    }
    Ok(())
}

/// Encode a decimal amount as a minor-unit integer
pub fn to_minor_units(amount: &str) -> Result<U256> {
    let (whole, fraction) = split_decimal(amount)?;

    let mut digits = String::with_capacity(whole.len() + MINOR_UNIT_DECIMALS);
    digits.push_str(whole);
    // pad to exactly 18 digits, truncating any excess
    let kept = &fraction[..fraction.len().min(MINOR_UNIT_DECIMALS)];
    digits.push_str(kept);
    digits.extend(std::iter::repeat_n('0', MINOR_UNIT_DECIMALS - kept.len()));

    U256::from_str_radix(&digits, 10)
        .map_err(|e| PaymentError::InvalidAmount(format!("'{amount}': {e}")))
}

/// Encode a decimal amount as `0x`-prefixed lowercase hex minor units
pub fn to_minor_units_hex(amount: &str) -> Result<String> {
    let value = to_minor_units(amount)?;
    Ok(format!("{value:#x}"))
}
