//! String formatting utilities.
//!
//! Provides helpers for displaying hashes and converting token amounts between
//! their human-readable decimal form and the raw on-chain integer form.

use alloy_primitives::{utils::parse_units, U256};
use thiserror::Error;

/// Errors raised while converting a decimal amount to on-chain units.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
	#[error("Amount cannot be negative: {0}")]
	Negative(String),
	#[error("Invalid amount '{amount}': {message}")]
	Invalid { amount: String, message: String },
}

/// Utility function to truncate a hex string for display purposes.
///
/// Shows only the first 10 characters (0x plus 4 bytes) followed by "..".
pub fn truncate_id(id: &str) -> String {
	if id.len() <= 10 {
		id.to_string()
	} else {
		format!("{}..", &id[..10])
	}
}

/// Formats a token amount with decimal places for display.
///
/// Converts a raw token amount (as stored on-chain) to a human-readable
/// format with proper decimal placement, e.g. "1.5" or "1000".
pub fn format_token_amount(amount: &str, decimals: u8) -> String {
	if decimals == 0 {
		return amount.to_string();
	}

	let decimal_places = decimals as usize;

	let (integer_part, decimal_part) = if amount.len() <= decimal_places {
		let decimal_str = format!("{:0>width$}", amount, width = decimal_places);
		("0".to_string(), decimal_str)
	} else {
		let split_pos = amount.len() - decimal_places;
		(
			amount[..split_pos].to_string(),
			amount[split_pos..].to_string(),
		)
	};

	let decimal_trimmed = decimal_part.trim_end_matches('0');

	if decimal_trimmed.is_empty() {
		integer_part
	} else {
		format!("{}.{}", integer_part, decimal_trimmed)
	}
}

/// Converts a human-readable decimal amount into raw on-chain units.
///
/// `parse_token_amount("5", 8)` yields `500_000_000` (CRO has 8 decimals
/// on Ethereum).
pub fn parse_token_amount(amount: &str, decimals: u8) -> Result<U256, AmountError> {
	let trimmed = amount.trim();
	if trimmed.starts_with('-') {
		return Err(AmountError::Negative(trimmed.to_string()));
	}

	parse_units(trimmed, decimals)
		.map(|parsed| parsed.get_absolute())
		.map_err(|e| AmountError::Invalid {
			amount: trimmed.to_string(),
			message: e.to_string(),
		})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_truncate_id() {
		assert_eq!(truncate_id("0x12345678"), "0x12345678");
		assert_eq!(truncate_id("0x1234567890abcdef"), "0x12345678..");
	}

	#[test]
	fn test_format_token_amount() {
		// 18 decimals (zkCRO, ETH)
		assert_eq!(format_token_amount("1000000000000000000", 18), "1");
		assert_eq!(format_token_amount("1500000000000000000", 18), "1.5");
		assert_eq!(format_token_amount("1050000000000000", 18), "0.00105");

		// 8 decimals (CRO on Ethereum)
		assert_eq!(format_token_amount("500000000", 8), "5");
		assert_eq!(format_token_amount("12345", 8), "0.00012345");

		assert_eq!(format_token_amount("1000", 0), "1000");
	}

	#[test]
	fn test_parse_token_amount() {
		assert_eq!(parse_token_amount("5", 8).unwrap(), U256::from(500_000_000u64));
		assert_eq!(
			parse_token_amount("2", 18).unwrap(),
			U256::from(2_000_000_000_000_000_000u128)
		);
		assert_eq!(
			parse_token_amount("0.5", 18).unwrap(),
			U256::from(500_000_000_000_000_000u128)
		);
	}

	#[test]
	fn test_parse_token_amount_rejects_bad_input() {
		assert!(matches!(
			parse_token_amount("-1", 8),
			Err(AmountError::Negative(_))
		));
		assert!(matches!(
			parse_token_amount("five", 8),
			Err(AmountError::Invalid { .. })
		));
	}
}
