//! Fee computation for mined transactions.

use crate::{utils::format_token_amount, TransactionReceipt};
use alloy_primitives::U256;

/// Decimals of the native unit on both layers (ETH on L1, zkCRO on L2).
pub const NATIVE_DECIMALS: u8 = 18;

/// Returns the fee paid by a mined transaction: `gas_used * gas_price`.
///
/// The result is expressed in the smallest native unit of the layer that
/// produced the receipt. Saturates instead of overflowing.
pub fn compute_fee(receipt: &TransactionReceipt) -> U256 {
	receipt.gas_used.saturating_mul(receipt.gas_price)
}

/// Formats a fee in the smallest native unit as a decimal string.
pub fn format_fee(fee: U256) -> String {
	format_token_amount(&fee.to_string(), NATIVE_DECIMALS)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::TransactionHash;
	use alloy_primitives::B256;

	fn receipt(gas_used: u64, gas_price: u128) -> TransactionReceipt {
		TransactionReceipt {
			hash: TransactionHash(B256::ZERO),
			block_number: 1,
			gas_used: U256::from(gas_used),
			gas_price: U256::from(gas_price),
			success: true,
		}
	}

	#[test]
	fn test_simple_transfer_fee() {
		let fee = compute_fee(&receipt(21_000, 50_000_000_000));
		assert_eq!(fee, U256::from(1_050_000_000_000_000u64));
		assert_eq!(format_fee(fee), "0.00105");
	}

	#[test]
	fn test_zero_gas_price() {
		let fee = compute_fee(&receipt(21_000, 0));
		assert_eq!(fee, U256::ZERO);
		assert_eq!(format_fee(fee), "0");
	}

	#[test]
	fn test_fee_saturates() {
		let mut r = receipt(0, 0);
		r.gas_used = U256::MAX;
		r.gas_price = U256::from(2);
		assert_eq!(compute_fee(&r), U256::MAX);
	}
}
