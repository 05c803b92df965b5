//! ERC-20 calls used for approvals and balance lookups.

use super::{decode_returns, ContractError};
use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use bridge_types::Transaction;

sol! {
	interface IERC20 {
		function approve(address spender, uint256 value) external returns (bool);
		function allowance(address owner, address spender) external view returns (uint256);
		function balanceOf(address account) external view returns (uint256);
	}
}

/// `token.approve(spender, amount)`.
pub fn approve(token: Address, spender: Address, amount: U256) -> Transaction {
	let call = IERC20::approveCall {
		spender,
		value: amount,
	};
	Transaction::call(token, call.abi_encode())
}

/// `token.allowance(owner, spender)`, for `eth_call`.
pub fn allowance(token: Address, owner: Address, spender: Address) -> Transaction {
	Transaction::call(token, IERC20::allowanceCall { owner, spender }.abi_encode())
}

/// `token.balanceOf(account)`, for `eth_call`.
pub fn balance_of(token: Address, account: Address) -> Transaction {
	Transaction::call(token, IERC20::balanceOfCall { account }.abi_encode())
}

pub fn decode_allowance(data: &[u8]) -> Result<U256, ContractError> {
	Ok(decode_returns::<IERC20::allowanceCall>(data)?._0)
}

pub fn decode_balance(data: &[u8]) -> Result<U256, ContractError> {
	Ok(decode_returns::<IERC20::balanceOfCall>(data)?._0)
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	const CRO: Address = address!("a0b73e1ff0b80914ab6fe0444e65848c4c34450b");
	const ZKCRO: Address = address!("28Ff2E4dD1B58efEB0fC138602A28D5aE81e44e2");

	#[test]
	fn test_approve_calldata() {
		let tx = approve(CRO, ZKCRO, U256::from(500_000_000u64));

		assert_eq!(tx.to, CRO);
		assert_eq!(tx.value, U256::ZERO);
		assert_eq!(&tx.data[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
		assert_eq!(tx.data.len(), 4 + 32 * 2);
		// Spender is left-padded into the first word
		assert_eq!(&tx.data[16..36], ZKCRO.as_slice());
		assert_eq!(U256::from_be_slice(&tx.data[36..68]), U256::from(500_000_000u64));
	}

	#[test]
	fn test_view_selectors() {
		assert_eq!(&balance_of(ZKCRO, CRO).data[..4], &[0x70, 0xa0, 0x82, 0x31]);
		assert_eq!(&allowance(ZKCRO, CRO, ZKCRO).data[..4], &[0xdd, 0x62, 0xed, 0x3e]);
	}

	#[test]
	fn test_decode_balance() {
		let word = U256::from(7_000_000_000_000_000_000u64).to_be_bytes::<32>();
		assert_eq!(
			decode_balance(&word).unwrap(),
			U256::from(7_000_000_000_000_000_000u64)
		);
	}

	#[test]
	fn test_decode_rejects_empty_return() {
		let err = decode_balance(&[]).unwrap_err();
		assert!(err.to_string().contains("balanceOf(address)"));
	}
}
