//! Bridgehub calls for L1 → L2 deposits.
//!
//! A deposit of the rollup's base token is a `requestL2TransactionDirect`
//! call with `l2Value` set to the deposited amount and empty calldata. The
//! Bridgehub pulls `mintValue` (deposit plus L2 execution cost) from the
//! sender through the shared bridge, so ERC-20 base tokens must be approved
//! to `sharedBridge()` first.

use super::{decode_returns, ContractError};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use bridge_types::Transaction;

sol! {
	struct L2TransactionRequestDirect {
		uint256 chainId;
		uint256 mintValue;
		address l2Contract;
		uint256 l2Value;
		bytes l2Calldata;
		uint256 l2GasLimit;
		uint256 l2GasPerPubdataByteLimit;
		bytes[] factoryDeps;
		address refundRecipient;
	}

	interface IBridgehub {
		function requestL2TransactionDirect(L2TransactionRequestDirect calldata request) external payable returns (bytes32 canonicalTxHash);
		function l2TransactionBaseCost(uint256 chainId, uint256 gasPrice, uint256 l2GasLimit, uint256 l2GasPerPubdataByteLimit) external view returns (uint256);
		function baseToken(uint256 chainId) external view returns (address);
		function sharedBridge() external view returns (address);
	}
}

/// Parameters of a base-token deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectDeposit {
	pub chain_id: u64,
	/// Base token pulled from the sender: L2 execution cost plus `amount`.
	pub mint_value: U256,
	/// Amount credited to `recipient` on L2.
	pub amount: U256,
	pub recipient: Address,
	pub l2_gas_limit: u64,
	pub gas_per_pubdata_limit: u64,
}

/// `bridgehub.requestL2TransactionDirect(..)` for an ERC-20 base token.
///
/// No native value is attached; the shared bridge transfers `mint_value`.
pub fn request_l2_transaction_direct(bridgehub: Address, deposit: &DirectDeposit) -> Transaction {
	let request = L2TransactionRequestDirect {
		chainId: U256::from(deposit.chain_id),
		mintValue: deposit.mint_value,
		l2Contract: deposit.recipient,
		l2Value: deposit.amount,
		l2Calldata: Bytes::new(),
		l2GasLimit: U256::from(deposit.l2_gas_limit),
		l2GasPerPubdataByteLimit: U256::from(deposit.gas_per_pubdata_limit),
		factoryDeps: Vec::new(),
		refundRecipient: deposit.recipient,
	};
	Transaction::call(
		bridgehub,
		IBridgehub::requestL2TransactionDirectCall { request }.abi_encode(),
	)
}

/// `bridgehub.l2TransactionBaseCost(..)`, for `eth_call`.
pub fn l2_transaction_base_cost(
	bridgehub: Address,
	chain_id: u64,
	gas_price: U256,
	l2_gas_limit: u64,
	gas_per_pubdata_limit: u64,
) -> Transaction {
	let call = IBridgehub::l2TransactionBaseCostCall {
		chainId: U256::from(chain_id),
		gasPrice: gas_price,
		l2GasLimit: U256::from(l2_gas_limit),
		l2GasPerPubdataByteLimit: U256::from(gas_per_pubdata_limit),
	};
	Transaction::call(bridgehub, call.abi_encode())
}

/// `bridgehub.baseToken(chainId)`, for `eth_call`.
pub fn base_token(bridgehub: Address, chain_id: u64) -> Transaction {
	let call = IBridgehub::baseTokenCall {
		chainId: U256::from(chain_id),
	};
	Transaction::call(bridgehub, call.abi_encode())
}

/// `bridgehub.sharedBridge()`, for `eth_call`.
pub fn shared_bridge(bridgehub: Address) -> Transaction {
	Transaction::call(bridgehub, IBridgehub::sharedBridgeCall {}.abi_encode())
}

pub fn decode_base_cost(data: &[u8]) -> Result<U256, ContractError> {
	Ok(decode_returns::<IBridgehub::l2TransactionBaseCostCall>(data)?._0)
}

pub fn decode_base_token(data: &[u8]) -> Result<Address, ContractError> {
	Ok(decode_returns::<IBridgehub::baseTokenCall>(data)?._0)
}

pub fn decode_shared_bridge(data: &[u8]) -> Result<Address, ContractError> {
	Ok(decode_returns::<IBridgehub::sharedBridgeCall>(data)?._0)
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::keccak256;
	use alloy_sol_types::SolValue;

	#[test]
	fn test_request_signature() {
		assert_eq!(
			IBridgehub::requestL2TransactionDirectCall::SIGNATURE,
			"requestL2TransactionDirect((uint256,uint256,address,uint256,bytes,uint256,uint256,bytes[],address))"
		);
	}

	#[test]
	fn test_deposit_calldata_round_trips() {
		let deposit = DirectDeposit {
			chain_id: 388,
			mint_value: U256::from(3_500_000_000_000_000_000u64),
			amount: U256::from(3_000_000_000_000_000_000u64),
			recipient: Address::repeat_byte(0xf3),
			l2_gas_limit: 300_000,
			gas_per_pubdata_limit: 800,
		};
		let bridgehub = Address::repeat_byte(0xbb);
		let tx = request_l2_transaction_direct(bridgehub, &deposit);

		assert_eq!(tx.to, bridgehub);
		assert_eq!(tx.value, U256::ZERO);
		assert_eq!(
			&tx.data[..4],
			&keccak256(IBridgehub::requestL2TransactionDirectCall::SIGNATURE)[..4]
		);

		let decoded = IBridgehub::requestL2TransactionDirectCall::abi_decode(&tx.data, true)
			.unwrap()
			.request;
		assert_eq!(decoded.chainId, U256::from(388));
		assert_eq!(decoded.l2Value, deposit.amount);
		assert_eq!(decoded.mintValue, deposit.mint_value);
		assert_eq!(decoded.refundRecipient, deposit.recipient);
		assert!(decoded.l2Calldata.is_empty());
		assert!(decoded.factoryDeps.is_empty());
	}

	#[test]
	fn test_decode_addresses() {
		let token = Address::repeat_byte(0x28);
		let encoded = token.abi_encode();
		assert_eq!(decode_base_token(&encoded).unwrap(), token);
		assert_eq!(decode_shared_bridge(&encoded).unwrap(), token);
	}
}
