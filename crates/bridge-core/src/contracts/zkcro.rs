//! zkCRO staking call.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use bridge_types::Transaction;

sol! {
	interface IZkCro {
		function stake(address receiver, uint256 amount) external returns (uint256);
	}
}

/// `zkcro.stake(receiver, amount)`: pulls `amount` of the approved token and
/// mints the wrapped token to `receiver`.
pub fn stake(zkcro: Address, receiver: Address, amount: U256) -> Transaction {
	Transaction::call(zkcro, IZkCro::stakeCall { receiver, amount }.abi_encode())
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::keccak256;

	#[test]
	fn test_stake_calldata() {
		let receiver = Address::repeat_byte(0x42);
		let tx = stake(Address::repeat_byte(0x28), receiver, U256::from(5));

		assert_eq!(&tx.data[..4], &keccak256("stake(address,uint256)")[..4]);
		assert_eq!(&tx.data[16..36], receiver.as_slice());
		assert_eq!(tx.value, U256::ZERO);
	}
}
