//! In-memory chain used by the engine tests.

use crate::contracts::bridgehub::IBridgehub;
use crate::contracts::erc20::IERC20;
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use bridge_delivery::{ChainInterface, DeliveryError};
use bridge_types::{ChainTransaction, Transaction, TransactionHash, TransactionReceipt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Chain that mines every submitted transaction immediately and answers the
/// view calls the bridge makes from in-memory state.
#[derive(Clone)]
pub(crate) struct FakeChain {
	pub submitted: Arc<Mutex<Vec<Transaction>>>,
	pub balances: Arc<Mutex<HashMap<Address, U256>>>,
	pub allowances: Arc<Mutex<HashMap<(Address, Address), U256>>>,
	pub base_token: Address,
	pub shared_bridge: Address,
	pub base_cost: U256,
	pub gas_price: U256,
	pub chain_id: u64,
	pub success: bool,
	/// Never mines, so confirmation waits run until timeout or cancellation.
	pub stalled: bool,
}

impl Default for FakeChain {
	fn default() -> Self {
		Self {
			submitted: Arc::new(Mutex::new(Vec::new())),
			balances: Arc::new(Mutex::new(HashMap::new())),
			allowances: Arc::new(Mutex::new(HashMap::new())),
			base_token: Address::ZERO,
			shared_bridge: Address::repeat_byte(0x5b),
			base_cost: U256::ZERO,
			gas_price: U256::from(50_000_000_000u64),
			chain_id: 1,
			success: true,
			stalled: false,
		}
	}
}

impl FakeChain {
	pub fn with_balance(self, token: Address, amount: U256) -> Self {
		self.balances.lock().unwrap().insert(token, amount);
		self
	}

	pub fn with_allowance(self, token: Address, spender: Address, amount: U256) -> Self {
		self.allowances
			.lock()
			.unwrap()
			.insert((token, spender), amount);
		self
	}

	pub fn reverting(mut self) -> Self {
		self.success = false;
		self
	}

	pub fn stalled(mut self) -> Self {
		self.stalled = true;
		self
	}

	fn hash_of(index: usize) -> TransactionHash {
		TransactionHash(B256::with_last_byte(index as u8 + 1))
	}
}

#[async_trait]
impl ChainInterface for FakeChain {
	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, DeliveryError> {
		// Approvals take effect so follow-up allowance checks see them
		if let Ok(call) = IERC20::approveCall::abi_decode(&tx.data, true) {
			self.allowances
				.lock()
				.unwrap()
				.insert((tx.to, call.spender), call.value);
		}
		let mut submitted = self.submitted.lock().unwrap();
		submitted.push(tx);
		Ok(Self::hash_of(submitted.len() - 1))
	}

	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
		_confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError> {
		if self.stalled {
			std::future::pending::<()>().await;
		}
		Ok(TransactionReceipt {
			hash: *hash,
			block_number: 100 + hash.0[31] as u64,
			gas_used: U256::from(21_000),
			gas_price: self.gas_price,
			success: self.success,
		})
	}

	async fn get_transaction(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<ChainTransaction>, DeliveryError> {
		Ok(Some(ChainTransaction {
			hash: *hash,
			block_number: Some(100),
			from: Address::repeat_byte(0xf3),
			to: None,
		}))
	}

	async fn call(&self, tx: &Transaction) -> Result<Bytes, DeliveryError> {
		let data = &tx.data;
		let encoded = if IERC20::balanceOfCall::abi_decode(data, true).is_ok() {
			let balances = self.balances.lock().unwrap();
			balances.get(&tx.to).copied().unwrap_or_default().abi_encode()
		} else if let Ok(call) = IERC20::allowanceCall::abi_decode(data, true) {
			let allowances = self.allowances.lock().unwrap();
			allowances
				.get(&(tx.to, call.spender))
				.copied()
				.unwrap_or_default()
				.abi_encode()
		} else if IBridgehub::baseTokenCall::abi_decode(data, true).is_ok() {
			self.base_token.abi_encode()
		} else if IBridgehub::sharedBridgeCall::abi_decode(data, true).is_ok() {
			self.shared_bridge.abi_encode()
		} else if IBridgehub::l2TransactionBaseCostCall::abi_decode(data, true).is_ok() {
			self.base_cost.abi_encode()
		} else {
			return Err(DeliveryError::Network("execution reverted".into()));
		};
		Ok(Bytes::from(encoded))
	}

	async fn get_gas_price(&self) -> Result<U256, DeliveryError> {
		Ok(self.gas_price)
	}

	async fn get_chain_id(&self) -> Result<u64, DeliveryError> {
		Ok(self.chain_id)
	}
}
