//! Lenient JSON-RPC views of receipts, logs and transactions.
//!
//! zkSync-based rollups return transaction types (e.g. `0xff` priority
//! transactions) that the Ethereum envelope types cannot decode, so both
//! layers are read through these field-level structs instead.

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use bridge_types::{ChainTransaction, TransactionHash, TransactionReceipt};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcReceipt {
	pub transaction_hash: B256,
	pub block_number: Option<U64>,
	pub gas_used: U256,
	#[serde(default)]
	pub effective_gas_price: Option<U256>,
	#[serde(default)]
	pub gas_price: Option<U256>,
	#[serde(default)]
	pub status: Option<U64>,
	#[serde(default)]
	pub logs: Vec<RpcLog>,
}

impl RpcReceipt {
	/// Pre-Byzantium receipts carry no status and are treated as successful.
	pub fn success(&self) -> bool {
		self.status.map_or(true, |status| status == U64::from(1))
	}

	/// Converts to a receipt; `None` while the transaction has no block yet.
	pub fn into_receipt(self) -> Option<TransactionReceipt> {
		let success = self.success();
		let block_number = self.block_number?.to::<u64>();
		Some(TransactionReceipt {
			hash: TransactionHash(self.transaction_hash),
			block_number,
			gas_used: self.gas_used,
			gas_price: self
				.effective_gas_price
				.or(self.gas_price)
				.unwrap_or(U256::ZERO),
			success,
		})
	}
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RpcLog {
	pub address: Address,
	#[serde(default)]
	pub topics: Vec<B256>,
	#[serde(default)]
	pub data: Bytes,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcTransaction {
	pub hash: B256,
	pub block_number: Option<U64>,
	pub from: Address,
	#[serde(default)]
	pub to: Option<Address>,
}

impl From<RpcTransaction> for ChainTransaction {
	fn from(tx: RpcTransaction) -> Self {
		ChainTransaction {
			hash: TransactionHash(tx.hash),
			block_number: tx.block_number.map(|n| n.to::<u64>()),
			from: tx.from,
			to: tx.to,
		}
	}
}
