//! Transaction delivery types for the bridge flow.
//!
//! This module defines the types that move between the submitter, the
//! confirmation waiter and the cross-layer resolver: transaction hashes,
//! call descriptions, pending handles and receipts, plus the transaction
//! views returned by the L1 and L2 nodes.

use alloy_primitives::{hex, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The chain a transaction lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
	/// The base chain (Ethereum).
	L1,
	/// The rollup (Cronos zkEVM).
	L2,
}

impl fmt::Display for Layer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Layer::L1 => write!(f, "L1"),
			Layer::L2 => write!(f, "L2"),
		}
	}
}

/// Blockchain transaction hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHash(pub B256);

impl TransactionHash {
	/// Returns the hash as a 0x-prefixed lowercase hex string.
	pub fn to_hex(&self) -> String {
		hex::encode_prefixed(self.0)
	}
}

impl fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_hex())
	}
}

impl From<B256> for TransactionHash {
	fn from(hash: B256) -> Self {
		Self(hash)
	}
}

/// Description of a contract call to be signed and submitted.
///
/// Nonce, gas and fee fields are left to the provider's fillers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
	/// Target contract.
	pub to: Address,
	/// ABI-encoded calldata.
	pub data: Bytes,
	/// Native value attached to the call.
	pub value: U256,
}

impl Transaction {
	/// Creates a call without native value.
	pub fn call(to: Address, data: impl Into<Bytes>) -> Self {
		Self {
			to,
			data: data.into(),
			value: U256::ZERO,
		}
	}
}

/// Handle for a transaction accepted into a node's pool but not yet mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingTransaction {
	pub hash: TransactionHash,
	pub layer: Layer,
}

impl PendingTransaction {
	pub fn new(hash: TransactionHash, layer: Layer) -> Self {
		Self { hash, layer }
	}
}

/// Transaction receipt containing execution details.
///
/// Provides information about a transaction after it has been included in a block,
/// including the gas figures used for fee computation and its success status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub hash: TransactionHash,
	/// The block number where the transaction was included.
	pub block_number: u64,
	/// Gas consumed by the transaction.
	pub gas_used: U256,
	/// Effective gas price paid per unit of gas, in the layer's native unit.
	pub gas_price: U256,
	/// Whether the transaction executed successfully.
	pub success: bool,
}

/// A transaction as returned by `eth_getTransactionByHash`.
///
/// On L1 this is the priority operation object handed to the L2 endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTransaction {
	pub hash: TransactionHash,
	/// `None` while the transaction is still pending.
	pub block_number: Option<u64>,
	pub from: Address,
	pub to: Option<Address>,
}

/// The L2 transaction resolved from an L1 priority operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct L2Transaction {
	pub hash: TransactionHash,
	/// `None` until the L2 transaction is sealed in a block.
	pub block_number: Option<u64>,
}
