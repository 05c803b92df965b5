//! zkSync-style priority operation lookup.
//!
//! An L1 deposit through the Bridgehub makes the chain's diamond proxy emit a
//! `NewPriorityRequest` event. Its second data word is the canonical hash of
//! the L2 transaction the sequencer executes for the operation, which the L2
//! node indexes like any other transaction once the operation is processed.

use super::evm::alloy::HttpProvider;
use super::evm::rpc::{RpcLog, RpcReceipt, RpcTransaction};
use crate::{DeliveryError, PriorityOpError, PriorityOpInterface};
use alloy_primitives::{b256, Address, B256};
use alloy_provider::RootProvider;
use async_trait::async_trait;
use bridge_config::Config;
use bridge_types::{ChainTransaction, L2Transaction, TransactionHash};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// `keccak256` of the `NewPriorityRequest` event signature emitted by the
/// diamond proxy for every L1 → L2 priority operation.
pub const NEW_PRIORITY_REQUEST_TOPIC: B256 =
	b256!("4531cd5795773d7101c17bdeb9f5ab7f47d7056017506f937083be5d6e77a382");

/// Extracts the canonical L2 transaction hash from an L1 receipt's logs.
pub(crate) fn priority_op_l2_hash(
	logs: &[RpcLog],
	main_contract: Address,
) -> Result<B256, PriorityOpError> {
	let log = logs
		.iter()
		.find(|log| {
			log.address == main_contract
				&& log.topics.first() == Some(&NEW_PRIORITY_REQUEST_TOPIC)
		})
		.ok_or_else(|| {
			PriorityOpError::Permanent(format!(
				"No NewPriorityRequest event from {} in L1 receipt",
				main_contract
			))
		})?;

	// Data layout: txId, txHash, expirationTimestamp, ...
	if log.data.len() < 64 {
		return Err(PriorityOpError::Permanent(format!(
			"NewPriorityRequest data too short: {} bytes",
			log.data.len()
		)));
	}
	Ok(B256::from_slice(&log.data[32..64]))
}

/// Resolves L2 transactions for L1 priority operations on a zkSync-based rollup.
pub struct ZkSyncPriorityOps {
	l1: HttpProvider,
	l2: HttpProvider,
	main_contract: OnceCell<Address>,
}

impl ZkSyncPriorityOps {
	/// Creates a read-only resolver for the given L1 and L2 endpoints.
	///
	/// When `main_contract` is `None` it is fetched from L2 on first use.
	pub fn new(
		l1_rpc_url: &str,
		l2_rpc_url: &str,
		main_contract: Option<Address>,
	) -> Result<Self, DeliveryError> {
		let l1_url = l1_rpc_url
			.parse()
			.map_err(|e| DeliveryError::Network(format!("Invalid L1 RPC URL: {}", e)))?;
		let l2_url = l2_rpc_url
			.parse()
			.map_err(|e| DeliveryError::Network(format!("Invalid L2 RPC URL: {}", e)))?;

		Ok(Self {
			l1: Arc::new(RootProvider::new_http(l1_url)),
			l2: Arc::new(RootProvider::new_http(l2_url)),
			main_contract: OnceCell::new_with(main_contract),
		})
	}

	/// Address of the diamond proxy that emits priority requests.
	pub async fn main_contract(&self) -> Result<Address, PriorityOpError> {
		self.main_contract
			.get_or_try_init(|| async {
				let address: Address = self
					.l2
					.client()
					.request_noparams("zks_getMainContract")
					.await
					.map_err(|e| {
						PriorityOpError::Transient(format!("zks_getMainContract failed: {}", e))
					})?;
				tracing::debug!(main_contract = %address, "Discovered main contract");
				Ok(address)
			})
			.await
			.copied()
	}
}

#[async_trait]
impl PriorityOpInterface for ZkSyncPriorityOps {
	async fn l2_transaction_from_priority_op(
		&self,
		l1_tx: &ChainTransaction,
	) -> Result<Option<L2Transaction>, PriorityOpError> {
		let receipt: Option<RpcReceipt> = self
			.l1
			.client()
			.request("eth_getTransactionReceipt", (l1_tx.hash.0,))
			.await
			.map_err(|e| PriorityOpError::Transient(format!("L1 receipt lookup failed: {}", e)))?;

		let Some(receipt) = receipt else {
			return Ok(None);
		};
		if !receipt.success() {
			return Err(PriorityOpError::Permanent(format!(
				"L1 transaction {} reverted",
				l1_tx.hash
			)));
		}

		let main_contract = self.main_contract().await?;
		let l2_hash = priority_op_l2_hash(&receipt.logs, main_contract)?;

		let l2_tx: Option<RpcTransaction> = self
			.l2
			.client()
			.request("eth_getTransactionByHash", (l2_hash,))
			.await
			.map_err(|e| PriorityOpError::Transient(format!("L2 lookup failed: {}", e)))?;

		Ok(l2_tx.map(|tx| L2Transaction {
			hash: TransactionHash(tx.hash),
			block_number: tx.block_number.map(|n| n.to::<u64>()),
		}))
	}

	async fn bridgehub_address(&self) -> Result<Option<Address>, PriorityOpError> {
		self.l2
			.client()
			.request_noparams("zks_getBridgehubContract")
			.await
			.map_err(|e| {
				PriorityOpError::Transient(format!("zks_getBridgehubContract failed: {}", e))
			})
	}
}

/// Creates the priority-operation lookup for the configured L1 and L2 endpoints.
pub fn create_priority_ops(
	config: &Config,
) -> Result<Arc<dyn PriorityOpInterface>, DeliveryError> {
	let ops = ZkSyncPriorityOps::new(
		&config.l1.rpc_url,
		&config.l2.rpc_url,
		config.bridge.main_contract_address,
	)?;
	Ok(Arc::new(ops))
}
