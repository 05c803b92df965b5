//! Transaction delivery module for the zkCRO bridge.
//!
//! This module handles submission and confirmation of transactions on both
//! layers. `ChainInterface` is the seam to a blockchain node; `DeliveryService`
//! wraps one node per layer and provides the submitter and confirmation-waiter
//! contracts the bridge flow relies on. `PriorityOpInterface` is the L2-side
//! lookup that turns an L1 priority operation into its L2 transaction.

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use bridge_types::{
	ChainTransaction, L2Transaction, Layer, PendingTransaction, Transaction, TransactionHash,
	TransactionReceipt,
};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::instrument;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
		pub(crate) mod rpc;
	}
	pub mod zksync;
}

/// Errors that can occur during transaction delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// The node rejected the transaction.
	#[error("Submission rejected: {0}")]
	Submission(String),
	/// The transaction was not mined within the layer's confirmation timeout.
	#[error("Timed out after {seconds}s waiting for {hash} on {layer}")]
	ConfirmationTimeout {
		hash: TransactionHash,
		layer: Layer,
		seconds: u64,
	},
	/// The transaction was mined but its execution failed.
	#[error("Transaction {hash} reverted in block {block_number}")]
	TransactionReverted {
		hash: TransactionHash,
		block_number: u64,
	},
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// The request does not match this client.
	#[error("Invalid input: {0}")]
	InvalidInput(String),
}

/// Interface to a blockchain node.
///
/// One implementation instance serves one layer. Implementations must not
/// retry submissions; confirmation waits may poll internally.
#[async_trait]
pub trait ChainInterface: Send + Sync {
	/// Signs and submits a call, returning its hash once the node accepts it.
	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, DeliveryError>;

	/// Waits until the transaction is mined with the requested number of confirmations.
	///
	/// Does not enforce a timeout; the caller bounds the wait.
	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
		confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError>;

	/// Returns the transaction object if the node still indexes it.
	async fn get_transaction(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<ChainTransaction>, DeliveryError>;

	/// Executes a read-only call against the latest block.
	async fn call(&self, tx: &Transaction) -> Result<Bytes, DeliveryError>;

	/// Current gas price in wei.
	async fn get_gas_price(&self) -> Result<U256, DeliveryError>;

	async fn get_chain_id(&self) -> Result<u64, DeliveryError>;
}

/// Errors raised while resolving an L2 transaction from a priority operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PriorityOpError {
	/// Index miss or RPC failure; retrying may succeed.
	#[error("Transient resolution error: {0}")]
	Transient(String),
	/// The priority operation can never resolve (e.g. malformed or reverted).
	#[error("Permanent resolution error: {0}")]
	Permanent(String),
}

/// L2-side lookup of the transaction created by an L1 priority operation.
#[async_trait]
pub trait PriorityOpInterface: Send + Sync {
	/// Resolves the L2 transaction for the given L1 transaction.
	///
	/// Returns `Ok(None)` while the L2 node has not indexed it yet.
	async fn l2_transaction_from_priority_op(
		&self,
		l1_tx: &ChainTransaction,
	) -> Result<Option<L2Transaction>, PriorityOpError>;

	/// Address of the L1 Bridgehub serving the rollup, when the node exposes it.
	async fn bridgehub_address(&self) -> Result<Option<Address>, PriorityOpError> {
		Ok(None)
	}
}

/// Delivery settings for one layer.
#[derive(Debug, Clone)]
pub struct DeliverySettings {
	/// Confirmations required before a receipt is returned.
	pub confirmations: u64,
	/// Upper bound on a single confirmation wait.
	pub confirmation_timeout: Duration,
}

/// Submitter and confirmation waiter for one layer.
///
/// Receipts are cached by hash so confirming the same pending transaction
/// twice yields the same receipt.
pub struct DeliveryService {
	layer: Layer,
	implementation: Box<dyn ChainInterface>,
	settings: DeliverySettings,
	receipts: Mutex<HashMap<TransactionHash, TransactionReceipt>>,
}

impl DeliveryService {
	pub fn new(
		layer: Layer,
		implementation: Box<dyn ChainInterface>,
		settings: DeliverySettings,
	) -> Self {
		Self {
			layer,
			implementation,
			settings,
			receipts: Mutex::new(HashMap::new()),
		}
	}

	pub fn layer(&self) -> Layer {
		self.layer
	}

	/// Submits a call and returns as soon as the node accepts it into its pool.
	///
	/// Rejections surface as [`DeliveryError::Submission`] and are never retried.
	pub async fn submit(&self, tx: Transaction) -> Result<PendingTransaction, DeliveryError> {
		let hash = self.implementation.submit(tx).await?;
		tracing::info!(layer = %self.layer, tx_hash = %hash, "Transaction created");
		Ok(PendingTransaction::new(hash, self.layer))
	}

	/// Suspends until the pending transaction is mined and returns its receipt.
	///
	/// Fails with [`DeliveryError::ConfirmationTimeout`] once the layer's
	/// timeout elapses and with [`DeliveryError::TransactionReverted`] when
	/// the transaction was mined but failed.
	#[instrument(skip_all, fields(layer = %self.layer, tx_hash = %pending.hash))]
	pub async fn confirm(
		&self,
		pending: &PendingTransaction,
	) -> Result<TransactionReceipt, DeliveryError> {
		if pending.layer != self.layer {
			return Err(DeliveryError::InvalidInput(format!(
				"{} transaction {} cannot be confirmed on {}",
				pending.layer, pending.hash, self.layer
			)));
		}

		if let Some(receipt) = self.receipts.lock().await.get(&pending.hash) {
			return Ok(receipt.clone());
		}

		let wait = self
			.implementation
			.wait_for_confirmation(&pending.hash, self.settings.confirmations);
		let receipt = match tokio::time::timeout(self.settings.confirmation_timeout, wait).await {
			Ok(result) => result?,
			Err(_) => {
				return Err(DeliveryError::ConfirmationTimeout {
					hash: pending.hash,
					layer: self.layer,
					seconds: self.settings.confirmation_timeout.as_secs(),
				});
			},
		};

		if !receipt.success {
			return Err(DeliveryError::TransactionReverted {
				hash: receipt.hash,
				block_number: receipt.block_number,
			});
		}

		tracing::info!(block_number = receipt.block_number, "Transaction included");
		self.receipts
			.lock()
			.await
			.insert(pending.hash, receipt.clone());
		Ok(receipt)
	}

	pub async fn get_transaction(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<ChainTransaction>, DeliveryError> {
		self.implementation.get_transaction(hash).await
	}

	pub async fn call(&self, tx: &Transaction) -> Result<Bytes, DeliveryError> {
		self.implementation.call(tx).await
	}

	pub async fn get_gas_price(&self) -> Result<U256, DeliveryError> {
		self.implementation.get_gas_price().await
	}

	pub async fn get_chain_id(&self) -> Result<u64, DeliveryError> {
		self.implementation.get_chain_id().await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::B256;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Arc;

	/// Chain that mines every transaction after a fixed delay.
	struct SimulatedChain {
		mining_delay: Option<Duration>,
		success: bool,
		reject: bool,
		waits: Arc<AtomicUsize>,
	}

	impl SimulatedChain {
		fn mining_after(delay: Duration) -> Self {
			Self {
				mining_delay: Some(delay),
				success: true,
				reject: false,
				waits: Arc::new(AtomicUsize::new(0)),
			}
		}

		fn never_mining() -> Self {
			Self {
				mining_delay: None,
				..Self::mining_after(Duration::ZERO)
			}
		}
	}

	#[async_trait]
	impl ChainInterface for SimulatedChain {
		async fn submit(&self, _tx: Transaction) -> Result<TransactionHash, DeliveryError> {
			if self.reject {
				return Err(DeliveryError::Submission("nonce too low".into()));
			}
			Ok(TransactionHash(B256::repeat_byte(0x11)))
		}

		async fn wait_for_confirmation(
			&self,
			hash: &TransactionHash,
			_confirmations: u64,
		) -> Result<TransactionReceipt, DeliveryError> {
			self.waits.fetch_add(1, Ordering::SeqCst);
			let Some(delay) = self.mining_delay else {
				// Poll forever, like a node that dropped the transaction
				loop {
					tokio::time::sleep(Duration::from_secs(1)).await;
				}
			};
			tokio::time::sleep(delay).await;
			Ok(TransactionReceipt {
				hash: *hash,
				block_number: 42,
				gas_used: U256::from(21_000),
				gas_price: U256::from(50_000_000_000u64),
				success: self.success,
			})
		}

		async fn get_transaction(
			&self,
			_hash: &TransactionHash,
		) -> Result<Option<ChainTransaction>, DeliveryError> {
			Ok(None)
		}

		async fn call(&self, _tx: &Transaction) -> Result<Bytes, DeliveryError> {
			Ok(Bytes::new())
		}

		async fn get_gas_price(&self) -> Result<U256, DeliveryError> {
			Ok(U256::from(1))
		}

		async fn get_chain_id(&self) -> Result<u64, DeliveryError> {
			Ok(1)
		}
	}

	fn service(chain: SimulatedChain, timeout_secs: u64) -> DeliveryService {
		DeliveryService::new(
			Layer::L1,
			Box::new(chain),
			DeliverySettings {
				confirmations: 1,
				confirmation_timeout: Duration::from_secs(timeout_secs),
			},
		)
	}

	fn call() -> Transaction {
		Transaction::call(Address::ZERO, Bytes::new())
	}

	#[tokio::test(start_paused = true)]
	async fn test_confirm_returns_receipt_when_mined() {
		let delivery = service(SimulatedChain::mining_after(Duration::from_secs(30)), 600);

		let pending = delivery.submit(call()).await.unwrap();
		assert_eq!(pending.layer, Layer::L1);

		let receipt = delivery.confirm(&pending).await.unwrap();
		assert_eq!(receipt.hash, pending.hash);
		assert_eq!(receipt.block_number, 42);
	}

	#[tokio::test(start_paused = true)]
	async fn test_confirm_times_out_when_never_mined() {
		let delivery = service(SimulatedChain::never_mining(), 120);
		let pending = delivery.submit(call()).await.unwrap();

		let started = tokio::time::Instant::now();
		let err = delivery.confirm(&pending).await.unwrap_err();

		assert!(matches!(
			err,
			DeliveryError::ConfirmationTimeout { seconds: 120, layer: Layer::L1, .. }
		));
		assert!(started.elapsed() >= Duration::from_secs(120));
		assert!(started.elapsed() < Duration::from_secs(121));
	}

	#[tokio::test(start_paused = true)]
	async fn test_mined_after_timeout_is_a_timeout() {
		let delivery = service(SimulatedChain::mining_after(Duration::from_secs(300)), 120);
		let pending = delivery.submit(call()).await.unwrap();

		let err = delivery.confirm(&pending).await.unwrap_err();
		assert!(matches!(err, DeliveryError::ConfirmationTimeout { .. }));
	}

	#[tokio::test(start_paused = true)]
	async fn test_reverted_transaction_fails() {
		let mut chain = SimulatedChain::mining_after(Duration::from_secs(1));
		chain.success = false;
		let delivery = service(chain, 60);
		let pending = delivery.submit(call()).await.unwrap();

		let err = delivery.confirm(&pending).await.unwrap_err();
		assert!(matches!(
			err,
			DeliveryError::TransactionReverted { block_number: 42, .. }
		));
	}

	#[tokio::test(start_paused = true)]
	async fn test_confirm_is_idempotent() {
		let chain = SimulatedChain::mining_after(Duration::from_secs(5));
		let waits = chain.waits.clone();
		let delivery = service(chain, 60);
		let pending = delivery.submit(call()).await.unwrap();

		let first = delivery.confirm(&pending).await.unwrap();
		let second = delivery.confirm(&pending).await.unwrap();

		assert_eq!(first, second);
		assert_eq!(waits.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_submission_rejection_surfaces() {
		let mut chain = SimulatedChain::mining_after(Duration::ZERO);
		chain.reject = true;
		let delivery = service(chain, 60);

		let err = delivery.submit(call()).await.unwrap_err();
		assert!(matches!(err, DeliveryError::Submission(_)));
	}

	#[tokio::test]
	async fn test_confirm_rejects_other_layer() {
		let delivery = service(SimulatedChain::mining_after(Duration::ZERO), 60);
		let pending = PendingTransaction::new(TransactionHash(B256::ZERO), Layer::L2);

		let err = delivery.confirm(&pending).await.unwrap_err();
		assert!(matches!(err, DeliveryError::InvalidInput(_)));
	}
}
