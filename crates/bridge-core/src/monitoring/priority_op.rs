//! Resolution of the L2 transaction created by an L1 priority operation.
//!
//! The resolver is an explicit state machine:
//!
//! ```text
//! AwaitingL1 ──(L1 tx fetched or lookup error)──▶ Polling { attempts } ──(L2 tx found)──▶ Resolved
//!      │                                              │  ▲
//!      │                                              └──┘ miss / transient error
//!      │                                              │
//!      │                                              └──(cancelled)──▶ Aborted
//!      └──(L1 node answers without the tx)──▶ L1TransactionUnavailable
//! ```
//!
//! Polling has no retry cap and no elapsed-time cap; only cancellation or a
//! permanent error from the L2 lookup ends it without a result.

use async_trait::async_trait;
use bridge_delivery::{DeliveryService, PriorityOpError, PriorityOpInterface};
use bridge_types::{
	truncate_id, ChainTransaction, L2Transaction, TransactionHash, TransactionReceipt,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Source of the delay between poll iterations.
#[async_trait]
pub trait Timer: Send + Sync {
	async fn sleep(&self, duration: Duration);
}

/// [`Timer`] backed by the tokio clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
	async fn sleep(&self, duration: Duration) {
		tokio::time::sleep(duration).await;
	}
}

/// Errors that end a resolution without an L2 transaction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
	/// The L1 node no longer returns the transaction when polling starts.
	#[error("L1 transaction {0} is not available")]
	L1TransactionUnavailable(TransactionHash),
	/// The priority operation can never resolve.
	#[error("Priority operation cannot be resolved: {0}")]
	Permanent(String),
	/// Polling was cancelled before the L2 transaction appeared.
	#[error("Resolution cancelled")]
	Cancelled,
}

/// State of a single resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverState {
	AwaitingL1,
	Polling { attempts: u32 },
	Resolved { transaction: L2Transaction, attempts: u32 },
	Aborted,
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
	pub l2_transaction: L2Transaction,
	/// Poll iterations run before the L2 transaction was found.
	pub attempts: u32,
}

/// Polls the L2 node until the transaction for an L1 priority operation appears.
pub struct CrossLayerResolver {
	l1: Arc<DeliveryService>,
	priority_ops: Arc<dyn PriorityOpInterface>,
	timer: Arc<dyn Timer>,
	poll_interval: Duration,
	/// Resolutions by L1 hash; a resolved mapping never changes.
	resolved: Mutex<HashMap<TransactionHash, Resolution>>,
}

impl CrossLayerResolver {
	pub fn new(
		l1: Arc<DeliveryService>,
		priority_ops: Arc<dyn PriorityOpInterface>,
		timer: Arc<dyn Timer>,
		poll_interval: Duration,
	) -> Self {
		Self {
			l1,
			priority_ops,
			timer,
			poll_interval,
			resolved: Mutex::new(HashMap::new()),
		}
	}

	/// Resolves the L2 transaction for a mined L1 priority operation.
	///
	/// Each iteration sleeps the poll interval, re-fetches the L1 transaction
	/// and asks the L2 node for the matching transaction. Misses and transient
	/// errors continue the loop. Resolving the same L1 hash again returns the
	/// cached resolution.
	#[instrument(skip_all, fields(l1_tx_hash = %truncate_id(&l1_receipt.hash.to_hex())))]
	pub async fn resolve(
		&self,
		l1_receipt: &TransactionReceipt,
		cancel: &CancellationToken,
	) -> Result<Resolution, ResolutionError> {
		let l1_hash = l1_receipt.hash;
		if let Some(resolution) = self.resolved.lock().await.get(&l1_hash) {
			return Ok(resolution.clone());
		}

		tracing::info!("Retrieving the corresponding L2 transaction...");

		let mut state = ResolverState::AwaitingL1;
		loop {
			state = match state {
				ResolverState::AwaitingL1 => match self.l1.get_transaction(&l1_hash).await {
					Ok(Some(_)) => ResolverState::Polling { attempts: 0 },
					Ok(None) => return Err(ResolutionError::L1TransactionUnavailable(l1_hash)),
					// Only a node that answers without the transaction is fatal
					Err(e) => {
						tracing::warn!(
							error = %e,
							"Failed to fetch L1 transaction, will keep trying"
						);
						ResolverState::Polling { attempts: 0 }
					},
				},
				ResolverState::Polling { attempts } => {
					let slept = tokio::select! {
						biased;
						_ = cancel.cancelled() => false,
						_ = self.timer.sleep(self.poll_interval) => true,
					};
					if !slept {
						ResolverState::Aborted
					} else {
						let attempts = attempts + 1;
						match self.l1.get_transaction(&l1_hash).await {
							Ok(Some(l1_tx)) => self.poll_once(&l1_tx, attempts).await?,
							Ok(None) => {
								tracing::info!(
									attempts,
									"L1 transaction not returned, will keep trying"
								);
								ResolverState::Polling { attempts }
							},
							Err(e) => {
								tracing::info!(
									attempts,
									error = %e,
									"L1 transaction lookup failed, will keep trying"
								);
								ResolverState::Polling { attempts }
							},
						}
					}
				},
				ResolverState::Resolved {
					transaction,
					attempts,
				} => {
					tracing::info!(
						l2_tx_hash = %transaction.hash,
						attempts,
						"Resolved L2 transaction"
					);
					let resolution = Resolution {
						l2_transaction: transaction,
						attempts,
					};
					self.resolved
						.lock()
						.await
						.insert(l1_hash, resolution.clone());
					return Ok(resolution);
				},
				ResolverState::Aborted => {
					tracing::warn!("Stopped waiting for the L2 transaction");
					return Err(ResolutionError::Cancelled);
				},
			};
		}
	}

	/// One L2 lookup; returns the next state.
	async fn poll_once(
		&self,
		l1_tx: &ChainTransaction,
		attempts: u32,
	) -> Result<ResolverState, ResolutionError> {
		match self.priority_ops.l2_transaction_from_priority_op(l1_tx).await {
			Ok(Some(transaction)) => Ok(ResolverState::Resolved {
				transaction,
				attempts,
			}),
			Ok(None) => {
				tracing::info!(attempts, "L2 transaction not indexed yet");
				Ok(ResolverState::Polling { attempts })
			},
			Err(PriorityOpError::Transient(message)) => {
				tracing::info!(
					attempts,
					error = %message,
					"Could not retrieve the L2 transaction yet, will keep trying"
				);
				Ok(ResolverState::Polling { attempts })
			},
			Err(PriorityOpError::Permanent(message)) => {
				tracing::error!(attempts, error = %message, "L2 transaction will never resolve");
				Err(ResolutionError::Permanent(message))
			},
		}
	}
}
