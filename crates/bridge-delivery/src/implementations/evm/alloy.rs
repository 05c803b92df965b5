//! Alloy-based EVM chain client.
//!
//! This module provides the `ChainInterface` implementation used for both the
//! L1 and the L2 endpoint. Transactions are signed by the provider's wallet
//! filler; receipts and transactions are read through raw JSON-RPC so that
//! rollup-specific transaction types decode on either layer.

use super::rpc::{RpcReceipt, RpcTransaction};
use crate::{ChainInterface, DeliveryError};
use alloy_network::EthereumWallet;
use alloy_primitives::{Bytes, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport_http::Http;
use async_trait::async_trait;
use bridge_config::NetworkConfig;
use bridge_types::{ChainTransaction, Layer, Transaction, TransactionHash, TransactionReceipt};
use std::sync::Arc;
use std::time::Duration;

/// Shared HTTP provider handle.
pub type HttpProvider = Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>;

/// Alloy-based EVM chain client for one layer.
pub struct AlloyChain {
	layer: Layer,
	provider: HttpProvider,
	/// Interval between receipt lookups while waiting for confirmations.
	poll_interval: Duration,
}

impl AlloyChain {
	/// Creates a client for `rpc_url` that signs with `signer`.
	pub fn new(
		layer: Layer,
		rpc_url: &str,
		signer: PrivateKeySigner,
		poll_interval: Duration,
	) -> Result<Self, DeliveryError> {
		let url = rpc_url.parse().map_err(|e| {
			DeliveryError::Network(format!("Invalid RPC URL for {}: {}", layer, e))
		})?;

		let wallet = EthereumWallet::from(signer);
		let provider = ProviderBuilder::new()
			.with_recommended_fillers()
			.wallet(wallet)
			.on_http(url);

		provider.client().set_poll_interval(poll_interval);

		Ok(Self {
			layer,
			provider: Arc::new(provider),
			poll_interval,
		})
	}

	/// Returns the underlying provider, e.g. for rollup-specific lookups.
	pub fn provider(&self) -> HttpProvider {
		self.provider.clone()
	}

	async fn fetch_receipt(&self, hash: &TransactionHash) -> Result<Option<RpcReceipt>, DeliveryError> {
		self.provider
			.client()
			.request("eth_getTransactionReceipt", (hash.0,))
			.await
			.map_err(|e| {
				DeliveryError::Network(format!("Failed to get receipt on {}: {}", self.layer, e))
			})
	}
}

#[async_trait]
impl ChainInterface for AlloyChain {
	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, DeliveryError> {
		let request = TransactionRequest::default()
			.to(tx.to)
			.input(tx.data.into())
			.value(tx.value);

		// The provider's wallet handles nonce, gas and signing
		let pending_tx = self
			.provider
			.send_transaction(request)
			.await
			.map_err(|e| DeliveryError::Submission(e.to_string()))?;

		Ok(TransactionHash(*pending_tx.tx_hash()))
	}

	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
		confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError> {
		tracing::debug!(layer = %self.layer, tx_hash = %hash, confirmations, "Waiting for confirmations");

		loop {
			let receipt = match self.fetch_receipt(hash).await {
				Ok(Some(receipt)) => receipt,
				Ok(None) => {
					tokio::time::sleep(self.poll_interval).await;
					continue;
				},
				Err(e) => {
					// The caller's timeout bounds the wait
					tracing::warn!(layer = %self.layer, error = %e, "Receipt lookup failed");
					tokio::time::sleep(self.poll_interval).await;
					continue;
				},
			};

			let Some(receipt) = receipt.into_receipt() else {
				tokio::time::sleep(self.poll_interval).await;
				continue;
			};

			let current_block = self.provider.get_block_number().await.map_err(|e| {
				DeliveryError::Network(format!("Failed to get block number: {}", e))
			})?;
			let current_confirmations = current_block.saturating_sub(receipt.block_number) + 1;

			if current_confirmations >= confirmations {
				return Ok(receipt);
			}

			tracing::debug!(
				"Waiting for {} more confirmations...",
				confirmations.saturating_sub(current_confirmations)
			);
			tokio::time::sleep(self.poll_interval).await;
		}
	}

	async fn get_transaction(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<ChainTransaction>, DeliveryError> {
		let tx: Option<RpcTransaction> = self
			.provider
			.client()
			.request("eth_getTransactionByHash", (hash.0,))
			.await
			.map_err(|e| {
				DeliveryError::Network(format!(
					"Failed to get transaction on {}: {}",
					self.layer, e
				))
			})?;

		Ok(tx.map(ChainTransaction::from))
	}

	async fn call(&self, tx: &Transaction) -> Result<Bytes, DeliveryError> {
		let request = TransactionRequest::default()
			.to(tx.to)
			.input(tx.data.clone().into());

		self.provider
			.call(&request)
			.await
			.map_err(|e| DeliveryError::Network(format!("Call to {} failed: {}", tx.to, e)))
	}

	async fn get_gas_price(&self) -> Result<U256, DeliveryError> {
		let gas_price = self
			.provider
			.get_gas_price()
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get gas price: {}", e)))?;

		Ok(U256::from(gas_price))
	}

	async fn get_chain_id(&self) -> Result<u64, DeliveryError> {
		self.provider
			.get_chain_id()
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get chain id: {}", e)))
	}
}

/// Creates the chain client for one layer from its network configuration.
pub fn create_chain(
	layer: Layer,
	network: &NetworkConfig,
	signer: PrivateKeySigner,
) -> Result<Box<dyn ChainInterface>, DeliveryError> {
	let chain = AlloyChain::new(
		layer,
		&network.rpc_url,
		signer,
		Duration::from_secs(network.receipt_poll_interval_seconds),
	)?;
	Ok(Box::new(chain))
}
