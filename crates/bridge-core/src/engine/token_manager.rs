//! Token management for the bridge flow.
//!
//! This module covers the ERC-20 side of the flow on L1:
//! - Approving the wrapped-token contract (zkCRO) as spender of the token (CRO)
//! - Staking the token into the wrapped token
//! - Balance and allowance lookups used before the deposit
//!
//! Every write is submitted through the L1 delivery service and confirmed
//! before the call returns, so later phases observe its effects.

use crate::contracts::{erc20, zkcro, ContractError};
use alloy_primitives::{Address, U256};
use bridge_delivery::{DeliveryError, DeliveryService};
use bridge_types::{Transaction, TransactionReceipt};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during token operations.
#[derive(Debug, Error)]
pub enum TokenError {
	/// Error occurred during transaction delivery.
	#[error("Delivery error: {0}")]
	Delivery(#[from] DeliveryError),

	/// A view call returned data that does not match the ABI.
	#[error("Contract error: {0}")]
	Contract(#[from] ContractError),
}

/// Manages approvals, staking and balance lookups for the bridge account.
pub struct TokenManager {
	/// L1 delivery service.
	delivery: Arc<DeliveryService>,
	/// Address of the bridge account.
	owner: Address,
}

impl TokenManager {
	pub fn new(delivery: Arc<DeliveryService>, owner: Address) -> Self {
		Self { delivery, owner }
	}

	/// Address of the account whose tokens are managed.
	pub fn owner(&self) -> Address {
		self.owner
	}

	/// Approves `spender` to transfer `amount` of `token` and waits for inclusion.
	pub async fn approve_spender(
		&self,
		token: Address,
		spender: Address,
		amount: U256,
	) -> Result<TransactionReceipt, TokenError> {
		tracing::info!(%token, %spender, %amount, "Approving spender");
		self.execute(erc20::approve(token, spender, amount)).await
	}

	/// Stakes `amount` of the approved token, minting the wrapped token to the owner.
	pub async fn stake(
		&self,
		wrapped_token: Address,
		amount: U256,
	) -> Result<TransactionReceipt, TokenError> {
		tracing::info!(%wrapped_token, %amount, "Staking token");
		self.execute(zkcro::stake(wrapped_token, self.owner, amount))
			.await
	}

	/// Returns the owner's balance of `token`, in the token's smallest unit.
	pub async fn balance_of(&self, token: Address) -> Result<U256, TokenError> {
		let data = self
			.delivery
			.call(&erc20::balance_of(token, self.owner))
			.await?;
		Ok(erc20::decode_balance(&data)?)
	}

	/// Returns how much of `token` `spender` may still transfer from the owner.
	pub async fn allowance(&self, token: Address, spender: Address) -> Result<U256, TokenError> {
		let data = self
			.delivery
			.call(&erc20::allowance(token, self.owner, spender))
			.await?;
		Ok(erc20::decode_allowance(&data)?)
	}

	/// Approves `spender` for at least `amount`, skipping the transaction when
	/// the current allowance already covers it.
	pub async fn ensure_allowance(
		&self,
		token: Address,
		spender: Address,
		amount: U256,
	) -> Result<Option<TransactionReceipt>, TokenError> {
		let current = self.allowance(token, spender).await?;
		if current >= amount {
			tracing::debug!(%token, %spender, %current, "Allowance already sufficient");
			return Ok(None);
		}
		self.approve_spender(token, spender, amount).await.map(Some)
	}

	async fn execute(&self, tx: Transaction) -> Result<TransactionReceipt, TokenError> {
		let pending = self.delivery.submit(tx).await?;
		let receipt = self.delivery.confirm(&pending).await?;
		tracing::info!(
			block_number = receipt.block_number,
			"Transaction included on L1"
		);
		Ok(receipt)
	}
}
