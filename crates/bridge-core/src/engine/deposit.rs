//! L1 → L2 deposits through the Bridgehub.
//!
//! Only the rollup's base token can be deposited. The Bridgehub is asked for
//! the L2 execution cost at the current L1 gas price; that cost plus the
//! deposited amount is the `mintValue` the shared bridge pulls from the
//! account, so the shared bridge is approved for it first when needed.

use crate::contracts::{bridgehub, ContractError};
use crate::engine::token_manager::{TokenError, TokenManager};
use alloy_primitives::{Address, U256};
use bridge_delivery::{DeliveryError, DeliveryService};
use bridge_types::PendingTransaction;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while preparing or submitting a deposit.
#[derive(Debug, Error)]
pub enum DepositError {
	/// The balance does not cover what the deposit needs.
	#[error("Insufficient balance: have {balance}, need {required}")]
	InsufficientBalance { balance: U256, required: U256 },

	/// The token is not the base token of the target chain.
	#[error("Token {token} is not the base token of chain {chain_id} ({base_token})")]
	UnsupportedToken {
		token: Address,
		base_token: Address,
		chain_id: u64,
	},

	#[error("Token error: {0}")]
	Token(#[from] TokenError),

	#[error("Delivery error: {0}")]
	Delivery(#[from] DeliveryError),

	#[error("Contract error: {0}")]
	Contract(#[from] ContractError),
}

/// Returns the amount to deposit from `balance`, keeping `reserve` back.
///
/// Fails when the balance does not exceed the reserve.
pub fn deposit_amount(balance: U256, reserve: U256) -> Result<U256, DepositError> {
	if balance <= reserve {
		return Err(DepositError::InsufficientBalance {
			balance,
			required: reserve,
		});
	}
	Ok(balance - reserve)
}

/// L2 execution limits requested for the deposit.
#[derive(Debug, Clone, Copy)]
pub struct DepositSettings {
	pub l2_gas_limit: u64,
	pub gas_per_pubdata_limit: u64,
}

/// Builds and submits base-token deposits.
pub struct DepositManager {
	l1: Arc<DeliveryService>,
	tokens: Arc<TokenManager>,
	bridgehub: Address,
	l2_chain_id: u64,
	settings: DepositSettings,
}

impl DepositManager {
	pub fn new(
		l1: Arc<DeliveryService>,
		tokens: Arc<TokenManager>,
		bridgehub: Address,
		l2_chain_id: u64,
		settings: DepositSettings,
	) -> Self {
		Self {
			l1,
			tokens,
			bridgehub,
			l2_chain_id,
			settings,
		}
	}

	/// L2 execution cost of a deposit at the current L1 gas price, in base-token units.
	pub async fn base_cost(&self) -> Result<U256, DepositError> {
		let gas_price = self.l1.get_gas_price().await?;
		// Quote at 1.5x the current price
		let gas_price = gas_price.saturating_mul(U256::from(3)) / U256::from(2);

		let data = self
			.l1
			.call(&bridgehub::l2_transaction_base_cost(
				self.bridgehub,
				self.l2_chain_id,
				gas_price,
				self.settings.l2_gas_limit,
				self.settings.gas_per_pubdata_limit,
			))
			.await?;
		Ok(bridgehub::decode_base_cost(&data)?)
	}

	/// Submits a deposit of `amount` of `token` to `recipient` on L2.
	///
	/// Returns once the L1 node accepts the Bridgehub call; any approval the
	/// shared bridge needs is confirmed before that.
	pub async fn deposit(
		&self,
		token: Address,
		amount: U256,
		recipient: Address,
	) -> Result<PendingTransaction, DepositError> {
		let data = self
			.l1
			.call(&bridgehub::base_token(self.bridgehub, self.l2_chain_id))
			.await?;
		let base_token = bridgehub::decode_base_token(&data)?;
		if base_token != token {
			return Err(DepositError::UnsupportedToken {
				token,
				base_token,
				chain_id: self.l2_chain_id,
			});
		}

		let mint_value = self.base_cost().await?.saturating_add(amount);
		let balance = self.tokens.balance_of(token).await?;
		if balance < mint_value {
			return Err(DepositError::InsufficientBalance {
				balance,
				required: mint_value,
			});
		}

		let data = self.l1.call(&bridgehub::shared_bridge(self.bridgehub)).await?;
		let shared_bridge = bridgehub::decode_shared_bridge(&data)?;
		self.tokens
			.ensure_allowance(token, shared_bridge, mint_value)
			.await?;

		tracing::info!(
			%recipient,
			%amount,
			%mint_value,
			chain_id = self.l2_chain_id,
			"Submitting deposit"
		);
		let request = bridgehub::DirectDeposit {
			chain_id: self.l2_chain_id,
			mint_value,
			amount,
			recipient,
			l2_gas_limit: self.settings.l2_gas_limit,
			gas_per_pubdata_limit: self.settings.gas_per_pubdata_limit,
		};
		let pending = self
			.l1
			.submit(bridgehub::request_l2_transaction_direct(
				self.bridgehub,
				&request,
			))
			.await?;
		Ok(pending)
	}
}
