//! Bridge engine that runs the flow end to end.
//!
//! The phases run strictly in sequence: approve → stake → deposit, each
//! preceded by a cancellable pause. The deposit phase waits for the L1
//! receipt, reports the L1 fee, resolves the L2 transaction created by the
//! priority operation, waits for its L2 receipt and reports the L2 fee.

pub mod deposit;
#[cfg(test)]
pub(crate) mod testing;
pub mod token_manager;

pub use deposit::{deposit_amount, DepositError, DepositManager, DepositSettings};
pub use token_manager::{TokenError, TokenManager};

use crate::monitoring::{CrossLayerResolver, Resolution, ResolutionError};
use alloy_primitives::{Address, U256};
use bridge_delivery::{DeliveryError, DeliveryService};
use bridge_types::{
	compute_fee, format_fee, format_token_amount, Layer, PendingTransaction, TransactionReceipt,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors that can occur while running the bridge flow.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Token error: {0}")]
	Token(#[from] TokenError),
	#[error("Deposit error: {0}")]
	Deposit(#[from] DepositError),
	#[error("Delivery error: {0}")]
	Delivery(#[from] DeliveryError),
	#[error("Resolution error: {0}")]
	Resolution(#[from] ResolutionError),
	#[error("Cancelled")]
	Cancelled,
}

impl EngineError {
	/// Process exit code for this error.
	///
	/// 3 submission failure, 4 confirmation failure, 5 permanent resolution
	/// failure, 130 cancelled, 1 anything else. Configuration errors surface
	/// before the engine exists and are mapped by the binary.
	pub fn exit_code(&self) -> u8 {
		match self {
			EngineError::Delivery(e)
			| EngineError::Token(TokenError::Delivery(e))
			| EngineError::Deposit(DepositError::Delivery(e))
			| EngineError::Deposit(DepositError::Token(TokenError::Delivery(e))) => {
				delivery_exit_code(e)
			},
			EngineError::Resolution(ResolutionError::Cancelled) | EngineError::Cancelled => 130,
			EngineError::Resolution(_) => 5,
			_ => 1,
		}
	}
}

fn delivery_exit_code(error: &DeliveryError) -> u8 {
	match error {
		DeliveryError::Submission(_) => 3,
		DeliveryError::ConfirmationTimeout { .. } | DeliveryError::TransactionReverted { .. } => 4,
		_ => 1,
	}
}

/// Tokens, amounts and phases of one bridge run.
#[derive(Debug, Clone)]
pub struct FlowPlan {
	pub approve: bool,
	pub stake: bool,
	pub step_delay: Duration,
	pub token: Address,
	pub token_decimals: u8,
	pub wrapped_token: Address,
	pub wrapped_token_decimals: u8,
	/// Amount of `token` approved and staked, in its smallest unit.
	pub amount: U256,
	/// Wrapped balance kept back for L2 fees, in its smallest unit.
	pub fee_reserve: U256,
	pub recipient: Address,
}

/// Outcome of the deposit phase.
#[derive(Debug, Clone)]
pub struct DepositReport {
	pub amount: U256,
	pub l1_receipt: TransactionReceipt,
	/// L1 fee in wei.
	pub l1_fee: U256,
	pub resolution: Resolution,
	pub l2_receipt: TransactionReceipt,
	/// L2 fee in the rollup's base token, smallest unit.
	pub l2_fee: U256,
}

/// Outcome of a bridge run; phases that were not enabled are `None`.
#[derive(Debug, Clone, Default)]
pub struct BridgeReport {
	pub approval: Option<TransactionReceipt>,
	pub stake: Option<TransactionReceipt>,
	pub deposit: Option<DepositReport>,
}

/// Runs the bridge flow once.
pub struct BridgeEngine {
	plan: FlowPlan,
	l1: Arc<DeliveryService>,
	l2: Arc<DeliveryService>,
	tokens: Arc<TokenManager>,
	/// Present when the deposit phase is enabled.
	deposits: Option<DepositManager>,
	resolver: CrossLayerResolver,
}

impl BridgeEngine {
	pub fn new(
		plan: FlowPlan,
		l1: Arc<DeliveryService>,
		l2: Arc<DeliveryService>,
		tokens: Arc<TokenManager>,
		deposits: Option<DepositManager>,
		resolver: CrossLayerResolver,
	) -> Self {
		Self {
			plan,
			l1,
			l2,
			tokens,
			deposits,
			resolver,
		}
	}

	pub fn plan(&self) -> &FlowPlan {
		&self.plan
	}

	/// Runs the enabled phases in order until done, failed or cancelled.
	pub async fn run(&self, cancel: &CancellationToken) -> Result<BridgeReport, EngineError> {
		let plan = &self.plan;
		let mut report = BridgeReport::default();

		tracing::info!(
			address = %self.tokens.owner(),
			recipient = %plan.recipient,
			amount = %format_token_amount(&plan.amount.to_string(), plan.token_decimals),
			"Starting bridge flow"
		);
		if self.deposits.is_some() {
			tracing::warn!(
				"Almost the entire wrapped token balance of {} will be deposited to L2",
				self.tokens.owner()
			);
		}

		if plan.approve {
			self.pause(cancel).await?;
			tracing::info!("Approving wrapped token contract as spender");
			let receipt = until_cancelled(
				cancel,
				self.tokens.approve_spender(plan.token, plan.wrapped_token, plan.amount),
			)
			.await?;
			report.approval = Some(receipt);
		}

		if plan.stake {
			self.pause(cancel).await?;
			tracing::info!("Staking token into wrapped token");
			let receipt =
				until_cancelled(cancel, self.tokens.stake(plan.wrapped_token, plan.amount)).await?;
			report.stake = Some(receipt);
		}

		if let Some(deposits) = &self.deposits {
			self.pause(cancel).await?;
			report.deposit = Some(self.deposit(deposits, cancel).await?);
		}

		Ok(report)
	}

	async fn deposit(
		&self,
		deposits: &DepositManager,
		cancel: &CancellationToken,
	) -> Result<DepositReport, EngineError> {
		let plan = &self.plan;
		let decimals = plan.wrapped_token_decimals;

		let balance = until_cancelled(cancel, self.tokens.balance_of(plan.wrapped_token)).await?;
		let amount = deposit_amount(balance, plan.fee_reserve)?;
		tracing::info!(
			balance = %format_token_amount(&balance.to_string(), decimals),
			set_aside = %format_token_amount(&plan.fee_reserve.to_string(), decimals),
			deposit = %format_token_amount(&amount.to_string(), decimals),
			"Preparing deposit from L1 to L2"
		);

		let pending = until_cancelled(
			cancel,
			deposits.deposit(plan.wrapped_token, amount, plan.recipient),
		)
		.await?;
		let l1_receipt = until_cancelled(cancel, self.l1.confirm(&pending)).await?;
		let l1_fee = compute_fee(&l1_receipt);
		tracing::info!(
			block_number = l1_receipt.block_number,
			fee = %format_fee(l1_fee),
			"Deposit included on L1, fee in ETH"
		);

		let resolution = self.resolver.resolve(&l1_receipt, cancel).await?;

		let l2_pending = PendingTransaction::new(resolution.l2_transaction.hash, Layer::L2);
		let l2_receipt = until_cancelled(cancel, self.l2.confirm(&l2_pending)).await?;
		let l2_fee = compute_fee(&l2_receipt);
		tracing::info!(
			l2_tx_hash = %l2_receipt.hash,
			block_number = l2_receipt.block_number,
			fee = %format_fee(l2_fee),
			"Deposit included on L2, fee in base token"
		);

		Ok(DepositReport {
			amount,
			l1_receipt,
			l1_fee,
			resolution,
			l2_receipt,
			l2_fee,
		})
	}

	/// Waits the configured step delay, giving the operator a window to abort.
	async fn pause(&self, cancel: &CancellationToken) -> Result<(), EngineError> {
		let delay = self.plan.step_delay;
		if !delay.is_zero() {
			tracing::info!("Waiting {} seconds, press Ctrl-C to abort...", delay.as_secs());
		}
		tokio::select! {
			biased;
			_ = cancel.cancelled() => Err(EngineError::Cancelled),
			_ = tokio::time::sleep(delay) => Ok(()),
		}
	}
}

/// Runs `operation` unless `cancel` fires first.
///
/// A transaction already submitted when the token fires stays in the pool;
/// only the wait for it is abandoned.
async fn until_cancelled<T, E, F>(
	cancel: &CancellationToken,
	operation: F,
) -> Result<T, EngineError>
where
	F: Future<Output = Result<T, E>>,
	EngineError: From<E>,
{
	tokio::select! {
		biased;
		_ = cancel.cancelled() => Err(EngineError::Cancelled),
		result = operation => Ok(result?),
	}
}
