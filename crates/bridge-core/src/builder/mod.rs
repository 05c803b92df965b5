//! Builder for constructing bridge engines.
//!
//! Composes a [`BridgeEngine`] from a validated [`Config`] and factory
//! functions for the account, the per-layer chain clients and the L2
//! priority-operation lookup. Contract addresses missing from the
//! configuration are discovered from the L2 node here, before any
//! transaction is submitted.

use crate::engine::{BridgeEngine, DepositManager, DepositSettings, FlowPlan, TokenManager};
use crate::monitoring::{CrossLayerResolver, TokioTimer};
use alloy_signer_local::PrivateKeySigner;
use bridge_account::{AccountError, AccountInterface, AccountService};
use bridge_config::{AccountConfig, Config, NetworkConfig};
use bridge_delivery::{
	ChainInterface, DeliveryError, DeliveryService, DeliverySettings, PriorityOpInterface,
};
use bridge_types::{parse_token_amount, Layer};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during bridge engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Account error: {0}")]
	Account(#[from] AccountError),
	#[error("Delivery error: {0}")]
	Delivery(#[from] DeliveryError),
	#[error("Discovery error: {0}")]
	Discovery(String),
}

/// Factory functions for the pluggable components of the engine.
pub struct BridgeFactories<AF, CF, PF> {
	pub account: AF,
	pub chain: CF,
	pub priority_ops: PF,
}

/// Builder for constructing a [`BridgeEngine`] from configuration.
pub struct BridgeBuilder {
	config: Config,
}

fn delivery_settings(network: &NetworkConfig) -> DeliverySettings {
	DeliverySettings {
		confirmations: network.confirmations,
		confirmation_timeout: Duration::from_secs(network.confirmation_timeout_seconds),
	}
}

impl BridgeBuilder {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the engine using the given factories.
	pub async fn build<AF, CF, PF>(
		self,
		factories: BridgeFactories<AF, CF, PF>,
	) -> Result<BridgeEngine, BuilderError>
	where
		AF: Fn(&AccountConfig) -> Result<Box<dyn AccountInterface>, AccountError>,
		CF: Fn(
			Layer,
			&NetworkConfig,
			PrivateKeySigner,
		) -> Result<Box<dyn ChainInterface>, DeliveryError>,
		PF: Fn(&Config) -> Result<Arc<dyn PriorityOpInterface>, DeliveryError>,
	{
		let config = &self.config;

		let account = AccountService::new((factories.account)(&config.account)?);
		let address = account.address();
		tracing::info!(component = "account", %address, "Loaded");

		let l1 = Arc::new(DeliveryService::new(
			Layer::L1,
			(factories.chain)(Layer::L1, &config.l1, account.signer())?,
			delivery_settings(&config.l1),
		));
		let l2 = Arc::new(DeliveryService::new(
			Layer::L2,
			(factories.chain)(Layer::L2, &config.l2, account.signer())?,
			delivery_settings(&config.l2),
		));
		tracing::info!(
			component = "delivery",
			l1 = %config.l1.rpc_url,
			l2 = %config.l2.rpc_url,
			"Loaded"
		);

		let priority_ops = (factories.priority_ops)(config)?;

		let bridge = &config.bridge;
		let amount = parse_token_amount(&bridge.amount, bridge.token_decimals)
			.map_err(|e| BuilderError::Config(format!("bridge.amount: {}", e)))?;
		let fee_reserve = parse_token_amount(&bridge.fee_reserve, bridge.wrapped_token_decimals)
			.map_err(|e| BuilderError::Config(format!("bridge.fee_reserve: {}", e)))?;

		let tokens = Arc::new(TokenManager::new(l1.clone(), address));

		let deposits = if config.flow.deposit {
			let l2_chain_id = l2.get_chain_id().await?;
			let bridgehub = match bridge.bridgehub_address {
				Some(bridgehub) => bridgehub,
				None => priority_ops
					.bridgehub_address()
					.await
					.map_err(|e| BuilderError::Discovery(e.to_string()))?
					.ok_or_else(|| {
						BuilderError::Discovery(
							"L2 node reports no Bridgehub; set bridge.bridgehub_address".into(),
						)
					})?,
			};
			tracing::info!(component = "deposit", %bridgehub, l2_chain_id, "Loaded");

			Some(DepositManager::new(
				l1.clone(),
				tokens.clone(),
				bridgehub,
				l2_chain_id,
				DepositSettings {
					l2_gas_limit: bridge.l2_gas_limit,
					gas_per_pubdata_limit: bridge.gas_per_pubdata_limit,
				},
			))
		} else {
			None
		};

		let resolver = CrossLayerResolver::new(
			l1.clone(),
			priority_ops,
			Arc::new(TokioTimer),
			Duration::from_secs(config.resolver.poll_interval_seconds),
		);

		let plan = FlowPlan {
			approve: config.flow.approve,
			stake: config.flow.stake,
			step_delay: Duration::from_secs(config.flow.step_delay_seconds),
			token: bridge.token_address,
			token_decimals: bridge.token_decimals,
			wrapped_token: bridge.wrapped_token_address,
			wrapped_token_decimals: bridge.wrapped_token_decimals,
			amount,
			fee_reserve,
			recipient: bridge.recipient.unwrap_or(address),
		};

		Ok(BridgeEngine::new(plan, l1, l2, tokens, deposits, resolver))
	}
}
