//! Configuration module for the zkCRO bridge.
//!
//! This module provides the structures and loading logic for the bridge
//! configuration. Configuration is read once from a TOML file, `${VAR}`
//! references are resolved from the environment, and the result is validated
//! before any component connects to a node or submits a transaction.

use alloy_primitives::{address, Address};
use bridge_types::{parse_token_amount, SecretString};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// CRO token on Ethereum mainnet.
pub const ETHEREUM_CRO_ADDRESS: Address = address!("a0b73e1ff0b80914ab6fe0444e65848c4c34450b");
/// zkCRO token on Ethereum mainnet, also the spender approved for CRO.
pub const ETHEREUM_ZKCRO_ADDRESS: Address = address!("28Ff2E4dD1B58efEB0fC138602A28D5aE81e44e2");
/// Public Cronos zkEVM mainnet endpoint.
pub const CRONOS_ZKEVM_MAINNET_URL: &str = "https://mainnet.zkevm.cronos.org";

/// Main configuration structure for the bridge.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Base chain endpoint.
	pub l1: NetworkConfig,
	/// Rollup endpoint.
	#[serde(default = "default_l2_network")]
	pub l2: NetworkConfig,
	/// Signing account shared by both layers.
	pub account: AccountConfig,
	/// Token, amount and bridge contract settings.
	#[serde(default)]
	pub bridge: BridgeConfig,
	/// Which phases of the flow to run.
	#[serde(default)]
	pub flow: FlowConfig,
	/// Cross-layer resolution settings.
	#[serde(default)]
	pub resolver: ResolverConfig,
}

/// Connection and confirmation settings for one layer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
	/// HTTP(S) JSON-RPC endpoint.
	pub rpc_url: String,
	/// Blocks on top of the inclusion block required before a receipt is returned.
	#[serde(default = "default_confirmations")]
	pub confirmations: u64,
	/// Time allowed for a submitted transaction to be mined.
	#[serde(default = "default_confirmation_timeout_seconds")]
	pub confirmation_timeout_seconds: u64,
	/// Interval between receipt lookups while waiting for confirmation.
	#[serde(default = "default_receipt_poll_interval_seconds")]
	pub receipt_poll_interval_seconds: u64,
}

fn default_l2_network() -> NetworkConfig {
	NetworkConfig {
		rpc_url: CRONOS_ZKEVM_MAINNET_URL.to_string(),
		confirmations: default_confirmations(),
		confirmation_timeout_seconds: default_confirmation_timeout_seconds(),
		receipt_poll_interval_seconds: default_receipt_poll_interval_seconds(),
	}
}

fn default_confirmations() -> u64 {
	1
}

fn default_confirmation_timeout_seconds() -> u64 {
	900 // 15 minutes
}

fn default_receipt_poll_interval_seconds() -> u64 {
	7
}

/// Configuration for the signing account.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
	/// Hex-encoded secp256k1 private key, usually `${MY_PRIVATE_KEY}`.
	pub private_key: SecretString,
}

/// Token and bridge settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeConfig {
	/// ERC-20 converted into the wrapped asset (CRO).
	#[serde(default = "default_token_address")]
	pub token_address: Address,
	#[serde(default = "default_token_decimals")]
	pub token_decimals: u8,
	/// Wrapped asset deposited to L2 (zkCRO); spender of `token_address`.
	#[serde(default = "default_wrapped_token_address")]
	pub wrapped_token_address: Address,
	#[serde(default = "default_wrapped_token_decimals")]
	pub wrapped_token_decimals: u8,
	/// Amount of `token_address` to approve and stake, in whole-token units.
	#[serde(default = "default_amount")]
	pub amount: String,
	/// Wrapped balance kept back to pay L2 fees, in whole-token units.
	#[serde(default = "default_fee_reserve")]
	pub fee_reserve: String,
	/// L2 recipient. Defaults to the signer's address.
	pub recipient: Option<Address>,
	/// Bridgehub on L1. Discovered through `zks_getBridgehubContract` when unset.
	pub bridgehub_address: Option<Address>,
	/// Diamond proxy emitting `NewPriorityRequest`. Discovered through `zks_getMainContract` when unset.
	pub main_contract_address: Option<Address>,
	/// L2 gas limit requested for the deposit transaction.
	#[serde(default = "default_l2_gas_limit")]
	pub l2_gas_limit: u64,
	/// Gas per pubdata byte limit for the deposit transaction.
	#[serde(default = "default_gas_per_pubdata_limit")]
	pub gas_per_pubdata_limit: u64,
}

impl Default for BridgeConfig {
	fn default() -> Self {
		Self {
			token_address: default_token_address(),
			token_decimals: default_token_decimals(),
			wrapped_token_address: default_wrapped_token_address(),
			wrapped_token_decimals: default_wrapped_token_decimals(),
			amount: default_amount(),
			fee_reserve: default_fee_reserve(),
			recipient: None,
			bridgehub_address: None,
			main_contract_address: None,
			l2_gas_limit: default_l2_gas_limit(),
			gas_per_pubdata_limit: default_gas_per_pubdata_limit(),
		}
	}
}

fn default_token_address() -> Address {
	ETHEREUM_CRO_ADDRESS
}

fn default_token_decimals() -> u8 {
	8 // CRO has 8 decimals on Ethereum
}

fn default_wrapped_token_address() -> Address {
	ETHEREUM_ZKCRO_ADDRESS
}

fn default_wrapped_token_decimals() -> u8 {
	18
}

fn default_amount() -> String {
	"5".to_string()
}

fn default_fee_reserve() -> String {
	"2".to_string()
}

fn default_l2_gas_limit() -> u64 {
	300_000
}

fn default_gas_per_pubdata_limit() -> u64 {
	800
}

/// Phases of the bridge flow.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlowConfig {
	/// Approve the wrapped token contract as spender of the token.
	#[serde(default = "default_true")]
	pub approve: bool,
	/// Stake the token into the wrapped token.
	#[serde(default = "default_true")]
	pub stake: bool,
	/// Deposit the wrapped token to L2 and resolve the L2 transaction.
	#[serde(default = "default_true")]
	pub deposit: bool,
	/// Pause between phases, giving the operator a window to abort.
	#[serde(default = "default_step_delay_seconds")]
	pub step_delay_seconds: u64,
}

impl Default for FlowConfig {
	fn default() -> Self {
		Self {
			approve: true,
			stake: true,
			deposit: true,
			step_delay_seconds: default_step_delay_seconds(),
		}
	}
}

fn default_true() -> bool {
	true
}

fn default_step_delay_seconds() -> u64 {
	10
}

/// Cross-layer resolution settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
	/// Fixed interval between L2 resolution attempts.
	#[serde(default = "default_poll_interval_seconds")]
	pub poll_interval_seconds: u64,
}

impl Default for ResolverConfig {
	fn default() -> Self {
		Self {
			poll_interval_seconds: default_poll_interval_seconds(),
		}
	}
}

fn default_poll_interval_seconds() -> u64 {
	15
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads and validates configuration from a file.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.display(), e),
			))
		})?;
		content.parse()
	}

	/// Validates the configuration so that bad input fails before anything is submitted.
	fn validate(&self) -> Result<(), ConfigError> {
		validate_network("l1", &self.l1)?;
		validate_network("l2", &self.l2)?;

		if self.account.private_key.is_empty() {
			return Err(ConfigError::Validation(
				"account.private_key cannot be empty".into(),
			));
		}

		let bridge = &self.bridge;
		if bridge.token_address.is_zero() || bridge.wrapped_token_address.is_zero() {
			return Err(ConfigError::Validation(
				"bridge token addresses cannot be the zero address".into(),
			));
		}
		if bridge.token_address == bridge.wrapped_token_address {
			return Err(ConfigError::Validation(
				"bridge.token_address and bridge.wrapped_token_address must differ".into(),
			));
		}
		for (field, decimals) in [
			("token_decimals", bridge.token_decimals),
			("wrapped_token_decimals", bridge.wrapped_token_decimals),
		] {
			if decimals > 77 {
				return Err(ConfigError::Validation(format!(
					"bridge.{} cannot exceed 77",
					field
				)));
			}
		}

		let amount = parse_token_amount(&bridge.amount, bridge.token_decimals)
			.map_err(|e| ConfigError::Validation(format!("bridge.amount: {}", e)))?;
		if amount.is_zero() {
			return Err(ConfigError::Validation(
				"bridge.amount must be greater than 0".into(),
			));
		}
		parse_token_amount(&bridge.fee_reserve, bridge.wrapped_token_decimals)
			.map_err(|e| ConfigError::Validation(format!("bridge.fee_reserve: {}", e)))?;

		if bridge.l2_gas_limit == 0 {
			return Err(ConfigError::Validation(
				"bridge.l2_gas_limit must be greater than 0".into(),
			));
		}
		if bridge.gas_per_pubdata_limit == 0 {
			return Err(ConfigError::Validation(
				"bridge.gas_per_pubdata_limit must be greater than 0".into(),
			));
		}

		if !(self.flow.approve || self.flow.stake || self.flow.deposit) {
			return Err(ConfigError::Validation(
				"At least one of flow.approve, flow.stake or flow.deposit must be enabled".into(),
			));
		}
		if self.flow.step_delay_seconds > 3600 {
			return Err(ConfigError::Validation(
				"flow.step_delay_seconds cannot exceed 3600".into(),
			));
		}

		if self.resolver.poll_interval_seconds == 0 {
			return Err(ConfigError::Validation(
				"resolver.poll_interval_seconds must be greater than 0".into(),
			));
		}

		Ok(())
	}
}

fn validate_network(section: &str, network: &NetworkConfig) -> Result<(), ConfigError> {
	if network.rpc_url.trim().is_empty() {
		return Err(ConfigError::Validation(format!(
			"{}.rpc_url cannot be empty",
			section
		)));
	}
	if !(network.rpc_url.starts_with("http://") || network.rpc_url.starts_with("https://")) {
		return Err(ConfigError::Validation(format!(
			"{}.rpc_url must be an http(s) URL",
			section
		)));
	}
	if network.confirmations == 0 {
		return Err(ConfigError::Validation(format!(
			"{}.confirmations must be at least 1",
			section
		)));
	}
	if network.confirmations > 100 {
		return Err(ConfigError::Validation(format!(
			"{}.confirmations cannot exceed 100",
			section
		)));
	}
	if network.confirmation_timeout_seconds == 0 {
		return Err(ConfigError::Validation(format!(
			"{}.confirmation_timeout_seconds must be greater than 0",
			section
		)));
	}
	if network.receipt_poll_interval_seconds == 0
		|| network.receipt_poll_interval_seconds >= network.confirmation_timeout_seconds
	{
		return Err(ConfigError::Validation(format!(
			"{}.receipt_poll_interval_seconds must be between 1 and confirmation_timeout_seconds",
			section
		)));
	}
	Ok(())
}

/// Parses a TOML string, resolving environment variables and validating the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	fn minimal_config() -> String {
		format!(
			r#"
[l1]
rpc_url = "http://localhost:8545"

[account]
private_key = "{}"
"#,
			TEST_KEY
		)
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("BRIDGE_TEST_HOST", "localhost");
		std::env::set_var("BRIDGE_TEST_PORT", "8545");

		let input = "url = \"http://${BRIDGE_TEST_HOST}:${BRIDGE_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "url = \"http://localhost:8545\"");

		std::env::remove_var("BRIDGE_TEST_HOST");
		std::env::remove_var("BRIDGE_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${BRIDGE_MISSING_VAR:-fallback}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"fallback\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${BRIDGE_MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.unwrap_err().to_string().contains("BRIDGE_MISSING_VAR"));
	}

	#[test]
	fn test_minimal_config_uses_mainnet_defaults() {
		let config: Config = minimal_config().parse().unwrap();

		assert_eq!(config.l2.rpc_url, CRONOS_ZKEVM_MAINNET_URL);
		assert_eq!(config.bridge.token_address, ETHEREUM_CRO_ADDRESS);
		assert_eq!(config.bridge.wrapped_token_address, ETHEREUM_ZKCRO_ADDRESS);
		assert_eq!(config.bridge.token_decimals, 8);
		assert_eq!(config.bridge.wrapped_token_decimals, 18);
		assert_eq!(config.bridge.amount, "5");
		assert_eq!(config.bridge.fee_reserve, "2");
		assert_eq!(config.resolver.poll_interval_seconds, 15);
		assert_eq!(config.flow.step_delay_seconds, 10);
		assert!(config.flow.approve && config.flow.stake && config.flow.deposit);
	}

	#[test]
	fn test_config_with_env_vars() {
		std::env::set_var("BRIDGE_TEST_L1_URL", "https://eth.example.org");

		let config_str = format!(
			r#"
[l1]
rpc_url = "${{BRIDGE_TEST_L1_URL}}"
confirmation_timeout_seconds = 60

[account]
private_key = "${{BRIDGE_TEST_PRIVATE_KEY:-{}}}"

[bridge]
amount = "12.5"
"#,
			TEST_KEY
		);

		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.l1.rpc_url, "https://eth.example.org");
		assert_eq!(config.l1.confirmation_timeout_seconds, 60);
		assert!(config.account.private_key.with_exposed(|k| k == TEST_KEY));

		std::env::remove_var("BRIDGE_TEST_L1_URL");
	}

	#[test]
	fn test_invalid_rpc_url_rejected() {
		let config_str = minimal_config().replace("http://localhost:8545", "ws://localhost:8545");
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("l1.rpc_url must be an http(s) URL"));
	}

	#[test]
	fn test_zero_amount_rejected() {
		let config_str = format!("{}\n[bridge]\namount = \"0\"\n", minimal_config());
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("bridge.amount must be greater than 0"));
	}

	#[test]
	fn test_unparseable_fee_reserve_rejected() {
		let config_str = format!("{}\n[bridge]\nfee_reserve = \"two\"\n", minimal_config());
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("bridge.fee_reserve"));
	}

	#[test]
	fn test_all_phases_disabled_rejected() {
		let config_str = format!(
			"{}\n[flow]\napprove = false\nstake = false\ndeposit = false\n",
			minimal_config()
		);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("At least one of flow.approve"));
	}

	#[test]
	fn test_zero_poll_interval_rejected() {
		let config_str = format!(
			"{}\n[resolver]\npoll_interval_seconds = 0\n",
			minimal_config()
		);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("resolver.poll_interval_seconds"));
	}

	#[test]
	fn test_receipt_poll_interval_must_fit_timeout() {
		let config_str = minimal_config().replace(
			"rpc_url = \"http://localhost:8545\"",
			"rpc_url = \"http://localhost:8545\"\nconfirmation_timeout_seconds = 5\nreceipt_poll_interval_seconds = 5",
		);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("l1.receipt_poll_interval_seconds"));
	}

	#[test]
	fn test_empty_private_key_rejected() {
		let config_str = minimal_config().replace(TEST_KEY, "");
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("account.private_key cannot be empty"));
	}

	#[tokio::test]
	async fn test_from_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("bridge.toml");
		std::fs::write(&path, minimal_config()).unwrap();

		let config = Config::from_file(&path).await.unwrap();
		assert_eq!(config.l1.rpc_url, "http://localhost:8545");
	}

	#[test]
	fn test_shipped_config_parses() {
		std::env::set_var("ETHEREUM_MAINNET_URL", "https://eth.example.org");
		std::env::set_var("MY_PRIVATE_KEY", TEST_KEY);

		let config: Config = include_str!("../../../config/bridge.toml").parse().unwrap();
		assert_eq!(config.l1.rpc_url, "https://eth.example.org");
		assert_eq!(config.bridge.wrapped_token_address, ETHEREUM_ZKCRO_ADDRESS);
		assert_eq!(config.bridge.recipient, None);

		std::env::remove_var("ETHEREUM_MAINNET_URL");
		std::env::remove_var("MY_PRIVATE_KEY");
	}

	#[tokio::test]
	async fn test_from_missing_file() {
		let err = Config::from_file("/nonexistent/bridge.toml").await.unwrap_err();
		assert!(matches!(err, ConfigError::Io(_)));
	}
}
