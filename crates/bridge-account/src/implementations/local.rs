//! Local private-key account.

use crate::{AccountError, AccountInterface};
use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use bridge_config::AccountConfig;

/// Account backed by a private key held in process memory.
pub struct LocalAccount {
	signer: PrivateKeySigner,
}

impl LocalAccount {
	/// Parses the configured hex private key. The key may carry a `0x` prefix.
	pub fn new(config: &AccountConfig) -> Result<Self, AccountError> {
		let signer = config.private_key.with_exposed(|key| {
			key.trim()
				.parse::<PrivateKeySigner>()
				.map_err(|_| AccountError::InvalidKey("malformed private key".to_string()))
		})?;

		tracing::info!(address = %signer.address(), "Loaded local account");
		Ok(Self { signer })
	}
}

impl AccountInterface for LocalAccount {
	fn address(&self) -> Address {
		self.signer.address()
	}

	fn signer(&self) -> PrivateKeySigner {
		self.signer.clone()
	}
}

/// Creates the local account described by the configuration.
pub fn create_account(config: &AccountConfig) -> Result<Box<dyn AccountInterface>, AccountError> {
	Ok(Box::new(LocalAccount::new(config)?))
}
