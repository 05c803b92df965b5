//! Account management for the zkCRO bridge.
//!
//! The bridge signs every transaction on both layers with the same key. This
//! crate turns the configured private key into a signer and exposes the
//! account address used as origin, stake receiver and L2 recipient.

use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use thiserror::Error;

pub mod implementations {
	pub mod local;
}

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// Error that occurs when a cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
}

/// Interface for accounts able to sign bridge transactions.
pub trait AccountInterface: Send + Sync {
	/// Returns the account's address.
	fn address(&self) -> Address;

	/// Returns a signer for use by a provider wallet.
	fn signer(&self) -> PrivateKeySigner;
}

/// Service that wraps the configured account implementation.
pub struct AccountService {
	implementation: Box<dyn AccountInterface>,
}

impl AccountService {
	pub fn new(implementation: Box<dyn AccountInterface>) -> Self {
		Self { implementation }
	}

	pub fn address(&self) -> Address {
		self.implementation.address()
	}

	pub fn signer(&self) -> PrivateKeySigner {
		self.implementation.signer()
	}
}
