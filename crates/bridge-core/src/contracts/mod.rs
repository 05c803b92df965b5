//! Typed bindings for the contracts the bridge flow calls.
//!
//! Each binding produces a [`bridge_types::Transaction`] for the delivery
//! service to sign and submit (or to run through `eth_call`) and decodes the
//! raw return data of view calls.

pub mod bridgehub;
pub mod erc20;
pub mod zkcro;

use alloy_sol_types::SolCall;
use thiserror::Error;

/// Errors raised while decoding contract return data.
#[derive(Debug, Error)]
pub enum ContractError {
	#[error("Failed to decode {function} result: {message}")]
	Decode {
		function: &'static str,
		message: String,
	},
}

/// Decodes the return data of a call, naming the function on failure.
pub(crate) fn decode_returns<C: SolCall>(data: &[u8]) -> Result<C::Return, ContractError> {
	C::abi_decode_returns(data, true).map_err(|e| ContractError::Decode {
		function: C::SIGNATURE,
		message: e.to_string(),
	})
}
