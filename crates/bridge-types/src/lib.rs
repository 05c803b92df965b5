//! Common types for the zkCRO bridge workspace.
//!
//! This crate defines the data types shared by every bridge component:
//! transaction hashes, pending transactions, receipts, the L1/L2 transaction
//! views used during cross-layer resolution, fee computation and amount
//! formatting helpers.

/// Transaction and receipt types for both layers.
pub mod delivery;
/// Gas fee computation from receipts.
pub mod fee;
/// Redacted string type for private keys.
pub mod secret_string;
/// Formatting and amount conversion helpers.
pub mod utils;

pub use delivery::*;
pub use fee::{compute_fee, format_fee, NATIVE_DECIMALS};
pub use secret_string::SecretString;
pub use utils::{format_token_amount, parse_token_amount, truncate_id, AmountError};
