//! Formatting and amount conversion helpers.

pub mod formatting;

pub use formatting::{format_token_amount, parse_token_amount, truncate_id, AmountError};
