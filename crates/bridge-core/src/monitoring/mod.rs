//! Cross-layer monitoring.
//!
//! Once an L1 deposit is mined, the rollup executes the resulting priority
//! operation asynchronously. The resolver in this module polls the L2 node at
//! a fixed cadence until it reports the L2 transaction.

pub mod priority_op;

pub use priority_op::{
	CrossLayerResolver, Resolution, ResolutionError, ResolverState, Timer, TokioTimer,
};
