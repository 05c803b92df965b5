//! Core orchestration for the zkCRO bridge.
//!
//! This crate drives the single-shot bridge flow: approve the token for the
//! wrapped-token contract, stake it, deposit the wrapped token from L1 to L2
//! through the Bridgehub, then follow the deposit across layers until the L2
//! node reports the transaction created by the priority operation.

pub mod builder;
pub mod contracts;
pub mod engine;
pub mod monitoring;

pub use builder::{BridgeBuilder, BridgeFactories, BuilderError};
pub use engine::{BridgeEngine, BridgeReport, DepositReport, EngineError};
pub use monitoring::{
	CrossLayerResolver, Resolution, ResolutionError, ResolverState, Timer, TokioTimer,
};
