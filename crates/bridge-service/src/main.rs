//! Main entry point for the zkCRO bridge.
//!
//! This binary runs the bridge flow once: approve CRO for the zkCRO
//! contract, stake it, deposit the resulting zkCRO from Ethereum to Cronos
//! zkEVM and follow the deposit until its L2 transaction is found. Ctrl-C
//! aborts any pause or wait; the exit code tells which phase failed.

use bridge_account::implementations::local::create_account;
use bridge_config::Config;
use bridge_core::{BridgeBuilder, BridgeEngine, BridgeFactories, BridgeReport};
use bridge_delivery::implementations::evm::alloy::create_chain;
use bridge_delivery::implementations::zksync::create_priority_ops;
use bridge_types::{format_fee, format_token_amount};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

/// Exit code for configuration and startup failures.
const EXIT_STARTUP: u8 = 2;
/// Exit code when the run is interrupted.
const EXIT_CANCELLED: u8 = 130;

/// Command-line arguments for the bridge.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml", env = "BRIDGE_CONFIG")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the bridge.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads and validates configuration
/// 4. Builds the bridge engine
/// 5. Runs the flow until done, failed or interrupted
#[tokio::main]
async fn main() -> ExitCode {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	// Create env filter with default from args
	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started bridge");
	let code = run(args).await;
	tracing::info!(exit_code = code, "Stopped bridge");
	ExitCode::from(code)
}

async fn run(args: Args) -> u8 {
	let config = match Config::from_file(&args.config).await {
		Ok(config) => config,
		Err(e) => {
			tracing::error!(
				path = %args.config.display(),
				error = %e,
				"Failed to load configuration"
			);
			return EXIT_STARTUP;
		},
	};
	tracing::info!(path = %args.config.display(), "Loaded configuration");

	let engine = match build_engine(config).await {
		Ok(engine) => engine,
		Err(e) => {
			tracing::error!(error = %e, "Failed to build bridge engine");
			return EXIT_STARTUP;
		},
	};

	let cancel = CancellationToken::new();
	let shutdown = cancel.clone();
	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_err() {
			return;
		}
		tracing::warn!("Received Ctrl-C, aborting (press again to exit immediately)");
		shutdown.cancel();

		if tokio::signal::ctrl_c().await.is_ok() {
			tracing::warn!("Received second Ctrl-C, exiting");
			std::process::exit(i32::from(EXIT_CANCELLED));
		}
	});

	match engine.run(&cancel).await {
		Ok(report) => {
			log_report(&report, engine.plan().wrapped_token_decimals);
			0
		},
		Err(e) => {
			tracing::error!(error = %e, "Bridge flow failed");
			e.exit_code()
		},
	}
}

/// Builds the bridge engine with the local account, alloy chain clients and
/// the zkSync priority-operation lookup.
async fn build_engine(config: Config) -> Result<BridgeEngine, bridge_core::BuilderError> {
	BridgeBuilder::new(config)
		.build(BridgeFactories {
			account: create_account,
			chain: create_chain,
			priority_ops: create_priority_ops,
		})
		.await
}

fn log_report(report: &BridgeReport, wrapped_token_decimals: u8) {
	if let Some(receipt) = &report.approval {
		tracing::info!(tx_hash = %receipt.hash, block_number = receipt.block_number, "Approved");
	}
	if let Some(receipt) = &report.stake {
		tracing::info!(tx_hash = %receipt.hash, block_number = receipt.block_number, "Staked");
	}
	if let Some(deposit) = &report.deposit {
		tracing::info!(
			amount = %format_token_amount(&deposit.amount.to_string(), wrapped_token_decimals),
			l1_tx_hash = %deposit.l1_receipt.hash,
			l1_fee_eth = %format_fee(deposit.l1_fee),
			l2_tx_hash = %deposit.resolution.l2_transaction.hash,
			l2_fee = %format_fee(deposit.l2_fee),
			attempts = deposit.resolution.attempts,
			"Deposited"
		);
	}
	tracing::info!("Done");
}
