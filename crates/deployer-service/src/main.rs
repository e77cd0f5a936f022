use anyhow::{Context, Result};
use clap::Parser;
use deployer_account::{AccountInterface, LocalAccount};
use deployer_config::ConfigLoader;
use deployer_core::Deployer;
use deployer_storage::AppIdStore;
use deployer_types::DeployerConfig;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_tracing(&cli.log_level)?;

	match cli.command {
		Some(Commands::Deploy) | None => deploy(&cli).await,
		Some(Commands::Validate) => validate_config(&cli).await,
	}
}

async fn load_config(cli: &Cli) -> Result<DeployerConfig> {
	info!("Loading configuration from: {:?}", cli.config);

	ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("Failed to load configuration")
}

async fn deploy(cli: &Cli) -> Result<()> {
	let config = load_config(cli).await?;
	info!("Node: {}", config.node.url);

	let deployer = Deployer::from_config(&config)
		.await
		.context("Failed to initialise deployer")?;

	let cancel = CancellationToken::new();
	let watcher = tokio::spawn(cancel_on_shutdown(cancel.clone()));

	let result = deployer.deploy(&cancel).await;
	watcher.abort();

	let receipt = result.context("Deployment failed")?;

	println!("Application deployed");
	println!("  app id:          {}", receipt.app_id);
	println!("  transaction:     {}", receipt.tx_id);
	println!("  confirmed round: {}", receipt.confirmed_round);
	println!("  creator:         {}", receipt.creator);
	println!("  saved to:        {}", deployer.store().path().display());
	if let Some(explorer) = &config.deployment.explorer_url {
		println!(
			"  explorer:        {}/application/{}",
			explorer.trim_end_matches('/'),
			receipt.app_id
		);
	}

	Ok(())
}

async fn validate_config(cli: &Cli) -> Result<()> {
	let config = load_config(cli).await?;
	let account =
		LocalAccount::from_mnemonic(&config.account.mnemonic).context("Invalid mnemonic")?;
	let deployment = &config.deployment;

	println!("Configuration is valid");
	println!("  node:            {}", config.node.url);
	println!("  creator:         {}", account.address());
	println!("  approval:        {}", deployment.approval_program.display());
	println!("  clear:           {}", deployment.clear_program.display());
	println!(
		"  global schema:   {} uints, {} byte slices",
		deployment.global_schema.num_uints, deployment.global_schema.num_byte_slices
	);
	println!(
		"  local schema:    {} uints, {} byte slices",
		deployment.local_schema.num_uints, deployment.local_schema.num_byte_slices
	);
	println!("  minimum balance: {}", deployment.min_balance);
	match config.confirmation.round_limit() {
		Some(rounds) => println!("  max rounds:      {}", rounds),
		None => println!("  max rounds:      unbounded"),
	}
	if let Some(secs) = config.confirmation.timeout_secs {
		println!("  timeout:         {}s", secs);
	}

	let store = AppIdStore::new(deployment.output_file.clone());
	match store.load().await {
		Ok(Some(app_id)) => println!("  last deployed:   {}", app_id),
		Ok(None) => {}
		Err(e) => warn!("Could not read {}: {}", store.path().display(), e),
	}

	Ok(())
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
		.context("Invalid log level")?;

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();

	Ok(())
}

/// Cancels `token` on Ctrl-C or SIGTERM.
async fn cancel_on_shutdown(token: CancellationToken) {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			warn!("Failed to listen for Ctrl+C: {}", e);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			}
			Err(e) => {
				warn!("Failed to install SIGTERM handler: {}", e);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	info!("Shutdown signal received, cancelling");
	token.cancel();
}
