//! Ledger node clients.
//!
//! Every component that talks to the network does so through the
//! [`LedgerClient`](deployer_types::LedgerClient) trait; this crate provides
//! the implementations.

pub mod implementations;

pub use implementations::algod::{AlgodClient, AlgodClientBuilder};

use deployer_types::{NodeConfig, Result};
use std::time::Duration;

/// Creates an algod client from node configuration.
pub async fn create_client(config: &NodeConfig) -> Result<AlgodClient> {
	AlgodClient::builder(&config.url)
		.token(config.token.clone())
		.request_timeout(Duration::from_secs(config.request_timeout_secs))
		.ca_certificate(config.ca_certificate.clone())
		.build()
		.await
}
