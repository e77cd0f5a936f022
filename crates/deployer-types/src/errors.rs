//! Error types for the deployer.

use crate::common::MicroAlgos;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeployError>;

#[derive(Error, Debug)]
pub enum DeployError {
	#[error("Insufficient balance: need {needed}, have {available}")]
	InsufficientBalance {
		needed: MicroAlgos,
		available: MicroAlgos,
	},

	#[error("Network error: {0}")]
	Network(String),

	#[error("Timeout: {0}")]
	Timeout(String),

	#[error("Operation cancelled")]
	Cancelled,

	#[error("Configuration error: {0}")]
	Config(String),

	#[error("Account error: {0}")]
	Account(String),

	#[error("Encoding error: {0}")]
	Encoding(String),

	#[error("Storage error: {0}")]
	Storage(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}
