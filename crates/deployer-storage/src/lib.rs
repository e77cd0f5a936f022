//! Persistence of deployment results.
//!
//! The deployed application id is written as its bare decimal string so
//! other tooling can read it without parsing.

use deployer_types::DeployError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::info;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// The file exists but does not hold a decimal id.
	#[error("Invalid contents in {path}: {contents:?}")]
	InvalidContents { path: String, contents: String },
	/// Error that occurs in the filesystem.
	#[error("Backend error: {0}")]
	Backend(String),
}

impl From<StorageError> for DeployError {
	fn from(err: StorageError) -> Self {
		DeployError::Storage(err.to_string())
	}
}

/// File holding the id of the most recently deployed application.
pub struct AppIdStore {
	path: PathBuf,
}

impl AppIdStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Overwrites the file with `app_id`.
	///
	/// Writes to a sibling temp file first, then renames it into place.
	pub async fn save(&self, app_id: u64) -> Result<(), StorageError> {
		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent)
					.await
					.map_err(|e| StorageError::Backend(e.to_string()))?;
			}
		}

		let temp_path = self.path.with_extension("tmp");
		fs::write(&temp_path, app_id.to_string())
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		fs::rename(&temp_path, &self.path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		info!("Application id saved to {}", self.path.display());
		Ok(())
	}

	/// Reads the stored id, if the file exists.
	pub async fn load(&self) -> Result<Option<u64>, StorageError> {
		let contents = match fs::read_to_string(&self.path).await {
			Ok(contents) => contents,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		contents
			.trim()
			.parse()
			.map(Some)
			.map_err(|_| StorageError::InvalidContents {
				path: self.path.display().to_string(),
				contents,
			})
	}
}
