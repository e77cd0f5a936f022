// deployer-config/src/lib.rs

use deployer_types::{DeployError, DeployerConfig};
use regex::Regex;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

impl From<ConfigError> for DeployError {
	fn from(err: ConfigError) -> Self {
		DeployError::Config(err.to_string())
	}
}

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "DEPLOYER_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	/// Loads, overrides and validates the configuration.
	///
	/// Relative program paths are resolved against the directory holding the
	/// configuration file. The output file stays relative to the working
	/// directory.
	pub async fn load(&self) -> Result<DeployerConfig, ConfigError> {
		let file_path = self.file_path.as_ref().ok_or_else(|| {
			ConfigError::FileNotFound("No configuration file specified".to_string())
		})?;

		if !file_path.exists() {
			return Err(ConfigError::FileNotFound(file_path.display().to_string()));
		}

		let mut config = self.load_from_file(file_path).await?;

		self.apply_env_overrides(&mut config)?;
		self.validate_config(&config)?;

		if let Some(base) = file_path.parent() {
			resolve_program_paths(&mut config, base);
		}

		Ok(config)
	}

	async fn load_from_file(&self, file_path: &Path) -> Result<DeployerConfig, ConfigError> {
		let content = tokio::fs::read_to_string(file_path).await?;
		self.parse(&content)
	}

	/// Parses configuration text after placeholder substitution.
	pub fn parse(&self, content: &str) -> Result<DeployerConfig, ConfigError> {
		let substituted_content = self.substitute_env_vars(content)?;

		toml::from_str(&substituted_content).map_err(|e| ConfigError::ParseError(e.to_string()))
	}

	fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
		let mut result = content.to_string();

		// Find and replace ${VAR_NAME} patterns
		let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))?;

		for cap in re.captures_iter(content) {
			let full_match = &cap[0];
			let var_name = &cap[1];

			let env_value = env::var(var_name)
				.map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

			result = result.replace(full_match, &env_value);
		}

		Ok(result)
	}

	fn apply_env_overrides(&self, config: &mut DeployerConfig) -> Result<(), ConfigError> {
		if let Ok(url) = env::var(format!("{}NODE_URL", self.env_prefix)) {
			debug!("Overriding node URL from environment");
			config.node.url = url;
		}

		if let Ok(token) = env::var(format!("{}NODE_TOKEN", self.env_prefix)) {
			debug!("Overriding node token from environment");
			config.node.token = token;
		}

		if let Ok(mnemonic) = env::var(format!("{}MNEMONIC", self.env_prefix)) {
			debug!("Overriding account mnemonic from environment");
			config.account.mnemonic = mnemonic;
		}

		if let Ok(max_rounds) = env::var(format!("{}MAX_ROUNDS", self.env_prefix)) {
			config.confirmation.max_rounds = Some(max_rounds.parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid max rounds: {}", e))
			})?);
		}

		Ok(())
	}

	fn validate_config(&self, config: &DeployerConfig) -> Result<(), ConfigError> {
		let url = &config.node.url;
		if !url.starts_with("http://") && !url.starts_with("https://") {
			return Err(ConfigError::ValidationError(
				"Node URL must start with http:// or https://".to_string(),
			));
		}

		if config.account.mnemonic.trim().is_empty() {
			return Err(ConfigError::ValidationError(
				"Account mnemonic must not be empty".to_string(),
			));
		}

		if config.deployment.approval_program.as_os_str().is_empty()
			|| config.deployment.clear_program.as_os_str().is_empty()
		{
			return Err(ConfigError::ValidationError(
				"Both approval and clear program paths are required".to_string(),
			));
		}

		if config.confirmation.max_rounds == Some(0) {
			return Err(ConfigError::ValidationError(
				"confirmation.max_rounds must be greater than zero".to_string(),
			));
		}

		if config.confirmation.timeout_secs == Some(0) {
			return Err(ConfigError::ValidationError(
				"confirmation.timeout_secs must be greater than zero".to_string(),
			));
		}

		Ok(())
	}
}

fn resolve_program_paths(config: &mut DeployerConfig, base: &Path) {
	for path in [
		&mut config.deployment.approval_program,
		&mut config.deployment.clear_program,
	] {
		if path.is_relative() {
			*path = base.join(&*path);
		}
	}

	if let Some(ca) = config.node.ca_certificate.as_mut() {
		if ca.is_relative() {
			*ca = base.join(&*ca);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serial_test::serial;
	use std::io::Write;

	const MINIMAL: &str = r#"
[node]
url = "https://testnet-api.algonode.cloud"

[account]
mnemonic = "${DEPLOYER_TEST_MNEMONIC}"

[deployment]
approval_program = "../consent_approval.teal"
clear_program = "/abs/consent_clear.teal"
"#;

	fn write_config(dir: &Path, content: &str) -> PathBuf {
		let path = dir.join("deploy.toml");
		let mut file = std::fs::File::create(&path).unwrap();
		file.write_all(content.as_bytes()).unwrap();
		path
	}

	#[tokio::test]
	#[serial]
	async fn test_load_substitutes_and_resolves_paths() {
		env::set_var("DEPLOYER_TEST_MNEMONIC", "word list");
		let dir = tempfile::tempdir().unwrap();
		let path = write_config(dir.path(), MINIMAL);

		let config = ConfigLoader::new()
			.with_env_prefix("DEPLOYER_TEST_")
			.with_file(&path)
			.load()
			.await
			.unwrap();

		assert_eq!(config.account.mnemonic, "word list");
		assert_eq!(
			config.deployment.approval_program,
			dir.path().join("../consent_approval.teal")
		);
		assert_eq!(
			config.deployment.clear_program,
			PathBuf::from("/abs/consent_clear.teal")
		);
		assert_eq!(
			config.deployment.output_file,
			PathBuf::from("deployed_app_id.txt")
		);

		env::remove_var("DEPLOYER_TEST_MNEMONIC");
	}

	#[test]
	#[serial]
	fn test_missing_placeholder_variable() {
		env::remove_var("DEPLOYER_TEST_MNEMONIC");
		let err = ConfigLoader::new().parse(MINIMAL).unwrap_err();
		assert!(matches!(err, ConfigError::EnvVarNotFound(name) if name == "DEPLOYER_TEST_MNEMONIC"));
	}

	#[tokio::test]
	#[serial]
	async fn test_env_overrides() {
		env::set_var("DEPLOYER_TEST_MNEMONIC", "word list");
		env::set_var("OVR_NODE_URL", "http://localhost:4001");
		env::set_var("OVR_MAX_ROUNDS", "7");
		let dir = tempfile::tempdir().unwrap();
		let path = write_config(dir.path(), MINIMAL);

		let config = ConfigLoader::new()
			.with_env_prefix("OVR_")
			.with_file(&path)
			.load()
			.await
			.unwrap();

		assert_eq!(config.node.url, "http://localhost:4001");
		assert_eq!(config.confirmation.max_rounds, Some(7));

		env::remove_var("OVR_NODE_URL");
		env::remove_var("OVR_MAX_ROUNDS");
		env::remove_var("DEPLOYER_TEST_MNEMONIC");
	}

	#[tokio::test]
	#[serial]
	async fn test_rejects_zero_max_rounds() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_config(
			dir.path(),
			r#"
[node]
url = "https://node.example"

[account]
mnemonic = "words"

[deployment]
approval_program = "a.teal"
clear_program = "c.teal"

[confirmation]
max_rounds = 0
"#,
		);

		let err = ConfigLoader::new().with_file(&path).load().await.unwrap_err();
		assert!(matches!(err, ConfigError::ValidationError(_)));
	}

	#[tokio::test]
	#[serial]
	async fn test_rejects_non_http_url() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_config(
			dir.path(),
			r#"
[node]
url = "ftp://node.example"

[account]
mnemonic = "words"

[deployment]
approval_program = "a.teal"
clear_program = "c.teal"
"#,
		);

		let err = ConfigLoader::new().with_file(&path).load().await.unwrap_err();
		assert!(matches!(err, ConfigError::ValidationError(_)));
	}

	#[tokio::test]
	#[serial]
	async fn test_deadline_without_round_limit() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_config(
			dir.path(),
			r#"
[node]
url = "https://node.example"

[account]
mnemonic = "words"

[deployment]
approval_program = "a.teal"
clear_program = "c.teal"

[confirmation]
timeout_secs = 120
"#,
		);

		let config = ConfigLoader::new()
			.with_env_prefix("DEADLINE_ONLY_")
			.with_file(&path)
			.load()
			.await
			.unwrap();

		assert_eq!(config.confirmation.max_rounds, None);
		assert_eq!(config.confirmation.timeout_secs, Some(120));
		assert_eq!(config.confirmation.round_limit(), None);
	}

	#[test]
	#[serial]
	fn test_bundled_testnet_config_parses() {
		env::set_var("DEPLOYER_MNEMONIC", "word list");
		let config = ConfigLoader::new()
			.parse(include_str!("../../../config/testnet.toml"))
			.unwrap();
		env::remove_var("DEPLOYER_MNEMONIC");

		assert_eq!(config.account.mnemonic, "word list");
		assert_eq!(config.deployment.global_schema.num_uints, 8);
		assert_eq!(config.confirmation.max_rounds, Some(1000));
		assert_eq!(config.confirmation.timeout_secs, None);
	}

	#[tokio::test]
	async fn test_missing_file() {
		let err = ConfigLoader::new()
			.with_file("/definitely/not/here.toml")
			.load()
			.await
			.unwrap_err();
		assert!(matches!(err, ConfigError::FileNotFound(_)));
	}
}
