//! Configuration module for the txflow system.
//!
//! This module provides structures and utilities for managing pipeline
//! configuration. It supports loading configuration from TOML files and
//! validates the values before they reach the pipelines.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files:
//! - Use `include = ["file1.toml", "file2.toml"]` to include other config files
//! - Each top-level section must be unique across all files (no duplicates allowed)

mod loader;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Connection to the execution provider.
	pub provider: ProviderConfig,
	/// Pipeline behaviour: gas ceiling and receipt polling.
	#[serde(default)]
	pub pipeline: PipelineConfig,
}

/// Configuration for the JSON-RPC execution provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
	/// HTTP endpoint of the node.
	pub rpc_url: String,
}

/// Configuration shared by the call, send and create pipelines.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PipelineConfig {
	/// Upper bound passed to gas estimation when a transaction has no gas set.
	pub max_gas: Option<u64>,
	/// Receipt polling policy.
	#[serde(default)]
	pub receipt: ReceiptConfig,
}

/// Receipt polling configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReceiptConfig {
	/// Delay before the second receipt lookup, in milliseconds.
	#[serde(default = "default_initial_interval_ms")]
	pub initial_interval_ms: u64,
	/// Upper bound for the delay between lookups, in milliseconds.
	#[serde(default = "default_max_interval_ms")]
	pub max_interval_ms: u64,
	/// Growth factor applied to the delay after each lookup.
	#[serde(default = "default_multiplier")]
	pub multiplier: f64,
	/// Maximum time to wait for a receipt, in seconds. 0 waits forever.
	#[serde(default = "default_timeout_seconds")]
	pub timeout_seconds: u64,
}

fn default_initial_interval_ms() -> u64 {
	250
}

fn default_max_interval_ms() -> u64 {
	7_000
}

fn default_multiplier() -> f64 {
	1.5
}

/// Returns the default receipt timeout in seconds (1 hour).
fn default_timeout_seconds() -> u64 {
	3600
}

impl Default for ReceiptConfig {
	fn default() -> Self {
		Self {
			initial_interval_ms: default_initial_interval_ms(),
			max_interval_ms: default_max_interval_ms(),
			multiplier: default_multiplier(),
			timeout_seconds: default_timeout_seconds(),
		}
	}
}

impl ReceiptConfig {
	pub fn initial_interval(&self) -> Duration {
		Duration::from_millis(self.initial_interval_ms)
	}

	pub fn max_interval(&self) -> Duration {
		Duration::from_millis(self.max_interval_ms)
	}

	/// Returns the receipt deadline, or `None` for an unbounded wait.
	pub fn timeout(&self) -> Option<Duration> {
		match self.timeout_seconds {
			0 => None,
			seconds => Some(Duration::from_secs(seconds)),
		}
	}
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)));
				}
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, resolving includes and environment
	/// variables.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Validates the configuration.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.provider.rpc_url.trim().is_empty() {
			return Err(ConfigError::Validation(
				"Provider rpc_url cannot be empty".into(),
			));
		}

		if self.pipeline.max_gas == Some(0) {
			return Err(ConfigError::Validation(
				"Pipeline max_gas must be greater than 0".into(),
			));
		}

		let receipt = &self.pipeline.receipt;
		if receipt.initial_interval_ms == 0 {
			return Err(ConfigError::Validation(
				"Receipt initial_interval_ms must be greater than 0".into(),
			));
		}
		if receipt.max_interval_ms < receipt.initial_interval_ms {
			return Err(ConfigError::Validation(format!(
				"Receipt max_interval_ms ({}) cannot be lower than initial_interval_ms ({})",
				receipt.max_interval_ms, receipt.initial_interval_ms
			)));
		}
		if !receipt.multiplier.is_finite() || receipt.multiplier < 1.0 {
			return Err(ConfigError::Validation(format!(
				"Receipt multiplier must be at least 1.0, got {}",
				receipt.multiplier
			)));
		}

		Ok(())
	}
}

/// Parses a configuration from TOML, resolving environment variables and
/// validating the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_bundled_config_parses() {
		let config: Config = include_str!("../../../config/txflow.toml").parse().unwrap();

		assert_eq!(config.pipeline.max_gas, Some(8_000_000));
		assert_eq!(config.pipeline.receipt, ReceiptConfig::default());
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("TXFLOW_TEST_HOST", "localhost");
		std::env::set_var("TXFLOW_TEST_PORT", "8545");

		let input = "rpc_url = \"http://${TXFLOW_TEST_HOST}:${TXFLOW_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "rpc_url = \"http://localhost:8545\"");

		std::env::remove_var("TXFLOW_TEST_HOST");
		std::env::remove_var("TXFLOW_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${TXFLOW_MISSING_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${TXFLOW_MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("TXFLOW_MISSING_VAR"));
	}

	#[test]
	fn test_minimal_config_uses_defaults() {
		let config: Config = r#"
[provider]
rpc_url = "${TXFLOW_UNSET_RPC_URL:-http://127.0.0.1:8545}"
"#
		.parse()
		.unwrap();

		assert_eq!(config.provider.rpc_url, "http://127.0.0.1:8545");
		assert_eq!(config.pipeline.max_gas, None);
		assert_eq!(
			config.pipeline.receipt.initial_interval(),
			Duration::from_millis(250)
		);
		assert_eq!(config.pipeline.receipt.max_interval(), Duration::from_secs(7));
		assert_eq!(
			config.pipeline.receipt.timeout(),
			Some(Duration::from_secs(3600))
		);
	}

	#[test]
	fn test_zero_timeout_waits_forever() {
		let config: Config = r#"
[provider]
rpc_url = "http://127.0.0.1:8545"

[pipeline]
max_gas = 8000000

[pipeline.receipt]
timeout_seconds = 0
"#
		.parse()
		.unwrap();

		assert_eq!(config.pipeline.max_gas, Some(8_000_000));
		assert_eq!(config.pipeline.receipt.timeout(), None);
	}

	#[test]
	fn test_validation_errors() {
		let cases = [
			("[provider]\nrpc_url = \"\"", "rpc_url"),
			(
				"[provider]\nrpc_url = \"http://x\"\n[pipeline]\nmax_gas = 0",
				"max_gas",
			),
			(
				"[provider]\nrpc_url = \"http://x\"\n[pipeline.receipt]\ninitial_interval_ms = 0",
				"initial_interval_ms",
			),
			(
				"[provider]\nrpc_url = \"http://x\"\n[pipeline.receipt]\ninitial_interval_ms = 500\nmax_interval_ms = 100",
				"max_interval_ms",
			),
			(
				"[provider]\nrpc_url = \"http://x\"\n[pipeline.receipt]\nmultiplier = 0.5",
				"multiplier",
			),
		];

		for (input, field) in cases {
			let error = input.parse::<Config>().unwrap_err();
			assert!(
				matches!(error, ConfigError::Validation(ref message) if message.contains(field)),
				"expected validation error for {}, got {}",
				field,
				error
			);
		}
	}

	#[test]
	fn test_missing_provider_section() {
		let result = "[pipeline]\nmax_gas = 1".parse::<Config>();
		assert!(matches!(result, Err(ConfigError::Parse(_))));
	}
}
