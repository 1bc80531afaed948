//! Configuration module for the PizzaBahn assistant.
//!
//! Configuration is a single TOML file. String values may reference
//! environment variables as `${VAR}` or `${VAR:-default}`; they are resolved
//! before parsing so secrets such as the reply-service API key stay out of
//! the file. Backend-specific tables (`[storage.implementations.*]`,
//! `[reply.implementations.*]`) are kept as raw TOML and validated by the
//! backend that consumes them.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
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
		// Only the message, not the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity of the assistant.
	#[serde(default)]
	pub assistant: AssistantConfig,
	/// Session registry behaviour.
	#[serde(default)]
	pub session: SessionConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for the reply-generation service.
	pub reply: ReplyConfig,
	/// Optional menu override.
	#[serde(default)]
	pub menu: MenuConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Identity of the assistant as presented to customers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssistantConfig {
	/// Shop name used in prompts and canned replies.
	#[serde(default = "default_assistant_name")]
	pub name: String,
	/// City the shop delivers in, used in the system instruction.
	#[serde(default = "default_city")]
	pub city: String,
}

impl Default for AssistantConfig {
	fn default() -> Self {
		Self {
			name: default_assistant_name(),
			city: default_city(),
		}
	}
}

fn default_assistant_name() -> String {
	"PizzaBahn".to_string()
}

fn default_city() -> String {
	"Berlin, Germany".to_string()
}

/// Session registry behaviour.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
	/// Idle time after which a session is dropped. Sessions never expire
	/// when unset.
	pub ttl_seconds: Option<u64>,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
	/// Interval in seconds for cleaning up expired storage entries.
	#[serde(default = "default_cleanup_interval")]
	pub cleanup_interval_seconds: u64,
}

fn default_cleanup_interval() -> u64 {
	300
}

/// Configuration for the reply-generation service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReplyConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of reply implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Optional menu override.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MenuConfig {
	/// Path to a TOML menu file. The built-in menu is used when unset.
	pub path: Option<String>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Request timeout in seconds.
	#[serde(default = "default_api_timeout")]
	pub timeout_seconds: u64,
	/// Maximum request size in bytes.
	#[serde(default = "default_max_request_size")]
	pub max_request_size: usize,
	/// CORS configuration. Permissive when unset.
	pub cors: Option<CorsConfig>,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
	/// Allowed origins for CORS.
	pub allowed_origins: Vec<String>,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	5000
}

fn default_api_timeout() -> u64 {
	30
}

fn default_max_request_size() -> usize {
	64 * 1024
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of `VAR_NAME`, or with the text
/// after `:-` in `${VAR_NAME:-default}` when the variable is unset.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
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
		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				},
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
	/// Loads configuration from a file, resolving environment variables and
	/// validating the result.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.display(), e),
			))
		})?;
		let config: Config = content.parse()?;
		tracing::debug!(path = %path.display(), "Loaded configuration file");
		Ok(config)
	}

	/// Session TTL as a duration, `None` when sessions never expire.
	pub fn session_ttl(&self) -> Option<std::time::Duration> {
		self.session.ttl_seconds.map(std::time::Duration::from_secs)
	}

	/// Validates cross-section constraints that serde cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.assistant.name.trim().is_empty() {
			return Err(ConfigError::Validation(
				"Assistant name cannot be empty".into(),
			));
		}

		if self.session.ttl_seconds == Some(0) {
			return Err(ConfigError::Validation(
				"Session ttl_seconds must be greater than 0 (omit it to disable expiry)".into(),
			));
		}

		// Storage
		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}
		if self.storage.cleanup_interval_seconds == 0 {
			return Err(ConfigError::Validation(
				"Storage cleanup_interval_seconds must be greater than 0".into(),
			));
		}
		if self.storage.cleanup_interval_seconds > 86400 {
			return Err(ConfigError::Validation(
				"Storage cleanup_interval_seconds cannot exceed 86400 (24 hours)".into(),
			));
		}

		// Reply generation
		if self.reply.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one reply implementation must be configured".into(),
			));
		}
		if !self.reply.implementations.contains_key(&self.reply.primary) {
			return Err(ConfigError::Validation(format!(
				"Primary reply implementation '{}' not found in implementations",
				self.reply.primary
			)));
		}

		if let Some(path) = &self.menu.path {
			if path.trim().is_empty() {
				return Err(ConfigError::Validation("Menu path cannot be empty".into()));
			}
		}

		if let Some(api) = &self.api {
			if api.enabled && api.port == 0 {
				return Err(ConfigError::Validation(
					"API port must be greater than 0".into(),
				));
			}
			if api.timeout_seconds == 0 {
				return Err(ConfigError::Validation(
					"API timeout_seconds must be greater than 0".into(),
				));
			}
			if let Some(cors) = &api.cors {
				if cors.allowed_origins.iter().any(|o| o.trim().is_empty()) {
					return Err(ConfigError::Validation(
						"CORS allowed_origins cannot contain empty entries".into(),
					));
				}
			}
		}

		Ok(())
	}

	/// Minimal valid configuration: memory storage, scripted replies, API
	/// disabled.
	#[cfg(any(test, feature = "testing"))]
	pub fn for_testing() -> Self {
		let empty = || toml::Value::Table(toml::map::Map::new());
		Config {
			assistant: AssistantConfig::default(),
			session: SessionConfig::default(),
			storage: StorageConfig {
				primary: "memory".to_string(),
				implementations: HashMap::from([("memory".to_string(), empty())]),
				cleanup_interval_seconds: 60,
			},
			reply: ReplyConfig {
				primary: "scripted".to_string(),
				implementations: HashMap::from([("scripted".to_string(), empty())]),
			},
			menu: MenuConfig::default(),
			api: None,
		}
	}
}

/// Parses and validates a configuration string, resolving environment
/// variables first.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
