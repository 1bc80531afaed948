//! Reply generation for the PizzaBahn assistant.
//!
//! The engine decides what happens in a conversation; a reply backend only
//! phrases the answer. Backends receive the system instruction, a context
//! block describing the order so far and the step the session is on, and
//! return the text shown to the customer.

use async_trait::async_trait;
use pizza_types::{ConfigSchema, ImplementationRegistry, Step};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod gemini;
	pub mod scripted;
}

/// Errors that can occur while generating a reply.
#[derive(Debug, Error)]
pub enum ReplyError {
	/// Transport failure talking to the remote model.
	#[error("HTTP error: {0}")]
	Http(String),
	/// The remote model answered with an error or without content.
	#[error("Response error: {0}")]
	Response(String),
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs when configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Everything a backend needs to phrase one reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyRequest {
	/// Persona, menu and conversation rules.
	pub system: String,
	/// Current step, order status and the customer's message.
	pub context: String,
	/// Step the session is on after this turn's rules ran.
	pub step: Step,
}

/// Interface every reply backend implements.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReplyInterface: Send + Sync {
	/// Returns the configuration schema for this backend.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Produces the customer-facing reply text.
	async fn generate(&self, request: &ReplyRequest) -> Result<String, ReplyError>;
}

/// Type alias for reply factory functions.
pub type ReplyFactory = fn(&toml::Value) -> Result<Box<dyn ReplyInterface>, ReplyError>;

/// Registry trait for reply implementations.
pub trait ReplyRegistry: ImplementationRegistry<Factory = ReplyFactory> {}

/// Get all registered reply implementations as (name, factory) pairs.
pub fn get_all_implementations() -> Vec<(&'static str, ReplyFactory)> {
	use implementations::{gemini, scripted};

	vec![
		(gemini::Registry::NAME, gemini::Registry::factory()),
		(scripted::Registry::NAME, scripted::Registry::factory()),
	]
}

/// Routes reply requests to the configured primary backend.
pub struct ReplyService {
	implementations: HashMap<String, Arc<dyn ReplyInterface>>,
	primary: String,
}

impl ReplyService {
	/// Creates a service; the primary backend must be among the given ones.
	pub fn new(
		implementations: HashMap<String, Arc<dyn ReplyInterface>>,
		primary: String,
	) -> Result<Self, ReplyError> {
		if !implementations.contains_key(&primary) {
			return Err(ReplyError::Configuration(format!(
				"Primary implementation '{}' not found in available implementations",
				primary
			)));
		}
		Ok(Self {
			implementations,
			primary,
		})
	}

	/// Wraps a single backend, mostly for tests and embedding.
	pub fn single(name: impl Into<String>, implementation: Arc<dyn ReplyInterface>) -> Self {
		let name = name.into();
		Self {
			implementations: HashMap::from([(name.clone(), implementation)]),
			primary: name,
		}
	}

	pub fn primary(&self) -> &str {
		&self.primary
	}

	/// Generates a reply with the primary backend.
	pub async fn generate(&self, request: &ReplyRequest) -> Result<String, ReplyError> {
		let implementation = self.implementations.get(&self.primary).ok_or_else(|| {
			ReplyError::Configuration(format!(
				"Primary implementation '{}' not available",
				self.primary
			))
		})?;

		let started = Instant::now();
		match implementation.generate(request).await {
			Ok(text) => {
				tracing::debug!(
					backend = %self.primary,
					step = %request.step,
					elapsed_ms = started.elapsed().as_millis() as u64,
					chars = text.len(),
					"Generated reply"
				);
				Ok(text)
			},
			Err(e) => {
				tracing::warn!(backend = %self.primary, step = %request.step, error = %e, "Reply generation failed");
				Err(e)
			},
		}
	}
}
