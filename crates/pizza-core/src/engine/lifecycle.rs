//! Lifecycle management for the assistant engine.
//!
//! Startup logging, the periodic maintenance task and shutdown.

use super::{AssistantEngine, EngineError};
use std::time::Duration;
use tokio::task::JoinHandle;

impl AssistantEngine {
	/// Performs any initialization required before serving.
	pub async fn initialize(&self) -> Result<(), EngineError> {
		let data = self.catalog.data();
		tracing::info!(
			assistant = %self.config.assistant.name,
			reply = self.reply.as_ref().map(|r| r.primary()).unwrap_or("none"),
			pizzas = data.pizzas.len(),
			extras = data.extras.len(),
			drinks = data.drinks.len(),
			toppings = self.catalog.toppings().len(),
			"Initializing assistant engine"
		);
		Ok(())
	}

	/// Spawns the task that drops expired storage entries and idle session
	/// locks every `storage.cleanup_interval_seconds`.
	pub fn spawn_maintenance(&self) -> JoinHandle<()> {
		let storage = self.storage.clone();
		let sessions = self.sessions.clone();
		let interval = Duration::from_secs(self.config.storage.cleanup_interval_seconds);

		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(interval);
			// The first tick completes immediately.
			ticker.tick().await;
			loop {
				ticker.tick().await;
				match storage.cleanup_expired().await {
					Ok(0) => {},
					Ok(removed) => tracing::info!(removed, "Cleaned up expired entries"),
					Err(e) => tracing::warn!(error = %e, "Storage cleanup failed"),
				}
				let pruned = sessions.prune_locks();
				if pruned > 0 {
					tracing::debug!(pruned, "Pruned idle session locks");
				}
			}
		})
	}

	/// Performs cleanup operations.
	pub async fn shutdown(&self) -> Result<(), EngineError> {
		tracing::info!("Shutting down assistant engine");
		let removed = self
			.storage
			.cleanup_expired()
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))?;
		if removed > 0 {
			tracing::info!(removed, "Cleaned up expired entries");
		}
		Ok(())
	}
}
