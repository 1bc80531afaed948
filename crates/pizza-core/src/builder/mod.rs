//! Builder for constructing assistant engines.
//!
//! Resolves the configured storage and reply backends through factory
//! maps, loads the menu and hands everything to `AssistantEngine::new`.

use crate::engine::{event_bus::EventBus, AssistantEngine};
use pizza_config::Config;
use pizza_menu::Catalog;
use pizza_reply::{ReplyError, ReplyInterface, ReplyService};
use pizza_storage::{StorageError, StorageInterface, StorageService};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Menu error: {0}")]
	Menu(String),
}

/// Factory functions keyed by implementation name.
pub struct AssistantFactories<SF, RF> {
	pub storage_factories: HashMap<String, SF>,
	pub reply_factories: HashMap<String, RF>,
}

/// Builder for constructing an `AssistantEngine` with pluggable backends.
pub struct AssistantBuilder {
	config: Config,
}

impl AssistantBuilder {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the engine. Every configured implementation that has a factory
	/// is created; any failure aborts the build.
	pub fn build<SF, RF>(self, factories: AssistantFactories<SF, RF>) -> Result<AssistantEngine, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
		RF: Fn(&toml::Value) -> Result<Box<dyn ReplyInterface>, ReplyError>,
	{
		let mut storage_impls = HashMap::new();
		for (name, config) in &self.config.storage.implementations {
			let Some(factory) = factories.storage_factories.get(name) else {
				tracing::warn!(component = "storage", implementation = %name, "No factory registered, skipping");
				continue;
			};
			match factory(config) {
				Ok(implementation) => {
					let is_primary = &self.config.storage.primary == name;
					tracing::info!(component = "storage", implementation = %name, enabled = %is_primary, "Loaded");
					storage_impls.insert(name.clone(), implementation);
				},
				Err(e) => {
					tracing::error!(
						component = "storage",
						implementation = %name,
						error = %e,
						"Failed to create storage implementation"
					);
					return Err(BuilderError::Config(format!(
						"Failed to create storage implementation '{}': {}",
						name, e
					)));
				},
			}
		}

		let primary_storage = &self.config.storage.primary;
		let storage_backend = storage_impls.remove(primary_storage).ok_or_else(|| {
			BuilderError::Config(format!(
				"Primary storage '{}' failed to load or has invalid configuration",
				primary_storage
			))
		})?;
		let storage = Arc::new(StorageService::new(storage_backend));

		let mut reply_impls: HashMap<String, Arc<dyn ReplyInterface>> = HashMap::new();
		for (name, config) in &self.config.reply.implementations {
			let Some(factory) = factories.reply_factories.get(name) else {
				tracing::warn!(component = "reply", implementation = %name, "No factory registered, skipping");
				continue;
			};
			match factory(config) {
				Ok(implementation) => {
					let is_primary = &self.config.reply.primary == name;
					tracing::info!(component = "reply", implementation = %name, enabled = %is_primary, "Loaded");
					reply_impls.insert(name.clone(), Arc::from(implementation));
				},
				Err(e) => {
					tracing::error!(
						component = "reply",
						implementation = %name,
						error = %e,
						"Failed to create reply implementation"
					);
					return Err(BuilderError::Config(format!(
						"Failed to create reply implementation '{}': {}",
						name, e
					)));
				},
			}
		}

		let reply = ReplyService::new(reply_impls, self.config.reply.primary.clone())
			.map_err(|e| BuilderError::Config(e.to_string()))?;

		let catalog = match &self.config.menu.path {
			Some(path) => Catalog::load(path).map_err(|e| {
				tracing::error!(path = %path, error = %e, "Failed to load menu");
				BuilderError::Menu(e.to_string())
			})?,
			None => {
				tracing::info!(component = "menu", implementation = "builtin", "Loaded");
				Catalog::builtin()
			},
		};

		AssistantEngine::new(
			self.config,
			storage,
			Arc::new(catalog),
			Some(Arc::new(reply)),
			EventBus::new(1000),
		)
		.map_err(|e| BuilderError::Config(e.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pizza_types::Step;
	use std::io::Write;

	fn factories() -> AssistantFactories<pizza_storage::StorageFactory, pizza_reply::ReplyFactory> {
		AssistantFactories {
			storage_factories: pizza_storage::get_all_implementations()
				.into_iter()
				.map(|(name, f)| (name.to_string(), f))
				.collect(),
			reply_factories: pizza_reply::get_all_implementations()
				.into_iter()
				.map(|(name, f)| (name.to_string(), f))
				.collect(),
		}
	}

	#[tokio::test]
	async fn test_builds_from_testing_config() {
		let engine = AssistantBuilder::new(Config::for_testing())
			.build(factories())
			.unwrap();
		engine.process_message("s1", "vegan").await.unwrap();
		let state = engine.session_state("s1").await.unwrap().unwrap();
		assert_eq!(state.step, Step::AskPizzas);
	}

	#[test]
	fn test_unknown_primary_storage_fails() {
		let mut config = Config::for_testing();
		config.storage.primary = "redis".into();
		let err = AssistantBuilder::new(config).build(factories()).err().unwrap();
		assert!(err.to_string().contains("Primary storage 'redis'"));
	}

	#[test]
	fn test_invalid_reply_config_fails() {
		let mut config = Config::for_testing();
		config.reply.implementations.insert(
			"gemini".into(),
			toml::from_str("model = \"gemini-2.5-flash\"").unwrap(),
		);
		let err = AssistantBuilder::new(config).build(factories()).err().unwrap();
		assert!(err.to_string().contains("gemini"));
	}

	#[test]
	fn test_menu_file_is_loaded() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(
			file,
			r#"
[[pizzas]]
id = "X1"
name = "House Special"
type = "Vegetarian"
price = 9.0

[toppings]
cheese = [{{ name = "Parmesan", price = 1.0 }}]
veggies = []
meats = []
"#
		)
		.unwrap();

		let mut config = Config::for_testing();
		config.menu.path = Some(file.path().to_string_lossy().into_owned());
		let engine = AssistantBuilder::new(config).build(factories()).unwrap();
		assert_eq!(engine.catalog().data().pizzas[0].name, "House Special");
	}

	#[test]
	fn test_missing_menu_file_fails() {
		let mut config = Config::for_testing();
		config.menu.path = Some("/nonexistent/menu.toml".into());
		let err = AssistantBuilder::new(config).build(factories()).err().unwrap();
		assert!(matches!(err, BuilderError::Menu(_)));
	}
}
