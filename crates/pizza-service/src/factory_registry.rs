//! Registry of backend factories available to the service.
//!
//! Every storage and reply implementation the workspace ships is registered
//! once; the configuration then picks among them by name.

use pizza_config::Config;
use pizza_core::{AssistantBuilder, AssistantEngine, AssistantFactories};
use pizza_reply::ReplyFactory;
use pizza_storage::StorageFactory;
use std::collections::HashMap;
use std::sync::OnceLock;

/// All known implementation factories, by name.
pub struct FactoryRegistry {
	pub storage: HashMap<String, StorageFactory>,
	pub reply: HashMap<String, ReplyFactory>,
}

impl FactoryRegistry {
	pub fn new() -> Self {
		Self {
			storage: HashMap::new(),
			reply: HashMap::new(),
		}
	}

	pub fn register_storage(&mut self, name: impl Into<String>, factory: StorageFactory) {
		self.storage.insert(name.into(), factory);
	}

	pub fn register_reply(&mut self, name: impl Into<String>, factory: ReplyFactory) {
		self.reply.insert(name.into(), factory);
	}
}

static REGISTRY: OnceLock<FactoryRegistry> = OnceLock::new();

/// The process-wide registry, populated on first use.
pub fn get_registry() -> &'static FactoryRegistry {
	REGISTRY.get_or_init(|| {
		let mut registry = FactoryRegistry::new();

		for (name, factory) in pizza_storage::get_all_implementations() {
			tracing::debug!("Registering storage implementation: {}", name);
			registry.register_storage(name, factory);
		}

		for (name, factory) in pizza_reply::get_all_implementations() {
			tracing::debug!("Registering reply implementation: {}", name);
			registry.register_reply(name, factory);
		}

		registry
	})
}

/// Picks the factories named in a config section, failing on unknown names.
macro_rules! build_factories {
	($registry:expr, $config_impls:expr, $registry_field:ident, $type_name:literal) => {{
		let mut factories = HashMap::new();
		for name in $config_impls.keys() {
			if let Some(factory) = $registry.$registry_field.get(name) {
				factories.insert(name.clone(), *factory);
			} else {
				let mut available: Vec<_> = $registry.$registry_field.keys().cloned().collect();
				available.sort();
				return Err(format!(
					"Unknown {} implementation '{}'. Available: [{}]",
					$type_name,
					name,
					available.join(", ")
				)
				.into());
			}
		}
		factories
	}};
}

/// Builds the assistant engine from configuration using the registry.
pub fn build_assistant_from_config(config: Config) -> Result<AssistantEngine, Box<dyn std::error::Error>> {
	let registry = get_registry();

	let storage_factories =
		build_factories!(registry, config.storage.implementations, storage, "storage");
	let reply_factories = build_factories!(registry, config.reply.implementations, reply, "reply");

	let factories = AssistantFactories {
		storage_factories,
		reply_factories,
	};

	Ok(AssistantBuilder::new(config).build(factories)?)
}
