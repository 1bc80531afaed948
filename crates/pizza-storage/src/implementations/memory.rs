//! In-memory storage backend.
//!
//! Entries live in a `HashMap` behind a `tokio::sync::RwLock`. Entries
//! written with a TTL carry a deadline; reads treat an expired entry as
//! missing and `cleanup_expired` drops them. A TTL too large to represent
//! as a deadline means the entry never expires.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use pizza_types::{ConfigSchema, ImplementationRegistry, Schema, ValidationError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

struct Entry {
	value: Vec<u8>,
	expires_at: Option<Instant>,
}

impl Entry {
	fn is_expired(&self, now: Instant) -> bool {
		self.expires_at.is_some_and(|deadline| deadline <= now)
	}
}

/// In-memory storage implementation. Nothing survives a restart.
pub struct MemoryStorage {
	store: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryStorage {
	/// Creates a new MemoryStorage instance.
	pub fn new() -> Self {
		Self {
			store: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl Default for MemoryStorage {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let store = self.store.read().await;
		match store.get(key) {
			Some(entry) if !entry.is_expired(Instant::now()) => Ok(entry.value.clone()),
			_ => Err(StorageError::NotFound),
		}
	}

	async fn set_bytes(
		&self,
		key: &str,
		value: Vec<u8>,
		ttl: Option<Duration>,
	) -> Result<(), StorageError> {
		let expires_at = ttl.and_then(|ttl| Instant::now().checked_add(ttl));
		let mut store = self.store.write().await;
		store.insert(key.to_string(), Entry { value, expires_at });
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.remove(key);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let store = self.store.read().await;
		Ok(store
			.get(key)
			.is_some_and(|entry| !entry.is_expired(Instant::now())))
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryStorageSchema)
	}

	async fn cleanup_expired(&self) -> Result<usize, StorageError> {
		let now = Instant::now();
		let mut store = self.store.write().await;
		let before = store.len();
		store.retain(|_, entry| !entry.is_expired(now));
		let removed = before - store.len();
		if removed > 0 {
			tracing::debug!(removed, "Dropped expired memory storage entries");
		}
		Ok(removed)
	}
}

/// Configuration schema for MemoryStorage.
///
/// The backend takes no parameters; expiry is chosen per write by the
/// caller.
pub struct MemoryStorageSchema;

impl ConfigSchema for MemoryStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![], vec![]).validate(config)
	}
}

/// Factory function to create a memory storage backend from configuration.
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	MemoryStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	Ok(Box::new(MemoryStorage::new()))
}

/// Registry for the memory storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = crate::StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_basic_operations() {
		let storage = MemoryStorage::new();

		let key = "sessions:abc";
		let value = b"{\"step\":\"greeting\"}".to_vec();
		storage.set_bytes(key, value.clone(), None).await.unwrap();

		assert_eq!(storage.get_bytes(key).await.unwrap(), value);
		assert!(storage.exists(key).await.unwrap());

		storage.delete(key).await.unwrap();
		assert!(!storage.exists(key).await.unwrap());
		assert!(matches!(
			storage.get_bytes(key).await,
			Err(StorageError::NotFound)
		));
	}

	#[tokio::test]
	async fn test_overwrite_replaces_value() {
		let storage = MemoryStorage::new();
		storage.set_bytes("k", b"one".to_vec(), None).await.unwrap();
		storage.set_bytes("k", b"two".to_vec(), None).await.unwrap();
		assert_eq!(storage.get_bytes("k").await.unwrap(), b"two".to_vec());
	}

	#[tokio::test(start_paused = true)]
	async fn test_expired_entries_are_hidden_and_cleaned() {
		let storage = MemoryStorage::new();
		storage
			.set_bytes("short", b"x".to_vec(), Some(Duration::from_secs(10)))
			.await
			.unwrap();
		storage.set_bytes("forever", b"y".to_vec(), None).await.unwrap();

		tokio::time::advance(Duration::from_secs(11)).await;

		assert!(!storage.exists("short").await.unwrap());
		assert!(matches!(
			storage.get_bytes("short").await,
			Err(StorageError::NotFound)
		));
		assert_eq!(storage.cleanup_expired().await.unwrap(), 1);
		assert!(storage.exists("forever").await.unwrap());
	}

	#[tokio::test(start_paused = true)]
	async fn test_unrepresentable_ttl_never_expires() {
		let storage = MemoryStorage::new();
		storage
			.set_bytes("k", b"v".to_vec(), Some(Duration::from_secs(u64::MAX)))
			.await
			.unwrap();

		tokio::time::advance(Duration::from_secs(3600)).await;
		assert!(storage.exists("k").await.unwrap());
		assert_eq!(storage.cleanup_expired().await.unwrap(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn test_plain_writes_never_expire() {
		let config: toml::Value = toml::from_str("").unwrap();
		let storage = create_storage(&config).unwrap();
		storage.set_bytes("orders:abcd1234", b"{}".to_vec(), None).await.unwrap();

		tokio::time::advance(Duration::from_secs(365 * 24 * 3600)).await;
		assert!(storage.exists("orders:abcd1234").await.unwrap());
	}

	#[test]
	fn test_non_table_config_rejected() {
		let config = toml::Value::Integer(5);
		assert!(matches!(
			create_storage(&config),
			Err(StorageError::Configuration(_))
		));
	}
}
