//! Session registry.
//!
//! Order state lives in the storage service under the `sessions`
//! namespace, one entry per session id. A per-session async mutex
//! serializes turns for the same id while other sessions proceed in
//! parallel.

use dashmap::DashMap;
use pizza_storage::StorageService;
use pizza_types::{truncate_id, OrderState, StorageKey};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Error)]
pub enum SessionError {
	#[error("Storage error: {0}")]
	Storage(String),
}

/// Storage-backed map from session id to order state.
pub struct SessionStore {
	storage: Arc<StorageService>,
	/// Idle expiry, refreshed on every save.
	ttl: Option<Duration>,
	locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SessionStore {
	pub fn new(storage: Arc<StorageService>, ttl: Option<Duration>) -> Self {
		Self {
			storage,
			ttl,
			locks: DashMap::new(),
		}
	}

	/// Waits for exclusive access to a session. Hold the guard for the
	/// whole turn.
	pub async fn lock(&self, session_id: &str) -> OwnedMutexGuard<()> {
		let lock = self
			.locks
			.entry(session_id.to_string())
			.or_default()
			.clone();
		lock.lock_owned().await
	}

	pub async fn load(&self, session_id: &str) -> Result<Option<OrderState>, SessionError> {
		self.storage
			.find(StorageKey::Sessions.as_str(), session_id)
			.await
			.map_err(|e| SessionError::Storage(e.to_string()))
	}

	/// Loads a session, creating a fresh state for an unseen id. The flag
	/// is true when the state was created. New states are not persisted
	/// until saved.
	pub async fn load_or_create(&self, session_id: &str) -> Result<(OrderState, bool), SessionError> {
		match self.load(session_id).await? {
			Some(state) => Ok((state, false)),
			None => {
				tracing::info!(session_id = %truncate_id(session_id), "Created new session");
				Ok((OrderState::new(), true))
			},
		}
	}

	pub async fn save(&self, session_id: &str, state: &OrderState) -> Result<(), SessionError> {
		self.storage
			.store_with_ttl(StorageKey::Sessions.as_str(), session_id, state, self.ttl)
			.await
			.map_err(|e| SessionError::Storage(e.to_string()))
	}

	/// Discards a session. Unknown ids are ignored.
	pub async fn remove(&self, session_id: &str) -> Result<(), SessionError> {
		self.storage
			.remove(StorageKey::Sessions.as_str(), session_id)
			.await
			.map_err(|e| SessionError::Storage(e.to_string()))
	}

	pub async fn exists(&self, session_id: &str) -> Result<bool, SessionError> {
		self.storage
			.exists(StorageKey::Sessions.as_str(), session_id)
			.await
			.map_err(|e| SessionError::Storage(e.to_string()))
	}

	/// Drops lock entries nobody holds or waits on. Returns how many were
	/// dropped.
	pub fn prune_locks(&self) -> usize {
		let before = self.locks.len();
		self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
		before.saturating_sub(self.locks.len())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pizza_storage::implementations::memory::MemoryStorage;
	use pizza_types::Step;

	fn store(ttl: Option<Duration>) -> SessionStore {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		SessionStore::new(storage, ttl)
	}

	#[tokio::test]
	async fn test_unseen_session_starts_at_greeting() {
		let sessions = store(None);
		let (state, created) = sessions.load_or_create("abc").await.unwrap();
		assert!(created);
		assert_eq!(state.step, Step::Greeting);
		assert!(!sessions.exists("abc").await.unwrap());
	}

	#[tokio::test]
	async fn test_save_load_remove() {
		let sessions = store(None);
		let mut state = OrderState::new();
		state.step = Step::AskDrinks;
		sessions.save("abc", &state).await.unwrap();

		let (loaded, created) = sessions.load_or_create("abc").await.unwrap();
		assert!(!created);
		assert_eq!(loaded, state);

		sessions.remove("abc").await.unwrap();
		sessions.remove("abc").await.unwrap();
		assert!(sessions.load("abc").await.unwrap().is_none());
	}

	#[tokio::test(start_paused = true)]
	async fn test_sessions_expire_after_ttl() {
		let sessions = store(Some(Duration::from_secs(60)));
		sessions.save("abc", &OrderState::new()).await.unwrap();

		tokio::time::advance(Duration::from_secs(61)).await;
		assert!(sessions.load("abc").await.unwrap().is_none());
	}

	#[tokio::test(start_paused = true)]
	async fn test_huge_ttl_saves_and_keeps_session() {
		let sessions = store(Some(Duration::from_secs(i64::MAX as u64)));
		let mut state = OrderState::new();
		state.step = Step::AskPizzas;
		sessions.save("abc", &state).await.unwrap();

		tokio::time::advance(Duration::from_secs(86_400)).await;
		assert_eq!(sessions.load("abc").await.unwrap(), Some(state));
	}

	#[tokio::test(start_paused = true)]
	async fn test_session_ttl_does_not_touch_orders() {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let sessions = SessionStore::new(storage.clone(), Some(Duration::from_secs(60)));
		sessions.save("abc", &OrderState::new()).await.unwrap();
		storage
			.store(StorageKey::Orders.as_str(), "abcd1234", &"placed")
			.await
			.unwrap();

		tokio::time::advance(Duration::from_secs(61)).await;
		assert!(sessions.load("abc").await.unwrap().is_none());
		assert!(storage.exists(StorageKey::Orders.as_str(), "abcd1234").await.unwrap());
	}

	#[tokio::test]
	async fn test_lock_serializes_same_session() {
		let sessions = Arc::new(store(None));
		let guard = sessions.lock("abc").await;

		let other = sessions.clone();
		let waiter = tokio::spawn(async move {
			let _guard = other.lock("abc").await;
		});
		tokio::task::yield_now().await;
		assert!(!waiter.is_finished());

		// A different session is not blocked
		let _free = sessions.lock("xyz").await;

		drop(guard);
		waiter.await.unwrap();
	}

	#[tokio::test]
	async fn test_prune_keeps_held_locks() {
		let sessions = store(None);
		let held = sessions.lock("busy").await;
		drop(sessions.lock("idle").await);

		assert_eq!(sessions.prune_locks(), 1);
		drop(held);
		assert_eq!(sessions.prune_locks(), 1);
	}
}
