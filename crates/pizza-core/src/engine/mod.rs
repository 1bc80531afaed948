//! Conversation engine that drives a session through the ordering workflow.
//!
//! `AssistantEngine` owns the catalog, the session store, the turn handler
//! and the reply service. One call to `process_message` is one turn: global
//! commands first, then the turn rules on a working copy of the state, then
//! the reply. The working copy is committed only once a reply was produced,
//! so a failed reply leaves the stored session as it was.

pub mod event_bus;
pub mod lifecycle;

use crate::handlers::{TurnHandler, TurnOutcome};
use crate::pricing::order_total;
use crate::prompt;
use crate::rules::{first_match, Command, COMMAND_RULES};
use crate::session::SessionStore;
use crate::state::StepMachine;
use event_bus::EventBus;
use pizza_config::Config;
use pizza_menu::Catalog;
use pizza_reply::{ReplyRequest, ReplyService};
use pizza_storage::{StorageError, StorageService};
use pizza_types::{
	truncate_id, AssistantEvent, OrderEvent, OrderRecord, OrderState, ReplyType, SessionEvent,
	Step, StorageKey,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Reply when no reply backend is configured.
pub const UNAVAILABLE_REPLY: &str = "Sorry, I'm currently unavailable. Please try again later.";
/// Reply when the reply backend failed for this turn.
pub const APOLOGY_REPLY: &str = "Sorry, I'm having trouble processing your request. Please try again!";

/// Errors that can occur while processing a turn.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Invalid input: {0}")]
	InvalidInput(String),
	#[error("Session error: {0}")]
	Session(String),
	#[error("Storage error: {0}")]
	Storage(String),
	#[error("Transition error: {0}")]
	Transition(String),
	#[error("Serialization error: {0}")]
	Serialization(String),
	#[error("Configuration error: {0}")]
	Config(String),
}

/// Text shown to the customer and how to render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
	pub text: String,
	pub reply_type: ReplyType,
}

impl Reply {
	pub fn text(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			reply_type: ReplyType::Text,
		}
	}

	pub fn menu(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			reply_type: ReplyType::Menu,
		}
	}
}

/// Main engine driving ordering conversations.
#[derive(Clone)]
pub struct AssistantEngine {
	pub(crate) config: Config,
	/// Storage shared with the session store; also holds placed orders.
	pub(crate) storage: Arc<StorageService>,
	pub(crate) sessions: Arc<SessionStore>,
	pub(crate) catalog: Arc<Catalog>,
	/// Absent when the engine runs without a reply backend.
	pub(crate) reply: Option<Arc<ReplyService>>,
	pub(crate) event_bus: EventBus,
	pub(crate) turn_handler: Arc<TurnHandler>,
	pub(crate) machine: StepMachine,
	system_instruction: Arc<str>,
}

impl AssistantEngine {
	pub fn new(
		config: Config,
		storage: Arc<StorageService>,
		catalog: Arc<Catalog>,
		reply: Option<Arc<ReplyService>>,
		event_bus: EventBus,
	) -> Result<Self, EngineError> {
		let sessions = Arc::new(SessionStore::new(storage.clone(), config.session_ttl()));
		let turn_handler = Arc::new(
			TurnHandler::new(catalog.clone()).map_err(|e| EngineError::Config(e.to_string()))?,
		);
		let system_instruction = prompt::system_instruction(&catalog, &config.assistant).into();

		Ok(Self {
			config,
			storage,
			sessions,
			catalog,
			reply,
			event_bus,
			turn_handler,
			machine: StepMachine::new(),
			system_instruction,
		})
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn catalog(&self) -> &Arc<Catalog> {
		&self.catalog
	}

	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	pub fn sessions(&self) -> &Arc<SessionStore> {
		&self.sessions
	}

	/// Canned reply to a restart command.
	pub fn restart_reply(&self) -> String {
		format!(
			"Order cancelled! Let's start fresh. Welcome to {}! Would you like to order a delicious pizza today?",
			self.config.assistant.name
		)
	}

	/// Processes one customer message for a session.
	#[instrument(skip_all, fields(session_id = %truncate_id(session_id)))]
	pub async fn process_message(&self, session_id: &str, message: &str) -> Result<Reply, EngineError> {
		let message = message.trim();
		if message.is_empty() {
			return Err(EngineError::InvalidInput("message must not be empty".into()));
		}

		let _guard = self.sessions.lock(session_id).await;
		let message_lower = message.to_lowercase();
		let command = first_match(COMMAND_RULES, &message_lower).copied();

		if command == Some(Command::Restart) {
			self.discard(session_id).await?;
			return Ok(Reply::text(self.restart_reply()));
		}

		let (mut state, created) = self
			.sessions
			.load_or_create(session_id)
			.await
			.map_err(|e| EngineError::Session(e.to_string()))?;
		if created {
			self.event_bus
				.publish(AssistantEvent::Session(SessionEvent::Started {
					session_id: session_id.to_string(),
				}))
				.ok();
		}

		if command == Some(Command::ShowMenu) {
			return self.show_menu(session_id, state).await;
		}

		let Some(reply) = &self.reply else {
			tracing::warn!("No reply backend configured");
			return Ok(Reply::text(UNAVAILABLE_REPLY));
		};

		let outcome = self
			.turn_handler
			.apply(&mut state, message)
			.map_err(|e| EngineError::Transition(e.to_string()))?;

		let total = match state.step {
			Step::ShowSummary | Step::ConfirmOrder => {
				state.total_price = order_total(&state);
				Some(state.total_price)
			},
			_ => None,
		};

		let request = ReplyRequest {
			system: self.system_instruction.to_string(),
			context: prompt::context_block(&state, message, total),
			step: state.step,
		};
		let mut text = match reply.generate(&request).await {
			Ok(text) => text,
			Err(e) => {
				tracing::error!(step = %state.step, error = %e, "Reply generation failed, discarding turn");
				return Ok(Reply::text(APOLOGY_REPLY));
			},
		};

		match state.step {
			Step::PlaceOrder => {
				let record = self.place_order(session_id, &mut state).await?;
				text.push_str(&fenced_json(&record)?);
			},
			Step::ShowSummary => {
				self.advance(&mut state, Step::ConfirmOrder)?;
			},
			_ => {},
		}

		self.sessions
			.save(session_id, &state)
			.await
			.map_err(|e| EngineError::Session(e.to_string()))?;
		self.publish_outcome(session_id, &outcome, state.step);

		Ok(Reply::text(text))
	}

	/// Discards a session's state. Unknown ids are a no-op.
	pub async fn reset_session(&self, session_id: &str) -> Result<(), EngineError> {
		let _guard = self.sessions.lock(session_id).await;
		self.discard(session_id).await
	}

	/// Current state of a session, if it exists.
	pub async fn session_state(&self, session_id: &str) -> Result<Option<OrderState>, EngineError> {
		self.sessions
			.load(session_id)
			.await
			.map_err(|e| EngineError::Session(e.to_string()))
	}

	/// Looks up a placed order by id.
	pub async fn get_order(&self, order_id: &str) -> Result<Option<OrderRecord>, EngineError> {
		self.storage
			.find(StorageKey::Orders.as_str(), order_id)
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))
	}

	async fn discard(&self, session_id: &str) -> Result<(), EngineError> {
		self.sessions
			.remove(session_id)
			.await
			.map_err(|e| EngineError::Session(e.to_string()))?;
		tracing::info!("Session reset");
		self.event_bus
			.publish(AssistantEvent::Session(SessionEvent::Reset {
				session_id: session_id.to_string(),
			}))
			.ok();
		Ok(())
	}

	async fn show_menu(&self, session_id: &str, mut state: OrderState) -> Result<Reply, EngineError> {
		let need = state.dietary_needs.map(|d| d.as_str());
		let text = self.catalog.render_menu(need);
		let from = state.step;

		if from.is_opening() {
			self.advance(&mut state, Step::AskPizzas)?;
			state.menu_shown = true;
		}

		self.sessions
			.save(session_id, &state)
			.await
			.map_err(|e| EngineError::Session(e.to_string()))?;
		if from != state.step {
			self.publish_step(session_id, from, state.step);
		}
		tracing::info!(dietary = need.unwrap_or("any"), "Menu shown");

		Ok(Reply::menu(text))
	}

	/// Emits the order record, stores it and ends the conversation.
	async fn place_order(&self, session_id: &str, state: &mut OrderState) -> Result<OrderRecord, EngineError> {
		state.total_price = order_total(state);
		let order_id: String = uuid::Uuid::new_v4().to_string().chars().take(8).collect();
		let record = OrderRecord::confirmed(order_id, chrono::Utc::now().to_rfc3339(), state);

		self.storage
			.store(StorageKey::Orders.as_str(), &record.order_id, &record)
			.await
			.map_err(|e: StorageError| EngineError::Storage(e.to_string()))?;
		self.advance(state, Step::EndConversation)?;

		tracing::info!(
			order_id = %record.order_id,
			total = %record.total,
			pizzas = record.items.pizzas.len(),
			"Order placed"
		);
		self.event_bus
			.publish(AssistantEvent::Order(OrderEvent::Placed {
				session_id: session_id.to_string(),
				record: record.clone(),
			}))
			.ok();

		Ok(record)
	}

	fn advance(&self, state: &mut OrderState, to: Step) -> Result<(), EngineError> {
		self.machine
			.transition(state, to)
			.map_err(|e| EngineError::Transition(e.to_string()))
	}

	fn publish_outcome(&self, session_id: &str, outcome: &TurnOutcome, to: Step) {
		if outcome.confirmation == Some(Step::ShowMenu) {
			tracing::info!("Order summary rejected");
			self.event_bus
				.publish(AssistantEvent::Order(OrderEvent::Rejected {
					session_id: session_id.to_string(),
				}))
				.ok();
		}
		if outcome.from != to {
			self.publish_step(session_id, outcome.from, to);
		}
	}

	fn publish_step(&self, session_id: &str, from: Step, to: Step) {
		tracing::debug!(%from, %to, "Session step changed");
		self.event_bus
			.publish(AssistantEvent::Session(SessionEvent::StepChanged {
				session_id: session_id.to_string(),
				from,
				to,
			}))
			.ok();
	}
}

/// The order record as a fenced JSON block appended to the reply.
fn fenced_json(record: &OrderRecord) -> Result<String, EngineError> {
	let json = serde_json::to_string_pretty(record)
		.map_err(|e| EngineError::Serialization(e.to_string()))?;
	Ok(format!("\n\n```json\n{}\n```", json))
}
