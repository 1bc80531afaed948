//! Event types published by the assistant engine.
//!
//! Events flow through the engine's broadcast bus so that other parts of the
//! service (logging, fulfilment integrations) can react to order progress
//! without being coupled to the turn handler.

use crate::{OrderRecord, Step};
use serde::{Deserialize, Serialize};

/// Main event type encompassing all assistant events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AssistantEvent {
	/// Events about a conversation session.
	Session(SessionEvent),
	/// Events about orders.
	Order(OrderEvent),
}

/// Events related to conversation sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
	/// A session was created on its first message.
	Started { session_id: String },
	/// A session moved to a new step.
	StepChanged {
		session_id: String,
		from: Step,
		to: Step,
	},
	/// A session was discarded by a restart command or reset request.
	Reset { session_id: String },
}

/// Events related to orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderEvent {
	/// The customer confirmed and an order record was emitted.
	Placed {
		session_id: String,
		record: OrderRecord,
	},
	/// The customer rejected the summary and went back to the menu.
	Rejected { session_id: String },
}
