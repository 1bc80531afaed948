//! Conversation engine for the PizzaBahn ordering assistant.
//!
//! Ties together the menu catalog, the per-session order state, the
//! keyword rules that move a session through the ordering workflow and the
//! reply backend that phrases each answer.

pub mod builder;
pub mod engine;
pub mod extraction;
pub mod handlers;
pub mod pricing;
pub mod prompt;
pub mod rules;
pub mod session;
pub mod state;

pub use builder::{AssistantBuilder, AssistantFactories, BuilderError};
pub use engine::event_bus::EventBus;
pub use engine::{AssistantEngine, EngineError, Reply, APOLOGY_REPLY, UNAVAILABLE_REPLY};
pub use session::{SessionError, SessionStore};
pub use state::{next_step, settle, StepMachine, TransitionError};
