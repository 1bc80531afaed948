//! Handlers applying conversation rules to order state.

pub mod turn;

pub use turn::{TurnHandler, TurnOutcome};
