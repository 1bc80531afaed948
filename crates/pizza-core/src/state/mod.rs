//! Step state for conversation sessions.
//!
//! `next_step` describes where the workflow goes from any step; the
//! `StepMachine` guards every live step change against the workflow order.

pub mod machine;

pub use machine::{next_step, settle, StepMachine, TransitionError};
