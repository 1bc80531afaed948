//! Workflow step transitions.
//!
//! Steps only move forward through the sequence, with one exception: a
//! customer who rejects the summary at `confirm_order` is sent back to
//! `show_menu`.

use once_cell::sync::Lazy;
use pizza_types::{OrderState, Step};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
	#[error("Invalid step transition from {from} to {to}")]
	InvalidTransition { from: Step, to: Step },
}

/// Where the workflow goes next from the state's current step.
///
/// Pure; never mutates. `check_required_info` resolves to `show_summary` or
/// `ask_missing_info`, and the terminal step maps to itself.
pub fn next_step(state: &OrderState) -> Step {
	let info = &state.customer_info;
	match state.step {
		Step::Greeting => Step::AskDietary,
		Step::AskDietary if state.dietary_needs.is_some() => Step::ShowMenu,
		Step::AskDietary => Step::AskDietary,
		Step::ShowMenu => Step::AskPizzas,
		Step::AskPizzas if !state.pizzas.is_empty() => Step::AskToppings,
		Step::AskPizzas => Step::AskPizzas,
		Step::AskToppings => Step::AskPizzaPreferences,
		Step::AskPizzaPreferences => Step::AskSidesExtras,
		Step::AskSidesExtras => Step::AskDrinks,
		Step::AskDrinks => Step::AskAddress,
		Step::AskAddress if info.address.is_some() => Step::AskContactInfo,
		Step::AskAddress => Step::AskAddress,
		Step::AskContactInfo if info.has_contact() => Step::CheckRequiredInfo,
		Step::AskContactInfo => Step::AskContactInfo,
		Step::CheckRequiredInfo if state.has_all_required_info() => Step::ShowSummary,
		Step::CheckRequiredInfo => Step::AskMissingInfo,
		Step::AskMissingInfo => Step::CheckRequiredInfo,
		Step::ShowSummary => Step::ConfirmOrder,
		Step::ConfirmOrder => Step::PlaceOrder,
		Step::PlaceOrder | Step::EndConversation => Step::EndConversation,
	}
}

/// Resolves a target step through `check_required_info`, which a session
/// never rests on.
pub fn settle(state: &OrderState, step: Step) -> Step {
	if step != Step::CheckRequiredInfo {
		return step;
	}
	if state.has_all_required_info() {
		Step::ShowSummary
	} else {
		Step::AskMissingInfo
	}
}

/// Applies validated step changes to an order state.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepMachine;

impl StepMachine {
	pub fn new() -> Self {
		Self
	}

	/// Moves the state to `to`. Staying on the same step is a no-op.
	pub fn transition(&self, state: &mut OrderState, to: Step) -> Result<(), TransitionError> {
		let from = state.step;
		if from == to {
			return Ok(());
		}
		if !Self::is_valid_transition(from, to) {
			return Err(TransitionError::InvalidTransition { from, to });
		}
		tracing::debug!(%from, %to, "Step transition");
		state.step = to;
		Ok(())
	}

	/// Checks if a step transition is valid.
	pub fn is_valid_transition(from: Step, to: Step) -> bool {
		// Every step may jump to any later one; rejection is the only way back.
		static TRANSITIONS: Lazy<HashMap<Step, HashSet<Step>>> = Lazy::new(|| {
			let mut m: HashMap<Step, HashSet<Step>> = Step::ALL
				.iter()
				.map(|from| {
					let later = Step::ALL
						.iter()
						.filter(|to| to.ordinal() > from.ordinal())
						.copied()
						.collect();
					(*from, later)
				})
				.collect();
			m.entry(Step::ConfirmOrder)
				.or_default()
				.insert(Step::ShowMenu);
			m
		});

		TRANSITIONS.get(&from).is_some_and(|set| set.contains(&to))
	}
}
