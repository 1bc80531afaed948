//! Per-message rule evaluation.
//!
//! Applies the confirmation gate, dietary capture, item and customer-info
//! extraction and step advancement to a session's order state. Global
//! commands (restart, menu) are handled by the engine before a turn gets
//! here.

use crate::extraction::{ExtractionError, Extractor};
use crate::rules::{advancement, first_match, TurnContext, CONFIRMATION_RULES, DIETARY_RULES};
use crate::state::{StepMachine, TransitionError};
use pizza_menu::Catalog;
use pizza_types::{OrderState, Step};
use std::sync::Arc;

/// What a turn did to the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnOutcome {
	pub from: Step,
	pub to: Step,
	/// The customer answered the confirmation question.
	pub confirmation: Option<Step>,
}

pub struct TurnHandler {
	catalog: Arc<Catalog>,
	extractor: Extractor,
	machine: StepMachine,
}

impl TurnHandler {
	pub fn new(catalog: Arc<Catalog>) -> Result<Self, ExtractionError> {
		Ok(Self {
			catalog,
			extractor: Extractor::new()?,
			machine: StepMachine::new(),
		})
	}

	/// Runs the rules for one message against `state`.
	pub fn apply(&self, state: &mut OrderState, message: &str) -> Result<TurnOutcome, TransitionError> {
		let from = state.step;
		let message_lower = message.to_lowercase();

		if from == Step::ConfirmOrder {
			if let Some(&target) = first_match(CONFIRMATION_RULES, &message_lower) {
				self.machine.transition(state, target)?;
				return Ok(TurnOutcome {
					from,
					to: target,
					confirmation: Some(target),
				});
			}
		}

		if from.is_opening() && state.dietary_needs.is_none() {
			if let Some(&(need, target)) = first_match(DIETARY_RULES, &message_lower) {
				tracing::debug!(dietary = %need, "Captured dietary preference");
				state.dietary_needs = Some(need);
				self.machine.transition(state, target)?;
			}
		}

		self.extractor
			.extract_items(&self.catalog, state, &message_lower);
		if state.step == Step::AskPizzaPreferences {
			self.extractor.extract_preferences(state, &message_lower);
		}
		self.extractor.extract_customer_info(state, message);

		let ctx = TurnContext {
			state,
			message_lower: &message_lower,
			started_at: from,
		};
		if let Some(target) = advancement(&ctx) {
			self.machine.transition(state, target)?;
		}

		Ok(TurnOutcome {
			from,
			to: state.step,
			confirmation: None,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::state::{next_step, settle};
	use pizza_types::{DietaryNeed, ItemKind};

	fn handler() -> TurnHandler {
		TurnHandler::new(Arc::new(Catalog::builtin())).unwrap()
	}

	fn at(step: Step) -> OrderState {
		let mut state = OrderState::new();
		state.step = step;
		state
	}

	#[test]
	fn test_vegan_answer_skips_to_pizzas() {
		let mut state = at(Step::AskDietary);
		let outcome = handler().apply(&mut state, "I want vegan, no nuts").unwrap();
		assert_eq!(state.dietary_needs, Some(DietaryNeed::Vegan));
		assert_eq!(state.step, Step::AskPizzas);
		assert_eq!(outcome.from, Step::AskDietary);
		assert_eq!(outcome.to, Step::AskPizzas);
	}

	#[test]
	fn test_no_restriction_shows_menu_then_asks_pizzas() {
		let handler = handler();
		let mut state = OrderState::new();
		handler.apply(&mut state, "none for me").unwrap();
		assert_eq!(state.dietary_needs, Some(DietaryNeed::None));
		assert_eq!(state.step, Step::ShowMenu);

		handler.apply(&mut state, "sounds good").unwrap();
		assert_eq!(state.step, Step::AskPizzas);
	}

	#[test]
	fn test_dietary_is_never_overwritten() {
		let handler = handler();
		let mut state = at(Step::Greeting);
		state.dietary_needs = Some(DietaryNeed::Vegetarian);
		handler.apply(&mut state, "vegan").unwrap();
		assert_eq!(state.dietary_needs, Some(DietaryNeed::Vegetarian));
		assert_eq!(state.step, Step::Greeting);
	}

	#[test]
	fn test_pizza_choice_advances() {
		let mut state = at(Step::AskPizzas);
		handler().apply(&mut state, "Margherita please").unwrap();
		assert_eq!(state.pizzas[0].id, "P1");
		assert_eq!(state.step, Step::AskToppings);
	}

	#[test]
	fn test_no_pizza_stays() {
		let mut state = at(Step::AskPizzas);
		handler().apply(&mut state, "what do you recommend?").unwrap();
		assert_eq!(state.step, Step::AskPizzas);
	}

	#[test]
	fn test_topping_skip() {
		let mut state = at(Step::AskToppings);
		handler().apply(&mut state, "no thanks").unwrap();
		assert_eq!(state.step, Step::AskPizzaPreferences);
		assert!(state.toppings.is_empty());
	}

	#[test]
	fn test_undecided_toppings_stay() {
		let mut state = at(Step::AskToppings);
		handler().apply(&mut state, "what toppings are there?").unwrap();
		assert_eq!(state.step, Step::AskToppings);
	}

	#[test]
	fn test_preferences_only_recorded_at_their_step() {
		let handler = handler();
		let mut early = at(Step::AskPizzas);
		handler.apply(&mut early, "spicy please").unwrap();
		assert!(early.pizza_preferences.is_empty());

		let mut state = at(Step::AskPizzaPreferences);
		handler.apply(&mut state, "well done, thin crust").unwrap();
		assert_eq!(state.pizza_preferences, vec!["well done", "thin crust"]);
		assert_eq!(state.step, Step::AskSidesExtras);
	}

	#[test]
	fn test_address_then_contact_reaches_summary() {
		let handler = handler();
		let catalog = Catalog::builtin();
		let mut state = at(Step::AskAddress);
		state
			.pizzas
			.push(catalog.find_by_id(ItemKind::Pizza, "P13").unwrap().clone());

		handler.apply(&mut state, "Kastanienallee 7").unwrap();
		assert_eq!(state.step, Step::AskAddress);

		handler.apply(&mut state, "Kastanienstraße 7").unwrap();
		assert_eq!(state.step, Step::AskContactInfo);

		handler.apply(&mut state, "my name is lena").unwrap();
		assert_eq!(state.step, Step::AskContactInfo);

		handler.apply(&mut state, "0301234567").unwrap();
		assert_eq!(state.step, Step::ShowSummary);
	}

	#[test]
	fn test_missing_pizza_detours_through_missing_info() {
		let handler = handler();
		let mut state = at(Step::AskContactInfo);
		state.customer_info.address = Some("Torstraße 1".into());

		handler
			.apply(&mut state, "I'm max, 01761234567")
			.unwrap();
		assert_eq!(state.step, Step::AskMissingInfo);

		handler.apply(&mut state, "a hawaiian then").unwrap();
		assert_eq!(state.step, Step::ShowSummary);
	}

	#[test]
	fn test_confirmation_places_order() {
		let mut state = at(Step::ConfirmOrder);
		let outcome = handler().apply(&mut state, "yes please").unwrap();
		assert_eq!(state.step, Step::PlaceOrder);
		assert_eq!(outcome.confirmation, Some(Step::PlaceOrder));
	}

	#[test]
	fn test_rejection_returns_to_menu_without_extraction() {
		let mut state = at(Step::ConfirmOrder);
		let outcome = handler().apply(&mut state, "wrong, I wanted a sprite").unwrap();
		assert_eq!(state.step, Step::ShowMenu);
		assert_eq!(outcome.confirmation, Some(Step::ShowMenu));
		assert!(state.drinks.is_empty());
	}

	#[test]
	fn test_unclear_confirmation_stays() {
		let mut state = at(Step::ConfirmOrder);
		handler().apply(&mut state, "hmm").unwrap();
		assert_eq!(state.step, Step::ConfirmOrder);
	}

	#[test]
	fn test_step_never_moves_backwards_outside_rejection() {
		let handler = handler();
		let messages = [
			"hi",
			"vegetarian",
			"Four Cheese and a Club Mate",
			"extra mozzarella",
			"mild",
			"garlic bread",
			"no drinks",
			"Oranienstraße 3, Berlin",
			"my name is Jo, 0309876543",
			"yes",
			"thanks",
		];
		let mut state = OrderState::new();
		for message in messages {
			let before = state.step;
			handler.apply(&mut state, message).unwrap();
			assert!(state.step.ordinal() >= before.ordinal(), "{} -> {}", before, state.step);
		}
	}

	#[test]
	fn test_live_advancement_agrees_with_next_step() {
		let handler = handler();
		let catalog = Catalog::builtin();
		let pizza = catalog.find_by_id(ItemKind::Pizza, "P2").unwrap().clone();

		let messages = [
			"sure",
			"no",
			"none",
			"Veggie Supreme",
			"olives",
			"skip",
			"spicy",
			"fries",
			"sprite",
			"Hauptstraße 12",
			"name: kim",
			"0301234567",
			"my name is Anna, phone 030123456789, Hauptstraße 12, Berlin",
		];
		let advancing_steps = [
			Step::ShowMenu,
			Step::AskPizzas,
			Step::AskToppings,
			Step::AskPizzaPreferences,
			Step::AskSidesExtras,
			Step::AskDrinks,
			Step::AskAddress,
			Step::AskContactInfo,
			Step::AskMissingInfo,
		];

		for step in advancing_steps {
			for with_data in [false, true] {
				for message in messages {
					let mut state = at(step);
					if with_data {
						state.pizzas.push(pizza.clone());
						state.customer_info.address = Some("Hauptstraße 12".into());
					}
					handler.apply(&mut state, message).unwrap();
					if state.step != step {
						let mut probe = state.clone();
						probe.step = step;
						assert_eq!(
							state.step,
							settle(&probe, next_step(&probe)),
							"{} with {:?}",
							step,
							message
						);
					}
				}
			}
		}
	}
}
