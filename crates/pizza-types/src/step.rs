//! Workflow steps and dietary preferences.
//!
//! The ordering conversation is a fixed linear sequence of steps. The order
//! of the variants below is the order of the workflow; `Step::ordinal`
//! exposes that position so transitions can be checked for direction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Position of a session in the ordering workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Step {
	#[default]
	Greeting,
	AskDietary,
	ShowMenu,
	AskPizzas,
	AskToppings,
	AskPizzaPreferences,
	AskSidesExtras,
	AskDrinks,
	AskAddress,
	AskContactInfo,
	CheckRequiredInfo,
	AskMissingInfo,
	ShowSummary,
	ConfirmOrder,
	PlaceOrder,
	EndConversation,
}

impl Step {
	/// Every step in workflow order.
	pub const ALL: [Step; 16] = [
		Step::Greeting,
		Step::AskDietary,
		Step::ShowMenu,
		Step::AskPizzas,
		Step::AskToppings,
		Step::AskPizzaPreferences,
		Step::AskSidesExtras,
		Step::AskDrinks,
		Step::AskAddress,
		Step::AskContactInfo,
		Step::CheckRequiredInfo,
		Step::AskMissingInfo,
		Step::ShowSummary,
		Step::ConfirmOrder,
		Step::PlaceOrder,
		Step::EndConversation,
	];

	/// Returns the wire name of the step.
	pub fn as_str(&self) -> &'static str {
		match self {
			Step::Greeting => "greeting",
			Step::AskDietary => "ask_dietary",
			Step::ShowMenu => "show_menu",
			Step::AskPizzas => "ask_pizzas",
			Step::AskToppings => "ask_toppings",
			Step::AskPizzaPreferences => "ask_pizza_preferences",
			Step::AskSidesExtras => "ask_sides_extras",
			Step::AskDrinks => "ask_drinks",
			Step::AskAddress => "ask_address",
			Step::AskContactInfo => "ask_contact_info",
			Step::CheckRequiredInfo => "check_required_info",
			Step::AskMissingInfo => "ask_missing_info",
			Step::ShowSummary => "show_summary",
			Step::ConfirmOrder => "confirm_order",
			Step::PlaceOrder => "place_order",
			Step::EndConversation => "end_conversation",
		}
	}

	/// Position of the step in the workflow sequence.
	pub fn ordinal(&self) -> usize {
		Self::ALL
			.iter()
			.position(|s| s == self)
			.unwrap_or(Self::ALL.len())
	}

	/// True while the session has not yet answered the dietary question.
	pub fn is_opening(&self) -> bool {
		matches!(self, Step::Greeting | Step::AskDietary)
	}
}

impl fmt::Display for Step {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Step {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.iter()
			.find(|step| step.as_str() == s)
			.copied()
			.ok_or_else(|| format!("unknown step '{}'", s))
	}
}

/// Dietary preference captured at the start of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietaryNeed {
	/// No restriction. Serialized as `"none"`.
	None,
	Vegetarian,
	Vegan,
}

impl DietaryNeed {
	pub fn as_str(&self) -> &'static str {
		match self {
			DietaryNeed::None => "none",
			DietaryNeed::Vegetarian => "vegetarian",
			DietaryNeed::Vegan => "vegan",
		}
	}
}

impl fmt::Display for DietaryNeed {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_ordinals_follow_workflow() {
		for pair in Step::ALL.windows(2) {
			assert!(pair[0].ordinal() < pair[1].ordinal());
		}
		assert_eq!(Step::Greeting.ordinal(), 0);
		assert_eq!(Step::EndConversation.ordinal(), 15);
	}

	#[test]
	fn test_step_names_round_trip_through_from_str() {
		assert_eq!("ask_pizza_preferences".parse::<Step>(), Ok(Step::AskPizzaPreferences));
		assert!("ask_dessert".parse::<Step>().is_err());
	}

	#[test]
	fn test_serde_uses_snake_case() {
		let json = serde_json::to_string(&Step::ConfirmOrder).unwrap();
		assert_eq!(json, "\"confirm_order\"");
		let need: DietaryNeed = serde_json::from_str("\"none\"").unwrap();
		assert_eq!(need, DietaryNeed::None);
	}
}
