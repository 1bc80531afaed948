//! Keyword rule tables driving the conversation.
//!
//! Each table is ordered; the first rule whose keywords occur in the
//! lowercased message wins. Keywords match as plain substrings, so "no"
//! also fires inside "nothing" or "know".

use crate::state::settle;
use pizza_types::{DietaryNeed, OrderState, Step};

/// A keyword set and what it resolves to.
#[derive(Debug)]
pub struct KeywordRule<T: 'static> {
	pub keywords: &'static [&'static str],
	pub outcome: T,
}

impl<T> KeywordRule<T> {
	pub fn matches(&self, message_lower: &str) -> bool {
		contains_any(message_lower, self.keywords)
	}
}

/// First rule of a table matching the message.
pub fn first_match<'a, T>(rules: &'a [KeywordRule<T>], message_lower: &str) -> Option<&'a T> {
	rules
		.iter()
		.find(|rule| rule.matches(message_lower))
		.map(|rule| &rule.outcome)
}

pub fn contains_any(message_lower: &str, keywords: &[&str]) -> bool {
	keywords.iter().any(|k| message_lower.contains(k))
}

/// Commands honoured at every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
	/// Discard the session and start over.
	Restart,
	/// Print the menu.
	ShowMenu,
}

pub static COMMAND_RULES: &[KeywordRule<Command>] = &[
	KeywordRule {
		keywords: &["restart", "cancel"],
		outcome: Command::Restart,
	},
	KeywordRule {
		keywords: &["menu"],
		outcome: Command::ShowMenu,
	},
];

/// Answers to the confirmation question. Confirmation is checked first.
pub static CONFIRMATION_RULES: &[KeywordRule<Step>] = &[
	KeywordRule {
		keywords: &["yes", "confirm", "ok", "correct", "place", "order", "proceed"],
		outcome: Step::PlaceOrder,
	},
	KeywordRule {
		keywords: &["no", "wrong", "change", "modify", "cancel"],
		outcome: Step::ShowMenu,
	},
];

/// Dietary answers while the session is still in its opening steps.
pub static DIETARY_RULES: &[KeywordRule<(DietaryNeed, Step)>] = &[
	KeywordRule {
		keywords: &["vegan"],
		outcome: (DietaryNeed::Vegan, Step::AskPizzas),
	},
	KeywordRule {
		keywords: &["vegetarian"],
		outcome: (DietaryNeed::Vegetarian, Step::AskPizzas),
	},
	KeywordRule {
		keywords: &["no", "none", "meat", "everything"],
		outcome: (DietaryNeed::None, Step::ShowMenu),
	},
];

/// Words that decline the topping offer.
pub const TOPPING_SKIP_WORDS: &[&str] = &["no", "none", "skip", "no thanks"];

/// Pizza preference tags, longer variants before the tags they contain.
pub const PREFERENCE_TAGS: &[&str] = &[
	"extra spicy",
	"spicy",
	"mild",
	"extra cheese",
	"light cheese",
	"well done",
	"thin crust",
];

/// What an advancement rule can see.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
	pub state: &'a OrderState,
	pub message_lower: &'a str,
	/// Step the session was on when the message arrived.
	pub started_at: Step,
}

/// Moves a session one step forward when its guard holds.
pub struct AdvanceRule {
	pub from: Step,
	pub guard: fn(&TurnContext<'_>) -> bool,
	pub target: fn(&OrderState) -> Step,
}

impl std::fmt::Debug for AdvanceRule {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AdvanceRule").field("from", &self.from).finish()
	}
}

fn always(_: &TurnContext<'_>) -> bool {
	true
}

/// Per-step advancement, evaluated against the state after extraction.
pub static ADVANCE_RULES: &[AdvanceRule] = &[
	AdvanceRule {
		from: Step::ShowMenu,
		// The menu step must have been presented for a full turn.
		guard: |ctx| ctx.started_at == Step::ShowMenu,
		target: |_| Step::AskPizzas,
	},
	AdvanceRule {
		from: Step::AskPizzas,
		guard: |ctx| !ctx.state.pizzas.is_empty(),
		target: |_| Step::AskToppings,
	},
	AdvanceRule {
		from: Step::AskToppings,
		guard: |ctx| {
			contains_any(ctx.message_lower, TOPPING_SKIP_WORDS) || !ctx.state.toppings.is_empty()
		},
		target: |_| Step::AskPizzaPreferences,
	},
	AdvanceRule {
		from: Step::AskPizzaPreferences,
		guard: always,
		target: |_| Step::AskSidesExtras,
	},
	AdvanceRule {
		from: Step::AskSidesExtras,
		guard: always,
		target: |_| Step::AskDrinks,
	},
	AdvanceRule {
		from: Step::AskDrinks,
		guard: always,
		target: |_| Step::AskAddress,
	},
	AdvanceRule {
		from: Step::AskAddress,
		guard: |ctx| ctx.state.customer_info.address.is_some(),
		target: |_| Step::AskContactInfo,
	},
	AdvanceRule {
		from: Step::AskContactInfo,
		guard: |ctx| ctx.state.customer_info.has_contact(),
		target: |state| settle(state, Step::CheckRequiredInfo),
	},
	AdvanceRule {
		from: Step::AskMissingInfo,
		guard: |ctx| ctx.state.has_all_required_info(),
		target: |state| settle(state, Step::CheckRequiredInfo),
	},
];

/// Target of the advancement rule for the current step, if one fires.
pub fn advancement(ctx: &TurnContext<'_>) -> Option<Step> {
	ADVANCE_RULES
		.iter()
		.find(|rule| rule.from == ctx.state.step)
		.filter(|rule| (rule.guard)(ctx))
		.map(|rule| (rule.target)(ctx.state))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_fixed_targets_follow_workflow() {
		for rule in ADVANCE_RULES.iter().take(7) {
			let target = (rule.target)(&OrderState::new());
			assert_eq!(target.ordinal(), rule.from.ordinal() + 1, "{}", rule.from);
		}
	}

	#[test]
	fn test_command_priority() {
		assert_eq!(
			first_match(COMMAND_RULES, "cancel and show the menu"),
			Some(&Command::Restart)
		);
		assert_eq!(first_match(COMMAND_RULES, "show menu"), Some(&Command::ShowMenu));
		assert_eq!(first_match(COMMAND_RULES, "margherita"), None);
	}

	#[test]
	fn test_confirmation_checked_before_rejection() {
		// "no" and "ok" both occur; confirmation wins
		assert_eq!(
			first_match(CONFIRMATION_RULES, "no, ok fine"),
			Some(&Step::PlaceOrder)
		);
		assert_eq!(first_match(CONFIRMATION_RULES, "wrong pizza"), Some(&Step::ShowMenu));
		assert_eq!(first_match(CONFIRMATION_RULES, "hmm"), None);
	}

	#[test]
	fn test_dietary_rules() {
		assert_eq!(
			first_match(DIETARY_RULES, "i want vegan, no nuts"),
			Some(&(DietaryNeed::Vegan, Step::AskPizzas))
		);
		assert_eq!(
			first_match(DIETARY_RULES, "vegetarian please"),
			Some(&(DietaryNeed::Vegetarian, Step::AskPizzas))
		);
		assert_eq!(
			first_match(DIETARY_RULES, "i eat everything"),
			Some(&(DietaryNeed::None, Step::ShowMenu))
		);
		assert_eq!(first_match(DIETARY_RULES, "hello"), None);
	}

	#[test]
	fn test_show_menu_needs_a_full_turn() {
		let mut state = OrderState::new();
		state.step = Step::ShowMenu;
		let fresh = TurnContext {
			state: &state,
			message_lower: "none",
			started_at: Step::Greeting,
		};
		assert_eq!(advancement(&fresh), None);

		let next_turn = TurnContext {
			started_at: Step::ShowMenu,
			..fresh
		};
		assert_eq!(advancement(&next_turn), Some(Step::AskPizzas));
	}

	#[test]
	fn test_toppings_skip_or_pick() {
		let mut state = OrderState::new();
		state.step = Step::AskToppings;
		let skip = TurnContext {
			state: &state,
			message_lower: "no thanks",
			started_at: Step::AskToppings,
		};
		assert_eq!(advancement(&skip), Some(Step::AskPizzaPreferences));

		let undecided = TurnContext {
			message_lower: "hmm let me think",
			..skip
		};
		assert_eq!(advancement(&undecided), None);
	}
}
