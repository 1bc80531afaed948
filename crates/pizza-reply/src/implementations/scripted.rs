//! Deterministic reply backend.
//!
//! Answers every step with a fixed line so the service runs without a model
//! API key. Lines can be overridden per step in configuration:
//!
//! ```toml
//! [reply.implementations.scripted.lines]
//! ask_pizzas = "Which pizza can I get you?"
//! ```

use crate::{ReplyError, ReplyFactory, ReplyInterface, ReplyRegistry, ReplyRequest};
use async_trait::async_trait;
use pizza_types::{ConfigSchema, ImplementationRegistry, Step, ValidationError};
use std::collections::HashMap;

fn default_line(step: Step) -> &'static str {
	match step {
		Step::Greeting => "Welcome to PizzaBahn! Would you like to order a delicious pizza today?",
		Step::AskDietary => {
			"Do you have any dietary preferences? We have vegan and vegetarian options."
		},
		Step::ShowMenu => "Here is what we offer. Say \"menu\" to see the full list.",
		Step::AskPizzas => "Which pizza would you like?",
		Step::AskToppings => "Would you like any extra toppings? Say \"no thanks\" to skip.",
		Step::AskPizzaPreferences => "Any preferences for your pizza, like spicy or thin crust?",
		Step::AskSidesExtras => "Would you like any sides, such as garlic bread or fries?",
		Step::AskDrinks => "Something to drink with that?",
		Step::AskAddress => "What is the delivery address?",
		Step::AskContactInfo => "Could I have your name and phone number?",
		Step::CheckRequiredInfo | Step::AskMissingInfo => {
			"I still need a few details before I can take your order."
		},
		Step::ShowSummary | Step::ConfirmOrder => {
			"Here is your order summary. Shall I place the order? (yes/no)"
		},
		Step::PlaceOrder => "Thank you! Your order is confirmed and will arrive in about 30-45 minutes.",
		Step::EndConversation => "Thanks for ordering with PizzaBahn! Say \"restart\" to order again.",
	}
}

/// Scripted reply backend.
#[derive(Debug, Default)]
pub struct ScriptedReply {
	overrides: HashMap<Step, String>,
}

impl ScriptedReply {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_line(mut self, step: Step, line: impl Into<String>) -> Self {
		self.overrides.insert(step, line.into());
		self
	}

	/// Line used for a step.
	pub fn line(&self, step: Step) -> &str {
		self.overrides
			.get(&step)
			.map(String::as_str)
			.unwrap_or_else(|| default_line(step))
	}
}

/// Configuration schema for the scripted backend.
///
/// Accepts an optional `lines` table whose keys are step names and whose
/// values are strings.
pub struct ScriptedReplySchema;

impl ConfigSchema for ScriptedReplySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let Some(lines) = config.get("lines") else {
			return Ok(());
		};
		let table = lines.as_table().ok_or_else(|| ValidationError::TypeMismatch {
			field: "lines".into(),
			expected: "table".into(),
			actual: lines.type_str().into(),
		})?;
		for (key, value) in table {
			key.parse::<Step>()
				.map_err(|message| ValidationError::InvalidValue {
					field: format!("lines.{}", key),
					message,
				})?;
			if !value.is_str() {
				return Err(ValidationError::TypeMismatch {
					field: format!("lines.{}", key),
					expected: "string".into(),
					actual: value.type_str().into(),
				});
			}
		}
		Ok(())
	}
}

#[async_trait]
impl ReplyInterface for ScriptedReply {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(ScriptedReplySchema)
	}

	async fn generate(&self, request: &ReplyRequest) -> Result<String, ReplyError> {
		Ok(self.line(request.step).to_string())
	}
}

/// Factory function to create a scripted backend from configuration.
pub fn create_reply(config: &toml::Value) -> Result<Box<dyn ReplyInterface>, ReplyError> {
	ScriptedReplySchema
		.validate(config)
		.map_err(|e| ReplyError::Configuration(e.to_string()))?;

	let mut reply = ScriptedReply::new();
	if let Some(lines) = config.get("lines").and_then(|v| v.as_table()) {
		for (key, value) in lines {
			if let (Ok(step), Some(line)) = (key.parse::<Step>(), value.as_str()) {
				reply = reply.with_line(step, line);
			}
		}
	}
	Ok(Box::new(reply))
}

/// Registry for the scripted implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "scripted";
	type Factory = ReplyFactory;

	fn factory() -> Self::Factory {
		create_reply
	}
}

impl ReplyRegistry for Registry {}
