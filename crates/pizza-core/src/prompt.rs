//! Text handed to the reply backend.
//!
//! The system instruction is built once per engine and carries the persona,
//! the full menu and the conversation rules. The context block is built per
//! turn from the order state.

use pizza_config::AssistantConfig;
use pizza_menu::Catalog;
use pizza_types::{format_price, Decimal, MenuItem, OrderState, Step};
use std::fmt::Write;

/// Persona, menu and rules for the whole conversation.
pub fn system_instruction(catalog: &Catalog, assistant: &AssistantConfig) -> String {
	format!(
		r#"You are "{name}", a friendly and efficient pizza ordering chatbot based in {city}.

MENU:
{menu}

{toppings}

CONVERSATION FLOW:
1. **Greeting**: Welcome the user warmly and ask if they want to order pizza
2. **Dietary Needs**: Ask about dietary preferences (vegan, vegetarian, halal, allergies)
3. **Pizza Selection**: After dietary preferences, ask what pizza they'd like and offer to show menu if needed
4. **Show Menu**: Only show menu if user asks for it or needs help choosing
5. **Toppings**: Ask if they want additional toppings
6. **Extras & Drinks**: Offer sides and beverages
7. **Address**: Get their delivery address
8. **Contact Info**: Get name and phone number
9. **Summary**: Show complete order with total price
10. **Confirmation**: Ask to confirm the order
11. **Finalization**: Thank them and provide estimated delivery time

RULES:
- Use only English while having the conversation
- ONLY mention items from the provided menu
- Be concise but friendly
- Use emojis and markdown formatting
- After getting dietary preferences, ask what pizza they want - don't show full menu unless requested
- When showing menu, show ONLY pizzas first, not sides and drinks
- Only show sides and drinks when user is ready for extras
- Guide users step by step through the ordering process
- Calculate and show total prices
- If user asks for unavailable items, politely suggest alternatives
- For dietary restrictions, only show matching items
- Always ask for confirmation before finalizing
- We DO offer additional toppings - show the toppings list when user asks
- When user wants toppings, show available toppings with prices and ask which ones they want
- Calculate topping prices correctly (add to base pizza price)

RESPONSE FORMAT:
- Use bullet points for menu items
- Bold important information
- Include prices with € symbol
- End with clear next step instruction

Remember: You can only sell what's on the menu. No substitutions or custom items."#,
		name = assistant.name,
		city = assistant.city,
		menu = catalog.render_menu(None),
		toppings = catalog.toppings_overview(),
	)
}

fn names(items: &[MenuItem]) -> String {
	if items.is_empty() {
		return "None".to_string();
	}
	items
		.iter()
		.map(|item| item.name.as_str())
		.collect::<Vec<_>>()
		.join(", ")
}

fn or_default<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
	value.as_deref().unwrap_or(fallback)
}

/// Per-turn context: current step, what has been collected and the
/// customer's message, plus the total once the order is summarised.
pub fn context_block(state: &OrderState, message: &str, total: Option<Decimal>) -> String {
	let info = &state.customer_info;
	let toppings = if state.toppings.is_empty() {
		"None".to_string()
	} else {
		state
			.toppings
			.iter()
			.map(|t| format!("{} (+{})", t.name, format_price(t.price)))
			.collect::<Vec<_>>()
			.join(", ")
	};
	let preferences = if state.pizza_preferences.is_empty() {
		"None".to_string()
	} else {
		state.pizza_preferences.join(", ")
	};

	let mut out = String::new();
	let _ = write!(
		out,
		"Current Step: {step}
Order Status:
- Dietary Needs: {dietary}
- Pizzas: {pizzas}
- Toppings: {toppings}
- Pizza Preferences: {preferences}
- Extras: {extras}
- Drinks: {drinks}
- Address: {address}
- Name: {name}
- Phone: {phone}
",
		step = state.step,
		dietary = state
			.dietary_needs
			.map(|d| d.to_string())
			.unwrap_or_else(|| "Not specified".to_string()),
		pizzas = names(&state.pizzas),
		extras = names(&state.extras),
		drinks = names(&state.drinks),
		address = or_default(&info.address, "Not provided"),
		name = or_default(&info.name, "Not provided"),
		phone = or_default(&info.phone, "Not provided"),
	);

	if state.step == Step::AskMissingInfo {
		let _ = writeln!(out, "- Missing: {}", state.missing_info().join(", "));
	}

	let _ = write!(
		out,
		"
User Message: {message}

IMPORTANT INSTRUCTIONS:
- If step is \"place_order\", the user has confirmed their order. Generate a completion message with order details and delivery time.
- If step is \"show_summary\", show the complete order summary and ask for confirmation.
- If step is \"confirm_order\", ask the user to confirm their order (yes/no).
- Follow the current step to provide appropriate response.

Based on the current step and order status, provide an appropriate response to guide the customer through the ordering process."
	);

	if let Some(total) = total {
		let _ = write!(out, "\nCalculated Total: {}", format_price(total));
	}
	out
}
