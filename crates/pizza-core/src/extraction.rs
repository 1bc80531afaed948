//! Heuristic extraction of order details from free text.
//!
//! Nothing here is validated against intent: a message mentioning a menu
//! item adds it, and the first phone-like or address-like text is kept.
//! Fields that are already set are never overwritten.

use crate::rules::{contains_any, PREFERENCE_TAGS};
use pizza_menu::Catalog;
use pizza_types::{title_case, ItemKind, MenuItem, OrderState};
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
	#[error("Invalid pattern: {0}")]
	Pattern(#[from] regex::Error),
}

/// Words that make a message worth scanning for an address.
const ADDRESS_TRIGGERS: &[&str] = &["str", "street", "straße", "platz", "berlin"];
/// Words that mark the line holding the address.
const ADDRESS_MARKERS: &[&str] = &["str", "street", "straße", "platz"];

/// Compiled patterns for customer details.
#[derive(Debug, Clone)]
pub struct Extractor {
	digits: Regex,
	phone_like: Regex,
	non_digit: Regex,
	names: Vec<Regex>,
}

impl Extractor {
	pub fn new() -> Result<Self, ExtractionError> {
		Ok(Self {
			digits: Regex::new(r"\d{7,}")?,
			phone_like: Regex::new(r"[\d\s\-\(\)]{7,}")?,
			non_digit: Regex::new(r"\D")?,
			names: vec![
				Regex::new(r"my name is (\w+)")?,
				Regex::new(r"i'm (\w+)")?,
				Regex::new(r"name: (\w+)")?,
			],
		})
	}

	/// Adds every pizza, topping, extra and drink the message mentions.
	///
	/// Returns how many entries were added.
	pub fn extract_items(&self, catalog: &Catalog, state: &mut OrderState, message_lower: &str) -> usize {
		let mut added = 0;

		added += add_matching(
			&mut state.pizzas,
			catalog.items(ItemKind::Pizza),
			|item| message_lower.contains(&item.name.to_lowercase()),
		);

		for topping in catalog.toppings() {
			let already = state.toppings.iter().any(|t| t.name == topping.name);
			if !already && message_lower.contains(&topping.name.to_lowercase()) {
				tracing::debug!(topping = %topping.name, "Added topping");
				state.toppings.push(topping.clone());
				added += 1;
			}
		}

		// Any single word of an extra's name is enough.
		added += add_matching(&mut state.extras, catalog.items(ItemKind::Extra), |item| {
			item.name
				.to_lowercase()
				.split_whitespace()
				.any(|word| message_lower.contains(word))
		});

		added += add_matching(
			&mut state.drinks,
			catalog.items(ItemKind::Drink),
			|item| message_lower.contains(&item.name.to_lowercase()),
		);

		added
	}

	/// Records preference tags. A tag is skipped when a longer tag containing
	/// it already matched in the same message.
	pub fn extract_preferences(&self, state: &mut OrderState, message_lower: &str) -> Vec<&'static str> {
		let mut matched: Vec<&'static str> = Vec::new();
		for tag in PREFERENCE_TAGS {
			if message_lower.contains(tag) && !matched.iter().any(|m| m.contains(tag)) {
				matched.push(tag);
			}
		}
		for tag in &matched {
			if state.add_pizza_preference(tag) {
				tracing::debug!(preference = %tag, "Added pizza preference");
			}
		}
		matched
	}

	/// Fills unset phone, address and name fields from the message.
	pub fn extract_customer_info(&self, state: &mut OrderState, message: &str) {
		let info = &mut state.customer_info;

		if info.phone.is_none() {
			info.phone = self.phone(message);
			if info.phone.is_some() {
				tracing::debug!("Extracted phone number");
			}
		}

		let message_lower = message.to_lowercase();
		if info.address.is_none() && contains_any(&message_lower, ADDRESS_TRIGGERS) {
			info.address = message
				.split('\n')
				.find(|line| contains_any(&line.to_lowercase(), ADDRESS_MARKERS))
				.map(|line| line.trim().to_string());
			if info.address.is_some() {
				tracing::debug!("Extracted delivery address");
			}
		}

		if info.name.is_none() {
			info.name = self
				.names
				.iter()
				.find_map(|re| re.captures(&message_lower))
				.and_then(|caps| caps.get(1))
				.map(|m| title_case(m.as_str()));
			if let Some(name) = &info.name {
				tracing::debug!(%name, "Extracted customer name");
			}
		}
	}

	fn phone(&self, message: &str) -> Option<String> {
		if let Some(m) = self.digits.find(message) {
			return Some(m.as_str().to_string());
		}
		let candidate = self.phone_like.find(message)?;
		let digits = self.non_digit.replace_all(candidate.as_str(), "");
		(digits.chars().count() >= 7).then(|| digits.into_owned())
	}
}

fn add_matching<F>(recorded: &mut Vec<MenuItem>, candidates: &[MenuItem], mentioned: F) -> usize
where
	F: Fn(&MenuItem) -> bool,
{
	let mut added = 0;
	for item in candidates {
		if mentioned(item) && !recorded.iter().any(|r| r.id == item.id) {
			tracing::debug!(id = %item.id, name = %item.name, "Added item");
			recorded.push(item.clone());
			added += 1;
		}
	}
	added
}
