//! Order state types for the ordering workflow.
//!
//! `OrderState` is the per-session record the engine mutates turn by turn.
//! `OrderRecord` is the immutable artifact emitted once the customer
//! confirms.

use crate::{DietaryNeed, MenuItem, Step, Topping};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Contact and delivery details collected from the customer.
///
/// Each field is filled at most once; later messages never overwrite it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
	pub name: Option<String>,
	pub phone: Option<String>,
	pub address: Option<String>,
}

impl CustomerInfo {
	pub fn has_contact(&self) -> bool {
		self.name.is_some() && self.phone.is_some()
	}
}

/// Mutable order state for a single conversation session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderState {
	/// Current workflow step.
	pub step: Step,
	pub dietary_needs: Option<DietaryNeed>,
	pub pizzas: Vec<MenuItem>,
	pub toppings: Vec<Topping>,
	pub pizza_preferences: Vec<String>,
	pub extras: Vec<MenuItem>,
	pub drinks: Vec<MenuItem>,
	pub customer_info: CustomerInfo,
	/// Total stored at summary/confirmation time.
	#[serde(with = "rust_decimal::serde::float")]
	pub total_price: Decimal,
	/// Set when a menu request moved the session past the opening steps.
	#[serde(default)]
	pub menu_shown: bool,
}

impl OrderState {
	pub fn new() -> Self {
		Self::default()
	}

	/// True when everything needed to place an order has been collected.
	///
	/// A missing dietary preference counts as "no restriction".
	pub fn has_all_required_info(&self) -> bool {
		self.missing_info().is_empty()
	}

	/// Human-readable names of the required fields still missing.
	pub fn missing_info(&self) -> Vec<&'static str> {
		let mut missing = Vec::new();
		if self.pizzas.is_empty() {
			missing.push("pizza selection");
		}
		if self.customer_info.name.is_none() {
			missing.push("name");
		}
		if self.customer_info.phone.is_none() {
			missing.push("phone number");
		}
		if self.customer_info.address.is_none() {
			missing.push("delivery address");
		}
		missing
	}

	/// Adds a preference tag unless it is already recorded.
	pub fn add_pizza_preference(&mut self, preference: &str) -> bool {
		if self.pizza_preferences.iter().any(|p| p == preference) {
			return false;
		}
		self.pizza_preferences.push(preference.to_string());
		true
	}
}

/// Items section of a confirmed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItems {
	pub pizzas: Vec<MenuItem>,
	pub extras: Vec<MenuItem>,
	pub drinks: Vec<MenuItem>,
	pub toppings: Vec<Topping>,
}

/// Status of an emitted order record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	Confirmed,
}

/// Structured order emitted when the customer confirms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
	/// Short unique identifier.
	pub order_id: String,
	/// RFC 3339 creation time.
	pub timestamp: String,
	pub customer: CustomerInfo,
	pub items: OrderItems,
	#[serde(with = "rust_decimal::serde::float")]
	pub total: Decimal,
	pub status: OrderStatus,
}

impl OrderRecord {
	/// Builds a confirmed record from the session state.
	pub fn confirmed(order_id: String, timestamp: String, state: &OrderState) -> Self {
		Self {
			order_id,
			timestamp,
			customer: state.customer_info.clone(),
			items: OrderItems {
				pizzas: state.pizzas.clone(),
				extras: state.extras.clone(),
				drinks: state.drinks.clone(),
				toppings: state.toppings.clone(),
			},
			total: state.total_price,
			status: OrderStatus::Confirmed,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_new_state_starts_at_greeting() {
		let state = OrderState::new();
		assert_eq!(state.step, Step::Greeting);
		assert!(state.dietary_needs.is_none());
		assert!(state.pizzas.is_empty());
		assert_eq!(state.total_price, Decimal::ZERO);
	}

	#[test]
	fn test_missing_info_lists_required_fields() {
		let mut state = OrderState::new();
		assert_eq!(
			state.missing_info(),
			vec!["pizza selection", "name", "phone number", "delivery address"]
		);

		state.customer_info.name = Some("Anna".into());
		state.customer_info.phone = Some("030123456789".into());
		assert_eq!(state.missing_info(), vec!["pizza selection", "delivery address"]);
		assert!(!state.has_all_required_info());
	}

	#[test]
	fn test_pizza_preferences_are_deduplicated() {
		let mut state = OrderState::new();
		assert!(state.add_pizza_preference("spicy"));
		assert!(!state.add_pizza_preference("spicy"));
		assert_eq!(state.pizza_preferences, vec!["spicy".to_string()]);
	}

	#[test]
	fn test_record_status_serializes_as_confirmed() {
		let record = OrderRecord::confirmed(
			"abcd1234".into(),
			"2024-01-01T00:00:00+00:00".into(),
			&OrderState::new(),
		);
		let json = serde_json::to_value(&record).unwrap();
		assert_eq!(json["status"], "confirmed");
		assert_eq!(json["order_id"], "abcd1234");
	}
}
