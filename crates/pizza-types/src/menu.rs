//! Menu reference data types.
//!
//! Menu items are immutable once the catalog is loaded. Prices use
//! `Decimal` so order totals are exact sums.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a priced catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
	Pizza,
	Extra,
	Drink,
}

impl fmt::Display for ItemKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ItemKind::Pizza => f.write_str("pizza"),
			ItemKind::Extra => f.write_str("extra"),
			ItemKind::Drink => f.write_str("drink"),
		}
	}
}

/// A pizza, extra or drink on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
	/// Catalog identifier such as `P1`, `E3` or `B2`.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Dietary type for food ("Vegan (Halal)") or style for beer ("Pilsner").
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	#[serde(with = "rust_decimal::serde::float")]
	pub price: Decimal,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Serving size, drinks only.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub size: Option<String>,
}

impl MenuItem {
	/// Lowercased dietary type, empty when the item has none.
	pub fn category_lower(&self) -> String {
		self.category
			.as_deref()
			.map(str::to_lowercase)
			.unwrap_or_default()
	}
}

/// Topping groups; every topping in a group shares the same price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToppingGroup {
	Cheese,
	Veggies,
	Meats,
}

impl ToppingGroup {
	pub fn label(&self) -> &'static str {
		match self {
			ToppingGroup::Cheese => "Cheese Toppings",
			ToppingGroup::Veggies => "Vegetable Toppings",
			ToppingGroup::Meats => "Meat Toppings",
		}
	}
}

/// A topping resolved against the catalog, price attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topping {
	pub name: String,
	#[serde(with = "rust_decimal::serde::float")]
	pub price: Decimal,
	pub group: ToppingGroup,
}
