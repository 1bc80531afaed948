//! Menu catalog for the PizzaBahn assistant.
//!
//! The catalog is immutable reference data loaded once at startup, either
//! the built-in house menu or a TOML file of the same shape. It answers the
//! lookups the extraction engine needs, filters by dietary preference and
//! renders the customer-facing menu text.

use pizza_types::{Decimal, ItemKind, MenuItem, Topping, ToppingGroup};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

mod builtin;
mod render;

/// Errors that can occur while loading a menu.
#[derive(Debug, Error)]
pub enum MenuError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Menu parse error: {0}")]
	Parse(String),
	#[error("Invalid menu: {0}")]
	Invalid(String),
}

/// A topping as written in the menu source; the group comes from the table
/// it is listed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToppingEntry {
	pub name: String,
	#[serde(with = "rust_decimal::serde::float")]
	pub price: Decimal,
}

/// Toppings grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToppingTable {
	#[serde(default)]
	pub cheese: Vec<ToppingEntry>,
	#[serde(default)]
	pub veggies: Vec<ToppingEntry>,
	#[serde(default)]
	pub meats: Vec<ToppingEntry>,
}

impl ToppingTable {
	/// Groups in display order.
	pub fn groups(&self) -> [(ToppingGroup, &[ToppingEntry]); 3] {
		[
			(ToppingGroup::Cheese, self.cheese.as_slice()),
			(ToppingGroup::Veggies, self.veggies.as_slice()),
			(ToppingGroup::Meats, self.meats.as_slice()),
		]
	}
}

/// Raw menu content. This is also the JSON shape served by `GET /api/menu`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuData {
	pub pizzas: Vec<MenuItem>,
	#[serde(default)]
	pub extras: Vec<MenuItem>,
	#[serde(default)]
	pub drinks: Vec<MenuItem>,
	#[serde(default)]
	pub toppings: ToppingTable,
}

/// Items left after applying a dietary filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredMenu<'a> {
	pub pizzas: Vec<&'a MenuItem>,
	pub extras: Vec<&'a MenuItem>,
	pub drinks: Vec<&'a MenuItem>,
}

/// Read-only menu catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
	data: MenuData,
	toppings: Vec<Topping>,
}

impl Catalog {
	/// The house menu: 16 pizzas, 6 extras, 10 drinks and 21 toppings.
	pub fn builtin() -> Self {
		Self::build(builtin::menu_data())
	}

	/// Builds a catalog from menu content after validating it.
	pub fn from_data(data: MenuData) -> Result<Self, MenuError> {
		validate(&data)?;
		Ok(Self::build(data))
	}

	/// Parses a TOML menu.
	pub fn from_toml(content: &str) -> Result<Self, MenuError> {
		let data: MenuData =
			toml::from_str(content).map_err(|e| MenuError::Parse(e.message().to_string()))?;
		Self::from_data(data)
	}

	/// Loads a TOML menu from disk.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, MenuError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path)?;
		let catalog = Self::from_toml(&content)?;
		tracing::info!(
			path = %path.display(),
			pizzas = catalog.data.pizzas.len(),
			extras = catalog.data.extras.len(),
			drinks = catalog.data.drinks.len(),
			toppings = catalog.toppings.len(),
			"Loaded menu"
		);
		Ok(catalog)
	}

	fn build(data: MenuData) -> Self {
		let toppings = data
			.toppings
			.groups()
			.into_iter()
			.flat_map(|(group, entries)| {
				entries.iter().map(move |entry| Topping {
					name: entry.name.clone(),
					price: entry.price,
					group,
				})
			})
			.collect();
		Self { data, toppings }
	}

	pub fn data(&self) -> &MenuData {
		&self.data
	}

	/// All items of one kind, in menu order.
	pub fn items(&self, kind: ItemKind) -> &[MenuItem] {
		match kind {
			ItemKind::Pizza => &self.data.pizzas,
			ItemKind::Extra => &self.data.extras,
			ItemKind::Drink => &self.data.drinks,
		}
	}

	/// Case-insensitive lookup by catalog id.
	pub fn find_by_id(&self, kind: ItemKind, id: &str) -> Option<&MenuItem> {
		self.items(kind)
			.iter()
			.find(|item| item.id.eq_ignore_ascii_case(id))
	}

	/// Case-insensitive exact lookup by name.
	pub fn find_by_name(&self, kind: ItemKind, name: &str) -> Option<&MenuItem> {
		let wanted = name.to_lowercase();
		self.items(kind)
			.iter()
			.find(|item| item.name.to_lowercase() == wanted)
	}

	/// Every topping with its group and price, cheese first.
	pub fn toppings(&self) -> &[Topping] {
		&self.toppings
	}

	/// Case-insensitive exact lookup across all topping groups.
	pub fn find_topping(&self, name: &str) -> Option<&Topping> {
		let wanted = name.to_lowercase();
		self.toppings
			.iter()
			.find(|topping| topping.name.to_lowercase() == wanted)
	}

	pub fn topping_price(&self, name: &str) -> Option<Decimal> {
		self.find_topping(name).map(|topping| topping.price)
	}

	/// Narrows pizzas and extras to a dietary preference.
	///
	/// A need mentioning "vegan" keeps vegan items; one mentioning
	/// "vegetarian" keeps vegetarian and vegan items; anything else keeps
	/// everything. Drinks are never filtered.
	pub fn filter_by_dietary(&self, need: &str) -> FilteredMenu<'_> {
		let need = need.to_lowercase();
		let wants_vegan = need.contains("vegan");
		let wants_vegetarian = need.contains("vegetarian");

		let keep = |item: &&MenuItem| {
			let category = item.category_lower();
			(wants_vegan && category.contains("vegan"))
				|| (wants_vegetarian
					&& (category.contains("vegetarian") || category.contains("vegan")))
				|| (!wants_vegan && !wants_vegetarian)
		};

		FilteredMenu {
			pizzas: self.data.pizzas.iter().filter(keep).collect(),
			extras: self.data.extras.iter().filter(keep).collect(),
			drinks: self.data.drinks.iter().collect(),
		}
	}
}

impl Default for Catalog {
	fn default() -> Self {
		Self::builtin()
	}
}

fn validate(data: &MenuData) -> Result<(), MenuError> {
	if data.pizzas.is_empty() {
		return Err(MenuError::Invalid("menu must list at least one pizza".into()));
	}

	let mut seen_ids = HashSet::new();
	let sections = [
		(ItemKind::Pizza, &data.pizzas),
		(ItemKind::Extra, &data.extras),
		(ItemKind::Drink, &data.drinks),
	];
	for (kind, items) in sections {
		for item in items {
			if item.id.trim().is_empty() || item.name.trim().is_empty() {
				return Err(MenuError::Invalid(format!(
					"every {} needs an id and a name",
					kind
				)));
			}
			if !seen_ids.insert(item.id.to_uppercase()) {
				return Err(MenuError::Invalid(format!("duplicate id '{}'", item.id)));
			}
			if item.price.is_sign_negative() {
				return Err(MenuError::Invalid(format!(
					"{} '{}' has a negative price",
					kind, item.id
				)));
			}
			if kind != ItemKind::Drink && item.category.is_none() {
				return Err(MenuError::Invalid(format!(
					"{} '{}' needs a dietary type",
					kind, item.id
				)));
			}
		}
	}

	for (group, entries) in data.toppings.groups() {
		if let Some(first) = entries.first() {
			if entries.iter().any(|entry| entry.price != first.price) {
				return Err(MenuError::Invalid(format!(
					"all {} must share one price",
					group.label()
				)));
			}
			if first.price.is_sign_negative() {
				return Err(MenuError::Invalid(format!(
					"{} have a negative price",
					group.label()
				)));
			}
		}
	}

	Ok(())
}
