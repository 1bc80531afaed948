//! The house menu served when no menu file is configured.

use crate::{MenuData, ToppingEntry, ToppingTable};
use pizza_types::{Decimal, MenuItem};

fn food(id: &str, name: &str, category: &str, cents: i64, description: Option<&str>) -> MenuItem {
	MenuItem {
		id: id.to_string(),
		name: name.to_string(),
		category: Some(category.to_string()),
		price: Decimal::new(cents, 2),
		description: description.map(str::to_string),
		size: None,
	}
}

fn drink(id: &str, name: &str, style: Option<&str>, size: &str, cents: i64) -> MenuItem {
	MenuItem {
		id: id.to_string(),
		name: name.to_string(),
		category: style.map(str::to_string),
		price: Decimal::new(cents, 2),
		description: None,
		size: Some(size.to_string()),
	}
}

fn toppings(cents: i64, names: &[&str]) -> Vec<ToppingEntry> {
	names
		.iter()
		.map(|name| ToppingEntry {
			name: name.to_string(),
			price: Decimal::new(cents, 2),
		})
		.collect()
}

const VEGETARIAN: &str = "Vegetarian (Halal)";
const VEGAN: &str = "Vegan (Halal)";
const NON_VEG: &str = "Non-Veg";

pub(crate) fn menu_data() -> MenuData {
	MenuData {
		pizzas: vec![
			food("P1", "Margherita", VEGETARIAN, 850, Some("Tomato sauce, mozzarella, fresh basil | Contains dairy")),
			food("P2", "Veggie Supreme", VEGETARIAN, 950, Some("Bell peppers, mushrooms, red onions, olives, mozzarella | Contains dairy")),
			food("P3", "Four Cheese", VEGETARIAN, 1000, Some("Mozzarella, cheddar, parmesan, gorgonzola | Contains dairy")),
			food("P4", "Spicy Paneer", VEGETARIAN, 1050, Some("Paneer cubes, green chilies, red onion, tikka sauce, mozzarella | Contains dairy")),
			food("P5", "Mediterranean Garden", VEGETARIAN, 1050, Some("Sun-dried tomatoes, feta, black olives, spinach, red onion")),
			food("P6", "Vegan Delight (Halal)", VEGAN, 900, Some("Vegan cheese, cherry tomatoes, olives, spinach, red onion (Halal) | Contains dairy")),
			food("P7", "Spicy Vegan Inferno (Halal)", VEGAN, 950, Some("Vegan cheese, chili flakes, jalapeños, hot tomato sauce (Halal) | Contains dairy")),
			food("P8", "Vegan Pesto Paradise (Halal)", VEGAN, 1000, Some("Vegan pesto, artichokes, arugula, cherry tomatoes (Halal) | Contains nuts")),
			food("P9", "BBQ Jackfruit", VEGAN, 1050, Some("BBQ jackfruit, vegan cheese, red onions, coriander (Halal) | Contains dairy")),
			food("P10", "Vegan Mushroom Madness (Halal)", VEGAN, 950, Some("Mushrooms, garlic oil, spinach, vegan mozzarella (Halal) | Contains dairy")),
			food("P11", "Pepperoni Feast", NON_VEG, 1050, Some("Tomato sauce, mozzarella, spicy pepperoni | Contains dairy")),
			food("P12", "BBQ Chicken", NON_VEG, 1100, Some("BBQ sauce, grilled chicken, red onions, mozzarella | Contains dairy")),
			food("P13", "Hawaiian", NON_VEG, 1000, Some("Ham, pineapple, mozzarella, tomato sauce | Contains dairy")),
			food("P14", "Chicken Tandoori", NON_VEG, 1150, Some("Tandoori chicken, red onion, bell peppers, spicy yogurt base")),
			food("P15", "Meat Lover's Special", NON_VEG, 1200, Some("Pepperoni, sausage, bacon, ham, mozzarella | Contains dairy")),
			food("P16", "Tuna & Onion", NON_VEG, 1050, Some("Tuna, red onion, capers, mozzarella | Contains dairy")),
		],
		extras: vec![
			food("E1", "Garlic Bread (4 pieces)", VEGETARIAN, 400, Some("Contains gluten")),
			food("E2", "Garlic Bread w/ Cheese", VEGETARIAN, 450, Some("Contains dairy | Contains gluten")),
			food("E3", "French Fries", VEGAN, 350, None),
			food("E4", "Mozzarella Sticks (6 pcs)", VEGETARIAN, 500, Some("Contains dairy")),
			food("E5", "BBQ Chicken Wings (6 pcs)", NON_VEG, 650, None),
			food("E6", "Vegan Cauliflower Bites (Halal)", VEGAN, 500, None),
		],
		drinks: vec![
			drink("D1", "Coca-Cola", None, "330ml", 200),
			drink("D2", "Fanta Orange", None, "330ml", 200),
			drink("D3", "Sprite", None, "330ml", 200),
			drink("D4", "Club Mate", None, "500ml", 250),
			drink("D5", "Sparkling Water", None, "500ml", 150),
			drink("D6", "Still Water", None, "500ml", 150),
			drink("B1", "Berliner Kindl Pils", Some("Pilsner"), "0.5L", 350),
			drink("B2", "BRLO Pale Ale", Some("Craft Pale Ale"), "0.33L", 400),
			drink("B3", "Rothaus Tannenzäpfle", Some("Lager / Pils"), "0.33L", 380),
			drink("B4", "Berliner Weisse (Rot/Grün)", Some("Sour Wheat Beer"), "0.33L", 420),
		],
		toppings: ToppingTable {
			cheese: toppings(
				100,
				&["Extra Mozzarella", "Vegan Cheese", "Parmesan", "Goat Cheese", "Blue Cheese"],
			),
			veggies: toppings(
				80,
				&[
					"Mushrooms",
					"Jalapeños",
					"Spinach",
					"Bell Peppers",
					"Cherry Tomatoes",
					"Onions",
					"Olives",
					"Artichokes",
					"Sun-Dried Tomatoes",
					"Arugula",
				],
			),
			meats: toppings(
				150,
				&["Pepperoni", "Ham", "Chicken (Grilled / Tandoori)", "Bacon", "Tuna", "Sausage"],
			),
		},
	}
}
