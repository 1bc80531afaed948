//! Customer-facing menu text.

use crate::Catalog;
use pizza_types::{format_price, MenuItem};
use std::fmt::Write;

const RULE_WIDTH: usize = 51;

fn banner(out: &mut String, title: &str) {
	let rule = "═".repeat(RULE_WIDTH);
	let _ = write!(out, "{rule}\n {title} \n{rule}\n\n");
}

fn capitalize(word: &str) -> String {
	let lower = word.to_lowercase();
	let mut chars = lower.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

fn item_heading(out: &mut String, index: usize, item: &MenuItem) {
	let _ = writeln!(
		out,
		"**{:2}. {}** - {}",
		index,
		item.name,
		format_price(item.price)
	);
}

fn typed_items<'a>(out: &mut String, items: impl IntoIterator<Item = &'a MenuItem>, note_label: &str) {
	for (i, item) in items.into_iter().enumerate() {
		item_heading(out, i + 1, item);
		if let Some(category) = &item.category {
			let _ = writeln!(out, "     Type: {}", category);
		}
		if let Some(description) = &item.description {
			let _ = writeln!(out, "     {}: {}", note_label, description);
		}
		out.push('\n');
	}
}

fn described_items<'a>(out: &mut String, items: impl IntoIterator<Item = &'a MenuItem>) {
	for (i, item) in items.into_iter().enumerate() {
		item_heading(out, i + 1, item);
		if let Some(description) = &item.description {
			let _ = writeln!(out, "     {}", description);
		}
		out.push('\n');
	}
}

impl Catalog {
	/// Renders the menu as markdown-flavoured text.
	///
	/// With a dietary need the pizzas and extras are filtered and listed with
	/// their type; without one the pizzas are grouped into vegetarian, vegan
	/// and non-vegetarian sections. Drinks always close the menu, soft drinks
	/// before beer.
	pub fn render_menu(&self, need: Option<&str>) -> String {
		let mut out = String::new();

		match need {
			Some(need) => {
				let menu = self.filter_by_dietary(need);
				let _ = write!(out, "**PizzaBahn Menu ({} Options)** \n\n", capitalize(need));
				banner(&mut out, "**PIZZAS**");
				typed_items(&mut out, menu.pizzas, "Description");
				banner(&mut out, "**EXTRAS & SIDES**");
				typed_items(&mut out, menu.extras, "Note");
			},
			None => {
				out.push_str(" **PizzaBahn Complete Menu** \n\n");
				let sections = [
					("**VEGETARIAN PIZZAS**", "Vegetarian"),
					("**VEGAN PIZZAS**", "Vegan"),
					("**NON-VEGETARIAN PIZZAS**", "Non-Veg"),
				];
				for (title, marker) in sections {
					let pizzas: Vec<_> = self
						.data()
						.pizzas
						.iter()
						.filter(|p| p.category.as_deref().is_some_and(|c| c.contains(marker)))
						.collect();
					if !pizzas.is_empty() {
						banner(&mut out, title);
						described_items(&mut out, pizzas);
					}
				}
				banner(&mut out, "**EXTRAS & SIDES**");
				typed_items(&mut out, &self.data().extras, "Note");
			},
		}

		banner(&mut out, "**DRINKS & BEVERAGES**");
		let (beers, soft_drinks): (Vec<_>, Vec<_>) =
			self.data().drinks.iter().partition(|d| d.id.starts_with('B'));

		if !soft_drinks.is_empty() {
			out.push_str("**Soft Drinks & Water:**\n");
			for (i, drink) in soft_drinks.iter().enumerate() {
				let _ = write!(out, "  {:2}. {}", i + 1, drink.name);
				if let Some(size) = &drink.size {
					let _ = write!(out, " ({})", size);
				}
				let _ = writeln!(out, " - {}", format_price(drink.price));
			}
			out.push('\n');
		}

		if !beers.is_empty() {
			out.push_str("**Beer Selection:**\n");
			for (i, beer) in beers.iter().enumerate() {
				let _ = write!(out, "  {:2}. {}", i + 1, beer.name);
				if let Some(style) = &beer.category {
					let _ = write!(out, " ({})", style);
				}
				if let Some(size) = &beer.size {
					let _ = write!(out, " ({})", size);
				}
				let _ = writeln!(out, " - {}", format_price(beer.price));
			}
		}

		let rule = "═".repeat(RULE_WIDTH);
		let _ = write!(
			out,
			"\n{rule}\n **Tip:** Just tell me the name or number of what you'd like!\n{rule}"
		);
		out
	}

	/// Toppings grouped with their per-topping surcharge, for the system
	/// instruction.
	pub fn toppings_overview(&self) -> String {
		let mut out = String::from("AVAILABLE TOPPINGS:\n");
		for (group, entries) in self.data().toppings.groups() {
			let Some(first) = entries.first() else {
				continue;
			};
			let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
			let _ = write!(
				out,
				"**{}** (+{} each):\n- {}\n\n",
				group.label(),
				format_price(first.price),
				names.join(", ")
			);
		}
		out.truncate(out.trim_end().len());
		out
	}
}

#[cfg(test)]
mod tests {
	use crate::Catalog;

	#[test]
	fn test_filtered_menu_title_and_sections() {
		let text = Catalog::builtin().render_menu(Some("vegan"));
		assert!(text.starts_with("**PizzaBahn Menu (Vegan Options)**"));
		assert!(text.contains("**PIZZAS**"));
		assert!(text.contains("** 1. Vegan Delight (Halal)** - €9.00"));
		assert!(text.contains("     Type: Vegan (Halal)"));
		assert!(!text.contains("Margherita"));
		assert!(text.contains("**EXTRAS & SIDES**"));
		assert!(text.contains("French Fries"));
		assert!(!text.contains("Garlic Bread"));
	}

	#[test]
	fn test_complete_menu_groups_pizzas() {
		let text = Catalog::builtin().render_menu(None);
		assert!(text.starts_with(" **PizzaBahn Complete Menu**"));
		let vegetarian = text.find("**VEGETARIAN PIZZAS**").unwrap();
		let vegan = text.find("**VEGAN PIZZAS**").unwrap();
		let non_veg = text.find("**NON-VEGETARIAN PIZZAS**").unwrap();
		assert!(vegetarian < vegan && vegan < non_veg);
		assert!(text.contains("** 6. Tuna & Onion** - €10.50"));
	}

	#[test]
	fn test_drinks_split_soft_and_beer() {
		let text = Catalog::builtin().render_menu(None);
		let soft = text.find("**Soft Drinks & Water:**").unwrap();
		let beer = text.find("**Beer Selection:**").unwrap();
		assert!(soft < beer);
		assert!(text.contains("   1. Coca-Cola (330ml) - €2.00"));
		assert!(text.contains("   3. Rothaus Tannenzäpfle (Lager / Pils) (0.33L) - €3.80"));
		assert!(text.ends_with(&"═".repeat(51)));
		assert!(text.contains("**Tip:**"));
	}

	#[test]
	fn test_rendering_is_deterministic() {
		let catalog = Catalog::builtin();
		assert_eq!(catalog.render_menu(Some("none")), catalog.render_menu(Some("none")));
		assert!(catalog
			.render_menu(Some("none"))
			.starts_with("**PizzaBahn Menu (None Options)**"));
	}

	#[test]
	fn test_toppings_overview() {
		let text = Catalog::builtin().toppings_overview();
		assert!(text.starts_with("AVAILABLE TOPPINGS:"));
		assert!(text.contains("**Cheese Toppings** (+€1.00 each):\n- Extra Mozzarella, Vegan Cheese"));
		assert!(text.contains("**Vegetable Toppings** (+€0.80 each):"));
		assert!(text.ends_with("Tuna, Sausage"));
	}
}
