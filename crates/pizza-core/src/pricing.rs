//! Order totals.

use pizza_types::{Decimal, OrderState};

/// Sum of every pizza, extra, drink and topping price in the order.
pub fn order_total(state: &OrderState) -> Decimal {
	let items = state
		.pizzas
		.iter()
		.chain(&state.extras)
		.chain(&state.drinks)
		.map(|item| item.price);
	let toppings = state.toppings.iter().map(|topping| topping.price);
	items.chain(toppings).sum::<Decimal>().round_dp(2)
}

#[cfg(test)]
mod tests {
	use super::*;
	use pizza_menu::Catalog;
	use pizza_types::ItemKind;

	#[test]
	fn test_empty_order_is_zero() {
		assert_eq!(order_total(&OrderState::new()), Decimal::ZERO);
	}

	#[test]
	fn test_total_is_exact_sum() {
		let catalog = Catalog::builtin();
		let mut state = OrderState::new();
		for (kind, id) in [
			(ItemKind::Pizza, "P1"),
			(ItemKind::Pizza, "P12"),
			(ItemKind::Extra, "E3"),
			(ItemKind::Drink, "B3"),
			(ItemKind::Drink, "D5"),
		] {
			let item = catalog.find_by_id(kind, id).unwrap().clone();
			match kind {
				ItemKind::Pizza => state.pizzas.push(item),
				ItemKind::Extra => state.extras.push(item),
				ItemKind::Drink => state.drinks.push(item),
			}
		}
		state.toppings.push(catalog.find_topping("Jalapeños").unwrap().clone());
		state.toppings.push(catalog.find_topping("Goat Cheese").unwrap().clone());

		// 8.50 + 11.00 + 3.50 + 3.80 + 1.50 + 0.80 + 1.00
		let total = order_total(&state);
		assert_eq!(total, Decimal::new(3010, 2));
		assert_eq!(order_total(&state), total);
	}
}
