//! String formatting utilities.
//!
//! Display helpers for session identifiers, prices and customer names.

use rust_decimal::Decimal;

/// Truncates an identifier for log output.
///
/// Shows only the first 8 characters followed by ".." for longer strings.
pub fn truncate_id(id: &str) -> String {
	match id.char_indices().nth(8) {
		Some((idx, _)) => format!("{}..", &id[..idx]),
		None => id.to_string(),
	}
}

/// Formats a price in euros with two decimals, e.g. `€8.50`.
pub fn format_price(price: Decimal) -> String {
	format!("€{:.2}", price)
}

/// Title-cases a word: a letter is uppercased when it does not follow
/// another letter, every other letter is lowercased.
///
/// `"anna"` becomes `"Anna"`, `"mary2b"` becomes `"Mary2B"`.
pub fn title_case(word: &str) -> String {
	let mut out = String::with_capacity(word.len());
	let mut prev_is_alpha = false;
	for c in word.chars() {
		if c.is_alphabetic() {
			if prev_is_alpha {
				out.extend(c.to_lowercase());
			} else {
				out.extend(c.to_uppercase());
			}
			prev_is_alpha = true;
		} else {
			out.push(c);
			prev_is_alpha = false;
		}
	}
	out
}
