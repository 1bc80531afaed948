//! Storage-related types for the assistant.

use std::str::FromStr;

/// Storage namespaces for the different data collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Per-session order state
	Sessions,
	/// Confirmed order records
	Orders,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Sessions => "sessions",
			StorageKey::Orders => "orders",
		}
	}

	/// Returns an iterator over all StorageKey variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[Self::Sessions, Self::Orders].into_iter()
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"sessions" => Ok(Self::Sessions),
			"orders" => Ok(Self::Orders),
			_ => Err(()),
		}
	}
}

impl From<StorageKey> for &'static str {
	fn from(key: StorageKey) -> Self {
		key.as_str()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_every_key_parses_back() {
		for key in StorageKey::all() {
			assert_eq!(key.as_str().parse::<StorageKey>(), Ok(key));
		}
		assert!("quotes".parse::<StorageKey>().is_err());
	}
}
