//! Utility functions for common operations.

pub mod formatting;

pub use formatting::{format_price, title_case, truncate_id};
