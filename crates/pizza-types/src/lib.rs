//! Common types module for the PizzaBahn ordering assistant.
//!
//! This module defines the core data types shared by every crate of the
//! workspace: workflow steps, menu items, per-session order state, the
//! confirmed order record and the HTTP API payloads.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Event types published by the assistant engine.
pub mod events;
/// Menu reference data types.
pub mod menu;
/// Per-session order state and the confirmed order record.
pub mod order;
/// Implementation registry trait for pluggable backends.
pub mod registry;
/// Redacting string wrapper for API keys.
pub mod secret_string;
/// Workflow steps and dietary preferences.
pub mod step;
/// Storage namespaces.
pub mod storage;
/// Display helpers for ids, prices and names.
pub mod utils;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

pub use api::*;
pub use events::*;
pub use menu::*;
pub use order::*;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use step::{DietaryNeed, Step};
pub use storage::*;
pub use utils::{format_price, title_case, truncate_id};
pub use validation::*;

/// Re-export so downstream crates agree on the money type.
pub use rust_decimal::Decimal;
