//! Request handlers for the HTTP API.

pub mod chat;
pub mod menu;
pub mod order;
pub mod session;
