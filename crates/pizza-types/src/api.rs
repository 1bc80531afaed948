//! API types for the PizzaBahn HTTP API.
//!
//! This module defines the request and response types for the chat, menu,
//! session reset and order lookup endpoints, plus the structured error type
//! every handler returns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single prior turn as sent by the web client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
	pub role: String,
	pub content: String,
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
	#[serde(default)]
	pub message: String,
	/// Session identifier; a fresh one is assigned when absent.
	#[serde(default)]
	pub session_id: Option<String>,
	/// Client-side transcript. Accepted for compatibility, the server keeps
	/// its own state.
	#[serde(default)]
	pub history: Vec<HistoryEntry>,
}

/// How the client should render a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyType {
	Text,
	Menu,
}

/// Response body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
	pub response: String,
	#[serde(rename = "type")]
	pub reply_type: ReplyType,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
}

/// Response body for `GET /api/menu`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuResponse {
	pub menu_data: serde_json::Value,
	#[serde(rename = "type")]
	pub reply_type: ReplyType,
}

/// Response body for `POST /api/reset/{session_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResponse {
	pub message: String,
}

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
	/// Additional error context
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum APIError {
	/// Requested resource does not exist (404)
	NotFound { error_type: String, message: String },
	/// Internal server error (500)
	InternalServerError { error_type: String, message: String },
}

impl APIError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			APIError::NotFound { .. } => 404,
			APIError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		let (error_type, message) = match self {
			APIError::NotFound { error_type, message }
			| APIError::InternalServerError { error_type, message } => (error_type, message),
		};
		ErrorResponse {
			error: error_type.clone(),
			message: message.clone(),
			details: None,
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			APIError::NotFound { message, .. } => write!(f, "Not Found: {}", message),
			APIError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for APIError {}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for APIError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		(status, Json(self.to_error_response())).into_response()
	}
}
