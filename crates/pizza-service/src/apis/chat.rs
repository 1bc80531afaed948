//! Chat endpoint.
//!
//! Every message is one turn of the engine. Failures never reach the client
//! raw: bad input gets a 400 with a prompt to retry, anything else a 500
//! apology, both in the regular chat response shape.

use crate::server::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use pizza_core::EngineError;
use pizza_types::{truncate_id, ChatRequest, ChatResponse, ReplyType};

pub const EMPTY_MESSAGE_REPLY: &str = "Please provide a message.";
pub const TECHNICAL_DIFFICULTIES_REPLY: &str =
	"Sorry, I'm having technical difficulties. Please try again!";

type ChatResult = Result<Json<ChatResponse>, (StatusCode, Json<ChatResponse>)>;

fn failure(status: StatusCode, text: &str) -> (StatusCode, Json<ChatResponse>) {
	(
		status,
		Json(ChatResponse {
			response: text.to_string(),
			reply_type: ReplyType::Text,
			session_id: None,
		}),
	)
}

/// Handles POST /api/chat requests.
pub async fn handle_chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> ChatResult {
	let message = request.message.trim();
	if message.is_empty() {
		return Err(failure(StatusCode::BAD_REQUEST, EMPTY_MESSAGE_REPLY));
	}

	let session_id = request
		.session_id
		.filter(|id| !id.trim().is_empty())
		.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

	tracing::debug!(
		session_id = %truncate_id(&session_id),
		message = %message.chars().take(50).collect::<String>(),
		"Received message"
	);

	match state.engine.process_message(&session_id, message).await {
		Ok(reply) => Ok(Json(ChatResponse {
			response: reply.text,
			reply_type: reply.reply_type,
			session_id: Some(session_id),
		})),
		Err(EngineError::InvalidInput(_)) => Err(failure(StatusCode::BAD_REQUEST, EMPTY_MESSAGE_REPLY)),
		Err(e) => {
			tracing::error!(session_id = %truncate_id(&session_id), error = %e, "Chat turn failed");
			Err(failure(
				StatusCode::INTERNAL_SERVER_ERROR,
				TECHNICAL_DIFFICULTIES_REPLY,
			))
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::factory_registry::build_assistant_from_config;
	use pizza_config::Config;
	use std::sync::Arc;

	fn state() -> AppState {
		AppState {
			engine: Arc::new(build_assistant_from_config(Config::for_testing()).unwrap()),
		}
	}

	fn request(message: &str, session_id: Option<&str>) -> Json<ChatRequest> {
		Json(ChatRequest {
			message: message.to_string(),
			session_id: session_id.map(str::to_string),
			history: vec![],
		})
	}

	#[tokio::test]
	async fn test_blank_session_id_is_replaced() {
		let Json(response) = handle_chat(State(state()), request("hello", Some("  ")))
			.await
			.unwrap();
		let id = response.session_id.unwrap();
		assert_eq!(id.len(), 36);
	}

	#[tokio::test]
	async fn test_conversation_keeps_session() {
		let state = state();
		handle_chat(State(state.clone()), request("vegetarian", Some("c1")))
			.await
			.unwrap();
		let Json(response) = handle_chat(State(state.clone()), request("Four Cheese", Some("c1")))
			.await
			.unwrap();

		assert_eq!(response.session_id.as_deref(), Some("c1"));
		let saved = state.engine.session_state("c1").await.unwrap().unwrap();
		assert_eq!(saved.pizzas[0].id, "P3");
	}

	#[tokio::test]
	async fn test_empty_message() {
		let (status, Json(body)) = handle_chat(State(state()), request("", None)).await.unwrap_err();
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body.response, EMPTY_MESSAGE_REPLY);
		assert!(body.session_id.is_none());
	}
}
