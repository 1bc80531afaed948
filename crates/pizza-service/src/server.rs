//! HTTP server for the PizzaBahn chat API.
//!
//! Serves the chat, menu, reset and order endpoints under `/api` plus a
//! `/health` probe.

use axum::{
	extract::DefaultBodyLimit,
	http::{header, HeaderValue, Method},
	routing::{get, post},
	Router,
};
use pizza_config::{ApiConfig, CorsConfig};
use pizza_core::AssistantEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
	cors::{AllowOrigin, CorsLayer},
	timeout::TimeoutLayer,
	trace::TraceLayer,
};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	pub engine: Arc<AssistantEngine>,
}

/// Builds the router with all routes and middleware.
pub fn router(state: AppState, api_config: &ApiConfig) -> Router {
	let api = Router::new()
		.route("/chat", post(crate::apis::chat::handle_chat))
		.route("/menu", get(crate::apis::menu::handle_menu))
		.route("/reset/{session_id}", post(crate::apis::session::handle_reset))
		.route("/orders/{order_id}", get(crate::apis::order::handle_get_order));

	Router::new()
		.nest("/api", api)
		.route("/health", get(health))
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(cors_layer(api_config.cors.as_ref()))
				.layer(TimeoutLayer::new(Duration::from_secs(api_config.timeout_seconds)))
				.layer(DefaultBodyLimit::max(api_config.max_request_size)),
		)
		.with_state(state)
}

/// Permissive unless origins are configured.
fn cors_layer(cors: Option<&CorsConfig>) -> CorsLayer {
	let Some(cors) = cors else {
		return CorsLayer::permissive();
	};

	let origins: Vec<HeaderValue> = cors
		.allowed_origins
		.iter()
		.filter_map(|origin| match HeaderValue::from_str(origin) {
			Ok(value) => Some(value),
			Err(_) => {
				tracing::warn!(%origin, "Ignoring invalid CORS origin");
				None
			},
		})
		.collect();

	CorsLayer::new()
		.allow_origin(AllowOrigin::list(origins))
		.allow_methods([Method::GET, Method::POST])
		.allow_headers([header::CONTENT_TYPE])
}

async fn health() -> &'static str {
	"ok"
}

/// Binds the configured address and serves until the process stops.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<AssistantEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(AppState { engine }, &api_config);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("PizzaBahn API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::factory_registry::build_assistant_from_config;
	use axum::body::{to_bytes, Body};
	use axum::http::{Request, StatusCode};
	use pizza_config::Config;
	use serde_json::{json, Value};
	use tower::ServiceExt;

	fn api_config() -> ApiConfig {
		toml::from_str("enabled = true").unwrap()
	}

	fn app() -> (Router, Arc<AssistantEngine>) {
		let engine = Arc::new(build_assistant_from_config(Config::for_testing()).unwrap());
		let app = router(
			AppState {
				engine: engine.clone(),
			},
			&api_config(),
		);
		(app, engine)
	}

	async fn json_body(response: axum::response::Response) -> Value {
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		serde_json::from_slice(&bytes).unwrap()
	}

	fn post_json(uri: &str, body: Value) -> Request<Body> {
		Request::builder()
			.method("POST")
			.uri(uri)
			.header("content-type", "application/json")
			.body(Body::from(body.to_string()))
			.unwrap()
	}

	#[tokio::test]
	async fn test_health() {
		let (app, _) = app();
		let response = app
			.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		assert_eq!(&bytes[..], b"ok");
	}

	#[tokio::test]
	async fn test_chat_round_trip() {
		let (app, engine) = app();
		let response = app
			.oneshot(post_json(
				"/api/chat",
				json!({"message": "vegan please", "session_id": "web-1", "history": []}),
			))
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::OK);
		let body = json_body(response).await;
		assert_eq!(body["type"], "text");
		assert_eq!(body["session_id"], "web-1");
		assert!(!body["response"].as_str().unwrap().is_empty());

		let state = engine.session_state("web-1").await.unwrap().unwrap();
		assert_eq!(state.step.as_str(), "ask_pizzas");
	}

	#[tokio::test]
	async fn test_chat_assigns_session_id() {
		let (app, _) = app();
		let response = app
			.oneshot(post_json("/api/chat", json!({"message": "hi"})))
			.await
			.unwrap();
		let body = json_body(response).await;
		let session_id = body["session_id"].as_str().unwrap();
		assert!(uuid::Uuid::parse_str(session_id).is_ok());
	}

	#[tokio::test]
	async fn test_chat_menu_reply_type() {
		let (app, _) = app();
		let response = app
			.oneshot(post_json("/api/chat", json!({"message": "menu", "session_id": "m"})))
			.await
			.unwrap();
		let body = json_body(response).await;
		assert_eq!(body["type"], "menu");
		assert!(body["response"].as_str().unwrap().contains("Complete Menu"));
	}

	#[tokio::test]
	async fn test_empty_message_is_bad_request() {
		let (app, _) = app();
		let response = app
			.oneshot(post_json("/api/chat", json!({"message": "   "})))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
		let body = json_body(response).await;
		assert_eq!(body["response"], "Please provide a message.");
		assert_eq!(body["type"], "text");
	}

	#[tokio::test]
	async fn test_menu_endpoint() {
		let (app, _) = app();
		let response = app
			.oneshot(Request::builder().uri("/api/menu").body(Body::empty()).unwrap())
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
		let body = json_body(response).await;
		assert_eq!(body["type"], "menu");
		assert_eq!(body["menu_data"]["pizzas"].as_array().unwrap().len(), 16);
		assert_eq!(body["menu_data"]["pizzas"][0]["id"], "P1");
		assert_eq!(body["menu_data"]["pizzas"][0]["price"], 8.5);
	}

	#[tokio::test]
	async fn test_reset_endpoint() {
		let (app, engine) = app();
		engine.process_message("r1", "vegan").await.unwrap();

		let response = app
			.oneshot(
				Request::builder()
					.method("POST")
					.uri("/api/reset/r1")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
		let body = json_body(response).await;
		assert_eq!(body["message"], "Session reset successfully");
		assert!(engine.session_state("r1").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_unknown_order_is_not_found() {
		let (app, _) = app();
		let response = app
			.oneshot(
				Request::builder()
					.uri("/api/orders/abcd1234")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::NOT_FOUND);
		let body = json_body(response).await;
		assert_eq!(body["error"], "ORDER_NOT_FOUND");
	}

	#[test]
	fn test_cors_layer_from_config() {
		// Both shapes must build without panicking.
		let _ = cors_layer(None);
		let _ = cors_layer(Some(&CorsConfig {
			allowed_origins: vec!["http://localhost:3000".into(), "bad\norigin".into()],
		}));
	}
}
