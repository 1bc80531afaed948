//! Menu endpoint.

use crate::server::AppState;
use axum::{extract::State, response::Json};
use pizza_types::{APIError, MenuResponse, ReplyType};

/// Handles GET /api/menu requests with the raw catalog data.
pub async fn handle_menu(State(state): State<AppState>) -> Result<Json<MenuResponse>, APIError> {
	let menu_data = serde_json::to_value(state.engine.catalog().data()).map_err(|e| {
		tracing::error!(error = %e, "Failed to serialize menu");
		APIError::InternalServerError {
			error_type: "MENU_SERIALIZATION".into(),
			message: "Menu is unavailable".into(),
		}
	})?;

	Ok(Json(MenuResponse {
		menu_data,
		reply_type: ReplyType::Menu,
	}))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::factory_registry::build_assistant_from_config;
	use pizza_config::Config;
	use std::sync::Arc;

	#[tokio::test]
	async fn test_menu_lists_every_section() {
		let state = AppState {
			engine: Arc::new(build_assistant_from_config(Config::for_testing()).unwrap()),
		};
		let Json(response) = handle_menu(State(state)).await.unwrap();
		let data = &response.menu_data;
		assert_eq!(data["extras"].as_array().unwrap().len(), 6);
		assert_eq!(data["drinks"].as_array().unwrap().len(), 10);
		assert_eq!(data["toppings"]["cheese"].as_array().unwrap().len(), 5);
		assert_eq!(data["drinks"][6]["type"], "Pilsner");
	}
}
