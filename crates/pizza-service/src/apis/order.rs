//! Order lookup endpoint.

use crate::server::AppState;
use axum::{
	extract::{Path, State},
	response::Json,
};
use pizza_types::{APIError, OrderRecord};

/// Handles GET /api/orders/{order_id} requests.
pub async fn handle_get_order(
	Path(order_id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<OrderRecord>, APIError> {
	match state.engine.get_order(&order_id).await {
		Ok(Some(record)) => Ok(Json(record)),
		Ok(None) => Err(APIError::NotFound {
			error_type: "ORDER_NOT_FOUND".into(),
			message: format!("Order {} not found", order_id),
		}),
		Err(e) => {
			tracing::error!(%order_id, error = %e, "Order lookup failed");
			Err(APIError::InternalServerError {
				error_type: "INTERNAL_ERROR".into(),
				message: "Order lookup failed".into(),
			})
		},
	}
}
