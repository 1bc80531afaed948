//! Session reset endpoint.

use crate::server::AppState;
use axum::{
	extract::{Path, State},
	response::Json,
};
use pizza_types::{truncate_id, APIError, ResetResponse};

/// Handles POST /api/reset/{session_id}. Resetting an unknown session
/// succeeds.
pub async fn handle_reset(
	Path(session_id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<ResetResponse>, APIError> {
	state.engine.reset_session(&session_id).await.map_err(|e| {
		tracing::error!(session_id = %truncate_id(&session_id), error = %e, "Session reset failed");
		APIError::InternalServerError {
			error_type: "RESET_FAILED".into(),
			message: "Session could not be reset".into(),
		}
	})?;

	Ok(Json(ResetResponse {
		message: "Session reset successfully".into(),
	}))
}
