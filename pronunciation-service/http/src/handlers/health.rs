use axum::{extract::State, response::Json};
use pronunciation_application::HealthResponse;

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.health.health().await)
}
