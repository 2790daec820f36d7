use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::types::AppState;

/// GET /health
pub async fn get_health(State(s): State<Arc<AppState>>) -> Response {
    let engine = s.engine.read().await;
    let body = json!({
        "status": "ok",
        "courses": engine.catalog().courses().count(),
        "students": engine.students().count(),
        "max_load": engine.max_load(),
    });
    (StatusCode::OK, Json(body)).into_response()
}
