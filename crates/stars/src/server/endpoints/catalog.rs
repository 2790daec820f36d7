use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::engine::{Course, SectionId};
use crate::server::types::enroll_error_response;
use crate::types::AppState;

fn course_json(course: &Course) -> serde_json::Value {
    let sections: Vec<_> = course
        .sections()
        .map(|section| {
            json!({
                "id": section.id,
                "capacity": section.capacity(),
                "available_seats": section.available_seats(),
                "waitlist_length": section.waitlist_len(),
                "lessons": serde_json::to_value(&section.lessons).unwrap_or_default(),
            })
        })
        .collect();
    json!({
        "code": course.code,
        "name": course.name,
        "school": course.school,
        "load_weight": course.load_weight,
        "sections": sections,
    })
}

/// GET /courses
/// Returns the full catalog with per-section vacancy counts
pub async fn get_courses(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /courses");

    let engine = s.engine.read().await;
    let courses: Vec<_> = engine.catalog().courses().map(course_json).collect();
    (StatusCode::OK, Json(courses)).into_response()
}

/// GET /course_info/:code
/// Returns one catalog entry with per-section vacancy counts
pub async fn get_course_info(
    Path(code): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /course_info/{}", code);

    let engine = s.engine.read().await;
    match engine.catalog().course(&code) {
        Ok(course) => (StatusCode::OK, Json(course_json(course))).into_response(),
        Err(e) => enroll_error_response(&e),
    }
}

/// Body for a capacity edit.
#[derive(Debug, Deserialize)]
pub struct CapacityRequest {
    pub course: String,
    pub section: SectionId,
    pub capacity: u32,
}

/// POST /set_capacity
///
/// Admin capacity edit. Routed through the engine because lowering capacity
/// below current occupancy must be rejected.
pub async fn post_set_capacity(
    State(s): State<Arc<AppState>>,
    Json(req): Json<CapacityRequest>,
) -> Response {
    info!(
        "POST /set_capacity {} index {} -> {}",
        req.course, req.section, req.capacity
    );

    let mut engine = s.engine.write().await;
    match engine.set_capacity(&req.course, req.section, req.capacity) {
        Ok(()) => {
            s.snapshot(&engine);
            (StatusCode::OK, Json(json!({"status": "updated"}))).into_response()
        }
        Err(e) => enroll_error_response(&e),
    }
}
