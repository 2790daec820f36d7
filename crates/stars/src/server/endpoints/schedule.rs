use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::engine::{Engine, SectionId};
use crate::server::types::enroll_error_response;
use crate::types::AppState;

fn entry_json(engine: &Engine, code: &str, section_id: SectionId) -> serde_json::Value {
    let lessons = engine
        .catalog()
        .section(code, section_id)
        .map(|s| serde_json::to_value(&s.lessons).unwrap_or_default())
        .unwrap_or_default();
    json!({
        "course": code,
        "section": section_id,
        "lessons": lessons,
    })
}

/// GET /schedule/:student_id
/// Returns the student's registered and waitlisted courses with their lessons
pub async fn get_schedule(
    Path(student_id): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /schedule/{}", student_id);

    let engine = s.engine.read().await;
    let student = match engine.student(&student_id) {
        Ok(student) => student,
        Err(e) => return enroll_error_response(&e),
    };

    let registered: Vec<_> = student
        .timetable
        .registered_entries()
        .map(|(code, sid)| entry_json(&engine, code, sid))
        .collect();
    let waitlisted: Vec<_> = student
        .timetable
        .waitlisted_entries()
        .map(|(code, sid)| entry_json(&engine, code, sid))
        .collect();

    let response = json!({
        "student_id": student.id,
        "name": student.name,
        "registered": registered,
        "waitlisted": waitlisted,
    });
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /notifications/:student_id
/// Returns and clears the student's pending notifications
pub async fn get_notifications(
    Path(student_id): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /notifications/{}", student_id);

    let messages = s.outbox.drain(&student_id);
    (StatusCode::OK, Json(json!({ "messages": messages }))).into_response()
}
