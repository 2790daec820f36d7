//! API endpoints for enrollment operations.
//!
//! Each handler takes the engine write lock, runs exactly one engine
//! operation, and snapshots on success. Typed engine errors map to JSON
//! conflict responses; the front end re-prompts off the `code` field.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::engine::SectionId;
use crate::server::types::enroll_error_response;
use crate::types::AppState;

/// Body for register/waitlist requests.
#[derive(Debug, Deserialize)]
pub struct SectionRequest {
    pub student_id: String,
    pub course: String,
    pub section: SectionId,
}

/// Body for drop requests.
#[derive(Debug, Deserialize)]
pub struct CourseRequest {
    pub student_id: String,
    pub course: String,
}

/// Body for a same-student index change.
#[derive(Debug, Deserialize)]
pub struct SwapRequest {
    pub student_id: String,
    pub course: String,
    pub new_section: SectionId,
}

/// Body for a peer-to-peer index exchange.
#[derive(Debug, Deserialize)]
pub struct PeerSwapRequest {
    pub student_id: String,
    pub peer_id: String,
    pub course: String,
}

/// POST /add_section
///
/// Registers the student into a section. On `no_vacancy` the response
/// carries `waitlist_available: true` and the caller may POST /waitlist_section.
pub async fn post_add_section(
    State(s): State<Arc<AppState>>,
    Json(req): Json<SectionRequest>,
) -> Response {
    info!(
        "POST /add_section {} -> {} index {}",
        req.student_id, req.course, req.section
    );

    let mut engine = s.engine.write().await;
    match engine.register(&req.student_id, &req.course, req.section) {
        Ok(()) => {
            s.snapshot(&engine);
            (StatusCode::OK, Json(json!({"status": "registered"}))).into_response()
        }
        Err(e) => enroll_error_response(&e),
    }
}

/// POST /waitlist_section
///
/// Places the student on the section's waitlist. Per protocol, callers only
/// invoke this after /add_section answered `no_vacancy`.
pub async fn post_waitlist_section(
    State(s): State<Arc<AppState>>,
    Json(req): Json<SectionRequest>,
) -> Response {
    info!(
        "POST /waitlist_section {} -> {} index {}",
        req.student_id, req.course, req.section
    );

    let mut engine = s.engine.write().await;
    match engine.add_to_waitlist(&req.student_id, &req.course, req.section) {
        Ok(()) => {
            s.snapshot(&engine);
            (StatusCode::OK, Json(json!({"status": "waitlisted"}))).into_response()
        }
        Err(e) => enroll_error_response(&e),
    }
}

/// POST /drop_section
///
/// Drops a registered course and promotes the head of its waitlist.
pub async fn post_drop_section(
    State(s): State<Arc<AppState>>,
    Json(req): Json<CourseRequest>,
) -> Response {
    info!("POST /drop_section {} -> {}", req.student_id, req.course);

    let mut engine = s.engine.write().await;
    match engine.drop_registered(&req.student_id, &req.course) {
        Ok(()) => {
            s.snapshot(&engine);
            (StatusCode::OK, Json(json!({"status": "dropped"}))).into_response()
        }
        Err(e) => enroll_error_response(&e),
    }
}

/// POST /drop_waitlist
///
/// Gives up a waitlist place; frees no seat and promotes nobody.
pub async fn post_drop_waitlist(
    State(s): State<Arc<AppState>>,
    Json(req): Json<CourseRequest>,
) -> Response {
    info!("POST /drop_waitlist {} -> {}", req.student_id, req.course);

    let mut engine = s.engine.write().await;
    match engine.drop_waitlisted(&req.student_id, &req.course) {
        Ok(()) => {
            s.snapshot(&engine);
            (StatusCode::OK, Json(json!({"status": "dropped"}))).into_response()
        }
        Err(e) => enroll_error_response(&e),
    }
}

/// POST /swap_section
///
/// Atomically moves the student to another index of the same course.
pub async fn post_swap_section(
    State(s): State<Arc<AppState>>,
    Json(req): Json<SwapRequest>,
) -> Response {
    info!(
        "POST /swap_section {} -> {} index {}",
        req.student_id, req.course, req.new_section
    );

    let mut engine = s.engine.write().await;
    match engine.swap_section(&req.student_id, &req.course, req.new_section) {
        Ok(()) => {
            s.snapshot(&engine);
            (StatusCode::OK, Json(json!({"status": "swapped"}))).into_response()
        }
        Err(e) => enroll_error_response(&e),
    }
}

/// POST /swap_peer
///
/// Atomically exchanges section assignments for one course between two
/// students.
pub async fn post_swap_peer(
    State(s): State<Arc<AppState>>,
    Json(req): Json<PeerSwapRequest>,
) -> Response {
    info!(
        "POST /swap_peer {} <> {} for {}",
        req.student_id, req.peer_id, req.course
    );

    let mut engine = s.engine.write().await;
    match engine.swap_with_peer(&req.student_id, &req.peer_id, &req.course) {
        Ok(()) => {
            s.snapshot(&engine);
            (StatusCode::OK, Json(json!({"status": "swapped"}))).into_response()
        }
        Err(e) => enroll_error_response(&e),
    }
}
