use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::server::endpoints::{catalog, enrollment, schedule, status};
use crate::types::AppState;

mod endpoints;
mod types;

/// Creates the API router.
///
/// # Parameters
/// - `app_state`: The shared application state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Enrollment mutations; each runs as one critical section on the engine.
    let enrollment_router = Router::new()
        .route("/add_section", post(enrollment::post_add_section))
        .route("/waitlist_section", post(enrollment::post_waitlist_section))
        .route("/drop_section", post(enrollment::post_drop_section))
        .route("/drop_waitlist", post(enrollment::post_drop_waitlist))
        .route("/swap_section", post(enrollment::post_swap_section))
        .route("/swap_peer", post(enrollment::post_swap_peer));

    // Read-only queries plus the one engine-owned admin edit.
    let catalog_router = Router::new()
        .route("/courses", get(catalog::get_courses))
        .route("/course_info/:code", get(catalog::get_course_info))
        .route("/set_capacity", post(catalog::post_set_capacity));

    Router::new()
        .route("/health", get(status::get_health))
        .route("/schedule/:student_id", get(schedule::get_schedule))
        .route(
            "/notifications/:student_id",
            get(schedule::get_notifications),
        )
        .merge(enrollment_router)
        .merge(catalog_router)
        .with_state(app_state)
}
