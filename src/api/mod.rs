mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;

pub use handlers::{
    INVALID_NUMBER_MESSAGE, MISSING_FIELD_MESSAGE, NO_SUBJECTS_MESSAGE, ROLL_NO_TAKEN_MESSAGE,
};

pub fn create_router(db: Database) -> Router {
    let api = Router::new()
        .route("/summary", get(handlers::summary))
        // Students
        .route("/students", get(handlers::list_students))
        .route("/students", post(handlers::admit_student))
        .route("/students/{id}/marks", get(handlers::get_transcript))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}
