//! # Gradebook HTTP API Module
//!
//! JSON API over one shared `Gradebook`, built on axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Student and grade counts
//! - `GET /students?q=&sort=name|avg` - List students
//! - `POST /students` - Add a student
//! - `GET /students/{roll}` - Full student record
//! - `GET /students/{roll}/grades` - Grades of a student
//! - `POST /students/{roll}/grades` - Add a grade
//! - `GET /students/{roll}/average` - Average of a student
//! - `DELETE /grades/{id}` - Remove a grade
//! - `GET /class-stats` - Averages of every student
//! - `GET /export/csv` - CSV export of every grade

mod error;
mod handlers;
mod middleware;
mod types;

pub use error::ApiError;
pub use middleware::create_rate_limiter;
pub use types::{
    AddGradeRequest, AddStudentRequest, AverageJson, AverageResponse, ErrorResponse, GradeJson,
    HealthResponse, ListQuery, ScoreInput, StatusResponse, StudentJson, StudentRecordResponse,
    StudentSummaryJson,
};

use crate::config::GradebookConfig;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{delete, get},
};
use gradebook_core::{Gradebook, GradebookError};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (64 KiB).
pub const MAX_BODY_BYTES: usize = 64 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the gradebook.
#[derive(Clone)]
pub struct AppState {
    pub gradebook: Arc<RwLock<Gradebook>>,
}

impl AppState {
    #[must_use]
    pub fn new(gradebook: Gradebook) -> Self {
        Self {
            gradebook: Arc::new(RwLock::new(gradebook)),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from `cors_origins`.
///
/// - `"*"`: any origin
/// - unset: localhost only
/// - otherwise: the comma-separated list; localhost if none of it parses
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins.map(str::trim) {
        Some("*") => {
            tracing::warn!("CORS: allowing ALL origins");
            CorsLayer::permissive()
        }
        Some(list) => {
            let allowed: Vec<HeaderValue> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(e) => {
                        tracing::warn!(origin, error = %e, "CORS: invalid origin ignored");
                        None
                    }
                })
                .collect();

            if allowed.is_empty() {
                tracing::warn!("CORS: no valid origins configured, defaulting to localhost");
                build_localhost_cors()
            } else {
                tracing::info!(count = allowed.len(), "CORS: origins configured");
                restricted_cors(allowed)
            }
        }
        None => build_localhost_cors(),
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse().ok())
    .collect();
    restricted_cors(origins)
}

fn restricted_cors(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing
/// 2. CORS
/// 3. Body limit
/// 4. Rate limiting (if enabled)
pub fn create_router(state: AppState, config: &GradebookConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route(
            "/students",
            get(handlers::list_students_handler).post(handlers::add_student_handler),
        )
        .route("/students/{roll}", get(handlers::student_record_handler))
        .route(
            "/students/{roll}/grades",
            get(handlers::get_grades_handler).post(handlers::add_grade_handler),
        )
        .route("/students/{roll}/average", get(handlers::average_handler))
        .route("/grades/{id}", delete(handlers::remove_grade_handler))
        .route("/class-stats", get(handlers::class_stats_handler))
        .route("/export/csv", get(handlers::export_csv_handler));

    match create_rate_limiter(config.rate_limit) {
        Some(limiter) => {
            tracing::info!(rps = config.rate_limit, "Rate limiting enabled");
            router = router.layer(axum_middleware::from_fn_with_state(
                limiter,
                middleware::rate_limit_middleware,
            ));
        }
        None => tracing::info!("Rate limiting disabled"),
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(config.cors_origins.as_deref()))
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Bind `addr` and serve the gradebook until the process stops.
pub async fn run_server(
    addr: &str,
    gradebook: Gradebook,
    config: &GradebookConfig,
) -> Result<(), GradebookError> {
    let router = create_router(AppState::new(gradebook), config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| GradebookError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!(addr, "Gradebook HTTP server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| GradebookError::IoError(format!("Server error: {}", e)))
}
