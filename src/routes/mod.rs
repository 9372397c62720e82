use axum::{
    http::{HeaderValue, StatusCode},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    db::RecordStore,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{CompletionGateway, Orchestrator},
};

pub mod catalog;
pub mod chat;
pub mod development;
pub mod guidance;

/// Shared handler state
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub records: Arc<dyn RecordStore>,
    pub gateway: CompletionGateway,
}

impl AppState {
    /// Wires the standard advisors to the given gateway and store
    pub fn new(gateway: CompletionGateway, records: Arc<dyn RecordStore>) -> Self {
        Self {
            orchestrator: Arc::new(Orchestrator::standard(gateway.clone(), records.clone())),
            records,
            gateway,
        }
    }
}

/// Creates the application router with all routes and middleware
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(Arc::new(state))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(cors_layer(cors_origins)),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/guidance", post(guidance::comprehensive))
        .route("/guidance/profile", post(guidance::for_profile))
        .route("/advisors/:kind", post(guidance::single_advisor))
        .route("/chat", post(chat::chat))
        .route("/courses", get(catalog::courses))
        .route("/courses/categories/list", get(catalog::course_categories))
        .route("/colleges", get(catalog::colleges))
        .route("/colleges/:id", get(catalog::college_by_id))
        .route("/colleges/locations/list", get(catalog::college_locations))
        .route("/colleges/types/list", get(catalog::college_types))
        .route("/skills/analyze", post(development::analyze_skills))
        .route("/learning-path", post(development::learning_path))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
