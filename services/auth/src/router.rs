use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use visage_core::health::{healthz, readyz};
use visage_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    auth::{login, me, register},
    face::{identify, update},
};
use crate::state::AppState;

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Accounts
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        // Faces
        .route("/face/identify", post(identify))
        .route("/face/update", post(update))
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(DefaultBodyLimit::disable())
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
