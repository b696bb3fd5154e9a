use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use visage_auth::config::AuthConfig;
use visage_auth::infra::uploads::UploadStore;
use visage_auth::router::build_router;
use visage_auth::state::AppState;
use visage_core::config::Config;
use visage_core::tracing::init_tracing;
use visage_face::{FaceMatcher, OnnxFaceDetector};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AuthConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let detector =
        OnnxFaceDetector::new(&config.model_config()).expect("failed to load face models");
    let matcher =
        FaceMatcher::new(config.face_match_threshold).expect("invalid FACE_MATCH_THRESHOLD");

    let uploads = UploadStore::new(&config.upload_dir);
    uploads
        .ensure_dir()
        .await
        .expect("failed to create upload directory");
    uploads.spawn_purge_task(config.purge_interval(), config.upload_ttl());

    let state = AppState {
        db,
        redis,
        detector: Arc::new(detector),
        image_downscale: config.face_image_downscale,
        uploads,
        matcher,
        jwt_secret: config.jwt_secret,
        token_ttl_secs: config.token_ttl_secs,
    };

    let router = build_router(state, config.max_upload_bytes);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!(mode = %config.mode, "visage listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
