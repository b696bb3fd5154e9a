use std::sync::Arc;

use axum::extract::FromRef;
use deadpool_redis::Pool as RedisPool;
use sea_orm::DatabaseConnection;

use visage_face::{FaceDetector, FaceMatcher};

use crate::infra::db::DbUserRepository;
use crate::infra::face::FaceEngine;
use crate::infra::table::RedisCustomerTable;
use crate::infra::uploads::UploadStore;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    pub detector: Arc<dyn FaceDetector>,
    pub image_downscale: u32,
    pub uploads: UploadStore,
    pub matcher: FaceMatcher,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn customer_table(&self) -> RedisCustomerTable {
        RedisCustomerTable {
            pool: self.redis.clone(),
        }
    }

    pub fn face_engine(&self) -> FaceEngine {
        FaceEngine {
            detector: Arc::clone(&self.detector),
            downscale: self.image_downscale,
        }
    }
}

impl FromRef<AppState> for UploadStore {
    fn from_ref(state: &AppState) -> Self {
        state.uploads.clone()
    }
}
