use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use visage_core::config::Config;
use visage_face::{DEFAULT_MATCH_THRESHOLD, ModelConfig};

/// Auth service configuration loaded from environment variables.
///
/// Each field reads the upper-cased env var of the same name
/// (e.g. `jwt_secret` ← `JWT_SECRET`).
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL (customer enrollment table).
    pub redis_url: String,
    /// HMAC secret for signing JWTs.
    pub jwt_secret: String,
    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Free-form deployment label, logged at startup.
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,

    /// Directory where uploaded images are written.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Uploaded images older than this are purged.
    #[serde(default = "default_upload_ttl_days")]
    pub upload_ttl_days: u64,
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default = "default_face_match_threshold")]
    pub face_match_threshold: f32,
    /// Integer factor images are shrunk by before detection (1 = no shrink).
    #[serde(default = "default_face_image_downscale")]
    pub face_image_downscale: u32,
    #[serde(default = "default_face_detector_model")]
    pub face_detector_model: PathBuf,
    #[serde(default = "default_face_recognizer_model")]
    pub face_recognizer_model: PathBuf,
    #[serde(default = "default_face_detection_confidence")]
    pub face_detection_confidence: f32,
    #[serde(default = "default_face_detector_input")]
    pub face_detector_input: u32,
    #[serde(default = "default_face_recognizer_input")]
    pub face_recognizer_input: u32,
    #[serde(default = "default_face_optimization_level")]
    pub face_optimization_level: u8,
}

impl Config for AuthConfig {}

impl AuthConfig {
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            detector_path: self.face_detector_model.clone(),
            recognizer_path: self.face_recognizer_model.clone(),
            detector_input: self.face_detector_input,
            recognizer_input: self.face_recognizer_input,
            detection_confidence: self.face_detection_confidence,
            optimization_level: self.face_optimization_level,
        }
    }

    pub fn upload_ttl(&self) -> Duration {
        Duration::from_secs(self.upload_ttl_days * 24 * 60 * 60)
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs.max(1))
    }
}

fn default_port() -> u16 {
    3000
}

fn default_mode() -> String {
    "development".to_owned()
}

fn default_token_ttl_secs() -> u64 {
    86_400
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_upload_ttl_days() -> u64 {
    7
}

fn default_purge_interval_secs() -> u64 {
    86_400
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_face_match_threshold() -> f32 {
    DEFAULT_MATCH_THRESHOLD
}

fn default_face_image_downscale() -> u32 {
    4
}

fn default_face_detector_model() -> PathBuf {
    PathBuf::from("models/face_detector.onnx")
}

fn default_face_recognizer_model() -> PathBuf {
    PathBuf::from("models/face_recognizer.onnx")
}

fn default_face_detection_confidence() -> f32 {
    0.5
}

fn default_face_detector_input() -> u32 {
    640
}

fn default_face_recognizer_input() -> u32 {
    112
}

fn default_face_optimization_level() -> u8 {
    3
}
