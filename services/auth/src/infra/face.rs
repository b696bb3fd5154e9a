use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use visage_face::{FaceDescriptor, FaceDetector, FaceError, load_image};

use crate::domain::repository::FacePort;
use crate::error::AuthServiceError;

/// Runs a [`FaceDetector`] on the blocking pool.
#[derive(Clone)]
pub struct FaceEngine {
    pub detector: Arc<dyn FaceDetector>,
    /// Integer shrink factor applied before detection.
    pub downscale: u32,
}

impl FacePort for FaceEngine {
    async fn describe(&self, image: &Path) -> Result<Option<FaceDescriptor>, AuthServiceError> {
        let detector = Arc::clone(&self.detector);
        let downscale = self.downscale;
        let path = image.to_path_buf();

        let detection = tokio::task::spawn_blocking(move || {
            let image = load_image(&path, downscale)?;
            detector.detect_single(&image)
        })
        .await
        .context("face detection task")?;

        match detection {
            Ok(found) => Ok(found.map(|d| d.descriptor)),
            // An upload that is not a decodable image simply has no face in it.
            Err(FaceError::Image(e)) => {
                tracing::debug!(error = %e, "uploaded file is not a readable image");
                Ok(None)
            }
            Err(e) => Err(anyhow::Error::new(e).context("detect face").into()),
        }
    }
}
