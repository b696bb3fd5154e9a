use std::path::{Path, PathBuf};

use chrono::Utc;

use visage_face::FaceDescriptor;

use crate::domain::repository::{CustomerRepository, FacePort, UserRepository};
use crate::domain::types::CustomerEnrollment;
use crate::error::AuthServiceError;

// ── IdentifyFace ─────────────────────────────────────────────────────────────

/// Extract the descriptor of an uploaded image so a client can enrol it later.
pub struct IdentifyFaceUseCase<F: FacePort> {
    pub faces: F,
}

impl<F: FacePort> IdentifyFaceUseCase<F> {
    /// `Ok(None)` when the image holds no face.
    pub async fn execute(
        &self,
        image: Option<&Path>,
    ) -> Result<Option<FaceDescriptor>, AuthServiceError> {
        let image = image.ok_or(AuthServiceError::NoFileUploaded)?;
        self.faces.describe(image).await
    }
}

// ── UpdateFace ───────────────────────────────────────────────────────────────

pub struct UpdateFaceInput {
    pub username: String,
    pub image: Option<PathBuf>,
}

/// Replace a user's enrolled face and mark the enrollment complete.
pub struct UpdateFaceUseCase<U: UserRepository, C: CustomerRepository, F: FacePort> {
    pub users: U,
    pub customers: C,
    pub faces: F,
}

impl<U: UserRepository, C: CustomerRepository, F: FacePort> UpdateFaceUseCase<U, C, F> {
    pub async fn execute(&self, input: UpdateFaceInput) -> Result<(), AuthServiceError> {
        if self.users.find_by_username(&input.username).await?.is_none() {
            return Err(AuthServiceError::InvalidUsername);
        }
        let image = input.image.ok_or(AuthServiceError::MissingImage)?;
        let descriptor = self
            .faces
            .describe(&image)
            .await?
            .ok_or(AuthServiceError::NoFaceDetected)?;

        if !self
            .users
            .update_descriptor(&input.username, &descriptor)
            .await?
        {
            // Deleted between lookup and update.
            return Err(AuthServiceError::InvalidUsername);
        }

        let record = CustomerEnrollment {
            username: input.username.clone(),
            image: image
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            descriptor: descriptor.to_string(),
            completed: true,
            updated_at: Utc::now(),
        };
        // The user row is authoritative and already committed; a stale
        // enrollment record must not fail the request.
        if let Err(e) = self.upsert_enrollment(&record).await {
            tracing::error!(
                username = %input.username,
                error = ?e,
                "failed to record face enrollment"
            );
        }
        tracing::info!(username = %input.username, "face updated");
        Ok(())
    }

    async fn upsert_enrollment(&self, record: &CustomerEnrollment) -> Result<(), AuthServiceError> {
        if self.customers.find(&record.username).await?.is_some() {
            if self.customers.update(record).await? {
                return Ok(());
            }
        }
        if !self.customers.create(record).await? {
            // Lost a race with a concurrent create; overwrite it.
            self.customers.update(record).await?;
        }
        Ok(())
    }
}
