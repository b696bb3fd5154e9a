use std::path::PathBuf;

use chrono::Utc;
use uuid::Uuid;

use visage_face::FaceDescriptor;

use crate::domain::repository::{FacePort, UserRepository};
use crate::domain::types::User;
use crate::error::AuthServiceError;
use crate::usecase::login::SessionOutput;
use crate::usecase::password::hash_password;
use crate::usecase::token::issue_token;

pub struct RegisterInput {
    pub username: String,
    pub password: String,
    pub name: String,
    /// Uploaded image to enrol; takes precedence over `image_descriptor`.
    pub image: Option<PathBuf>,
    /// Descriptor previously returned by face identification.
    pub image_descriptor: Option<String>,
}

pub struct RegisterUseCase<U: UserRepository, F: FacePort> {
    pub users: U,
    pub faces: F,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
}

impl<U: UserRepository, F: FacePort> RegisterUseCase<U, F> {
    pub async fn execute(&self, input: RegisterInput) -> Result<SessionOutput, AuthServiceError> {
        if self.users.find_by_username(&input.username).await?.is_some() {
            return Err(AuthServiceError::UserAlreadyExists);
        }

        let password_hash = hash_password(&input.password)?;
        let descriptor = self.enrolment(input.image, input.image_descriptor).await?;

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            username: input.username,
            password_hash,
            name: input.name,
            descriptor,
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;
        tracing::info!(
            username = %user.username,
            face = user.descriptor.is_some(),
            "user registered"
        );

        let profile = user.profile();
        let (token, token_exp) = issue_token(&profile, &self.jwt_secret, self.token_ttl_secs)?;
        Ok(SessionOutput {
            user: profile,
            token,
            token_exp,
        })
    }

    async fn enrolment(
        &self,
        image: Option<PathBuf>,
        image_descriptor: Option<String>,
    ) -> Result<Option<FaceDescriptor>, AuthServiceError> {
        if let Some(image) = image {
            let descriptor = self
                .faces
                .describe(&image)
                .await?
                .ok_or(AuthServiceError::NoFaceDetected)?;
            return Ok(Some(descriptor));
        }
        match image_descriptor.filter(|d| !d.trim().is_empty()) {
            Some(raw) => raw
                .parse::<FaceDescriptor>()
                .map(Some)
                .map_err(|e| AuthServiceError::InvalidRequest(format!("imageDescriptor: {e}"))),
            None => Ok(None),
        }
    }
}
