use std::path::PathBuf;

use visage_face::FaceMatcher;

use crate::domain::repository::{FacePort, UserRepository};
use crate::domain::types::UserProfile;
use crate::error::AuthServiceError;
use crate::usecase::password::verify_password;
use crate::usecase::token::issue_token;

pub struct LoginInput {
    pub username: String,
    /// Empty is treated as absent.
    pub password: Option<String>,
    /// Uploaded camera capture.
    pub image: Option<PathBuf>,
}

#[derive(Debug)]
pub struct SessionOutput {
    pub user: UserProfile,
    pub token: String,
    pub token_exp: u64,
}

/// Password login, or face login when no password is given.
pub struct LoginUseCase<U: UserRepository, F: FacePort> {
    pub users: U,
    pub faces: F,
    pub matcher: FaceMatcher,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
}

impl<U: UserRepository, F: FacePort> LoginUseCase<U, F> {
    pub async fn execute(&self, input: LoginInput) -> Result<SessionOutput, AuthServiceError> {
        let user = self
            .users
            .find_by_username(&input.username)
            .await?
            .ok_or(AuthServiceError::InvalidUsername)?;

        let password = input.password.filter(|p| !p.is_empty());
        if let Some(password) = password {
            if !verify_password(&password, &user.password_hash) {
                return Err(AuthServiceError::InvalidPassword);
            }
        } else if let Some(image) = input.image {
            let expected = user
                .descriptor
                .as_ref()
                .ok_or(AuthServiceError::FaceNotEnrolled)?;
            let captured = self
                .faces
                .describe(&image)
                .await?
                .ok_or(AuthServiceError::NoFaceDetected)?;
            let outcome = self.matcher.verify(&captured, expected);
            tracing::info!(
                username = %user.username,
                distance = outcome.distance,
                matched = outcome.matched,
                "face login attempt"
            );
            if !outcome.matched {
                return Err(AuthServiceError::InvalidFace);
            }
        } else {
            return Err(AuthServiceError::MissingCredentials);
        }

        let profile = user.profile();
        let (token, token_exp) = issue_token(&profile, &self.jwt_secret, self.token_ttl_secs)?;
        Ok(SessionOutput {
            user: profile,
            token,
            token_exp,
        })
    }
}
