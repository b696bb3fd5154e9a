use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service domain error variants.
///
/// Display strings are the client-facing `message` of the JSON error body.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Invalid username")]
    InvalidUsername,
    #[error("Invalid password")]
    InvalidPassword,
    #[error("Invalid image captured")]
    InvalidFace,
    #[error("Missing credentials: provide a password or an image")]
    MissingCredentials,
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("No face detected in the image")]
    NoFaceDetected,
    #[error("No face authentication found for this user")]
    FaceNotEnrolled,
    #[error("Missing Image! Please try again...")]
    MissingImage,
    #[error("No file was uploaded")]
    NoFileUploaded,
    #[error("invalid token")]
    InvalidToken,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::InvalidUsername => "INVALID_USERNAME",
            Self::InvalidPassword => "INVALID_PASSWORD",
            Self::InvalidFace => "INVALID_FACE",
            Self::MissingCredentials => "MISSING_CREDENTIALS",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::NoFaceDetected => "NO_FACE_DETECTED",
            Self::FaceNotEnrolled => "FACE_NOT_ENROLLED",
            Self::MissingImage => "MISSING_IMAGE",
            Self::NoFileUploaded => "NO_FILE_UPLOADED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::MissingCredentials
            | Self::NoFaceDetected
            | Self::FaceNotEnrolled
            | Self::MissingImage
            | Self::NoFileUploaded => StatusCode::BAD_REQUEST,
            Self::InvalidUsername | Self::InvalidPassword | Self::InvalidFace | Self::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::UserAlreadyExists => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // TraceLayer already records every request; only 500s carry a cause worth logging.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
