use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::AuthServiceError;
use crate::handlers::form::{AuthForm, required};
use crate::state::AppState;
use crate::usecase::face::{IdentifyFaceUseCase, UpdateFaceInput, UpdateFaceUseCase};

/// Body of `POST /face/identify`. Exactly one of the fields is set.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum IdentifyResponse {
    Detected {
        success: &'static str,
        #[serde(rename = "faceDescriptor")]
        face_descriptor: String,
    },
    NotDetected {
        error: &'static str,
    },
}

// ── POST /face/identify ──────────────────────────────────────────────────────

pub async fn identify(
    State(state): State<AppState>,
    form: AuthForm,
) -> Result<Json<IdentifyResponse>, AuthServiceError> {
    let usecase = IdentifyFaceUseCase {
        faces: state.face_engine(),
    };
    let response = match usecase.execute(form.image.as_deref()).await? {
        Some(descriptor) => IdentifyResponse::Detected {
            success: "Face detected successfully!",
            face_descriptor: descriptor.to_string(),
        },
        None => IdentifyResponse::NotDetected {
            error: "No face detected in the image",
        },
    };
    Ok(Json(response))
}

// ── POST /face/update ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UpdateFaceResponse {
    pub status: &'static str,
}

pub async fn update(
    State(state): State<AppState>,
    form: AuthForm,
) -> Result<Json<UpdateFaceResponse>, AuthServiceError> {
    let input = UpdateFaceInput {
        username: required(form.username, "username")?,
        image: form.image,
    };
    let usecase = UpdateFaceUseCase {
        users: state.user_repo(),
        customers: state.customer_table(),
        faces: state.face_engine(),
    };
    usecase.execute(input).await?;
    Ok(Json(UpdateFaceResponse { status: "success" }))
}
