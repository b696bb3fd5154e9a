use std::future::Future;

use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::request::Parts,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::repository::UserRepository;
use crate::domain::types::UserProfile;
use crate::error::AuthServiceError;
use crate::handlers::form::{AuthForm, required};
use crate::state::AppState;
use crate::usecase::login::{LoginInput, LoginUseCase, SessionOutput};
use crate::usecase::register::{RegisterInput, RegisterUseCase};
use crate::usecase::token::validate_token;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserProfile,
    pub token: String,
}

impl From<SessionOutput> for SessionResponse {
    fn from(output: SessionOutput) -> Self {
        Self {
            user: output.user,
            token: output.token,
        }
    }
}

// ── POST /auth/register ──────────────────────────────────────────────────────

pub async fn register(
    State(state): State<AppState>,
    form: AuthForm,
) -> Result<Json<SessionResponse>, AuthServiceError> {
    let input = RegisterInput {
        username: required(form.username, "username")?,
        password: required(form.password, "password")?,
        name: required(form.name, "name")?,
        image: form.image,
        image_descriptor: form.image_descriptor,
    };

    let usecase = RegisterUseCase {
        users: state.user_repo(),
        faces: state.face_engine(),
        jwt_secret: state.jwt_secret.clone(),
        token_ttl_secs: state.token_ttl_secs,
    };
    let output = usecase.execute(input).await?;
    Ok(Json(output.into()))
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

pub async fn login(
    State(state): State<AppState>,
    form: AuthForm,
) -> Result<Json<SessionResponse>, AuthServiceError> {
    let input = LoginInput {
        username: required(form.username, "username")?,
        password: form.password,
        image: form.image,
    };

    let usecase = LoginUseCase {
        users: state.user_repo(),
        faces: state.face_engine(),
        matcher: state.matcher,
        jwt_secret: state.jwt_secret.clone(),
        token_ttl_secs: state.token_ttl_secs,
    };
    let output = usecase.execute(input).await?;
    Ok(Json(output.into()))
}

// ── GET /auth/me ─────────────────────────────────────────────────────────────

/// Raw token from an `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AuthServiceError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .map(|auth| auth.token().to_owned());
        async move { token.map(Self).ok_or(AuthServiceError::InvalidToken) }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub has_face: bool,
}

pub async fn me(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<MeResponse>, AuthServiceError> {
    let claims = validate_token(&token, &state.jwt_secret)?;
    let user = state
        .user_repo()
        .find_by_id(claims.user_id()?)
        .await?
        .ok_or(AuthServiceError::InvalidToken)?;

    Ok(Json(MeResponse {
        id: user.id,
        has_face: user.descriptor.is_some(),
        username: user.username,
        name: user.name,
    }))
}
