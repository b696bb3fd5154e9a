//! Request body shared by the auth and face routes.
//!
//! Clients post either `multipart/form-data` (text fields plus an optional
//! `image` file part) or a JSON object with the same text fields.

use std::future::Future;
use std::path::PathBuf;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{FromRef, FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use serde::Deserialize;

use crate::domain::types::MIN_FIELD_LEN;
use crate::error::AuthServiceError;
use crate::infra::uploads::UploadStore;

/// Field name of the uploaded image part.
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonForm {
    username: Option<String>,
    password: Option<String>,
    name: Option<String>,
    image_descriptor: Option<String>,
}

#[derive(Debug, Default)]
pub struct AuthForm {
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub image_descriptor: Option<String>,
    /// Where the uploaded image was stored, if one was sent.
    pub image: Option<PathBuf>,
}

/// Take a text field that must hold at least [`MIN_FIELD_LEN`] characters.
pub fn required(value: Option<String>, field: &str) -> Result<String, AuthServiceError> {
    match value {
        Some(v) if v.chars().count() >= MIN_FIELD_LEN => Ok(v),
        _ => Err(AuthServiceError::InvalidRequest(format!(
            "{field} is required"
        ))),
    }
}

fn content_type(req: &Request) -> &str {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

impl<S> FromRequest<S> for AuthForm
where
    UploadStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthServiceError;

    fn from_request(
        req: Request,
        state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let uploads = UploadStore::from_ref(state);
        async move {
            let (is_multipart, is_json) = {
                let content_type = content_type(&req);
                (
                    content_type.starts_with("multipart/form-data"),
                    content_type.contains("json"),
                )
            };
            if is_multipart {
                let multipart = Multipart::from_request(req, &())
                    .await
                    .map_err(|e| AuthServiceError::InvalidRequest(e.body_text()))?;
                read_multipart(multipart, &uploads).await
            } else if !is_json {
                // A bare request carries no fields; the flows report what is missing.
                let body = Bytes::from_request(req, &())
                    .await
                    .map_err(|e| AuthServiceError::InvalidRequest(e.body_text()))?;
                if body.is_empty() {
                    Ok(Self::default())
                } else {
                    Err(AuthServiceError::InvalidRequest(
                        "Expected a multipart/form-data or JSON body".to_owned(),
                    ))
                }
            } else {
                let Json(body) = Json::<JsonForm>::from_request(req, &())
                    .await
                    .map_err(|e| AuthServiceError::InvalidRequest(e.body_text()))?;
                Ok(Self {
                    username: body.username,
                    password: body.password,
                    name: body.name,
                    image_descriptor: body.image_descriptor,
                    image: None,
                })
            }
        }
    }
}

async fn read_multipart(
    mut multipart: Multipart,
    uploads: &UploadStore,
) -> Result<AuthForm, AuthServiceError> {
    let mut form = AuthForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AuthServiceError::InvalidRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        if name == IMAGE_FIELD {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AuthServiceError::InvalidRequest(e.body_text()))?;
            // Browsers send an empty part when no file was chosen.
            if bytes.is_empty() {
                continue;
            }
            let path = uploads.save(&bytes).await?;
            tracing::debug!(path = %path.display(), size = bytes.len(), "image uploaded");
            form.image = Some(path);
            continue;
        }

        let slot = match name.as_str() {
            "username" => &mut form.username,
            "password" => &mut form.password,
            "name" => &mut form.name,
            "imageDescriptor" => &mut form.image_descriptor,
            _ => continue,
        };
        let text = field
            .text()
            .await
            .map_err(|e| AuthServiceError::InvalidRequest(e.body_text()))?;
        *slot = Some(text);
    }
    Ok(form)
}
