use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::domain::types::UserProfile;
use crate::error::AuthServiceError;

/// JWT claims carried by session tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id.
    pub sub: String,
    pub username: String,
    pub name: String,
    pub exp: u64,
}

impl TokenClaims {
    pub fn user_id(&self) -> Result<Uuid, AuthServiceError> {
        self.sub
            .parse::<Uuid>()
            .map_err(|_| AuthServiceError::InvalidToken)
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Sign a token for `user` valid for `ttl_secs`. Returns the token and its expiry.
pub fn issue_token(
    user: &UserProfile,
    secret: &str,
    ttl_secs: u64,
) -> Result<(String, u64), AuthServiceError> {
    let exp = now_secs() + ttl_secs;
    let claims = TokenClaims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        name: user.name.clone(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthServiceError::Internal(e.into()))?;
    Ok((token, exp))
}

/// Validate signature and expiry, returning the claims.
pub fn validate_token(token: &str, secret: &str) -> Result<TokenClaims, AuthServiceError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AuthServiceError::InvalidToken)?;

    Ok(data.claims)
}
