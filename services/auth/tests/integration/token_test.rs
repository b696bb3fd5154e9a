use visage_auth::error::AuthServiceError;
use visage_auth::usecase::token::{issue_token, validate_token};

use crate::helpers::{TEST_JWT_SECRET, TEST_TTL_SECS, test_user};

// ── issue_token / validate_token ─────────────────────────────────────────────

#[tokio::test]
async fn should_issue_token_that_validates_successfully() {
    let profile = test_user("alice", None).profile();
    let (token, exp) = issue_token(&profile, TEST_JWT_SECRET, TEST_TTL_SECS).unwrap();

    assert!(!token.is_empty());
    assert!(exp > TEST_TTL_SECS);

    let claims = validate_token(&token, TEST_JWT_SECRET).unwrap();
    assert_eq!(claims.user_id().unwrap(), profile.id);
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.name, profile.name);
    assert_eq!(claims.exp, exp);
}

#[tokio::test]
async fn should_reject_token_signed_with_wrong_secret() {
    let profile = test_user("alice", None).profile();
    let (token, _) = issue_token(&profile, TEST_JWT_SECRET, TEST_TTL_SECS).unwrap();

    let result = validate_token(&token, "wrong-secret");
    assert!(
        matches!(result, Err(AuthServiceError::InvalidToken)),
        "expected InvalidToken, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_invalid_token_string() {
    let result = validate_token("not-a-jwt", TEST_JWT_SECRET);
    assert!(
        matches!(result, Err(AuthServiceError::InvalidToken)),
        "expected InvalidToken, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_expired_token() {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use visage_auth::usecase::token::TokenClaims;

    let profile = test_user("alice", None).profile();
    let claims = TokenClaims {
        sub: profile.id.to_string(),
        username: profile.username,
        name: profile.name,
        // Well past the default validation leeway.
        exp: 1_000,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap();

    let result = validate_token(&token, TEST_JWT_SECRET);
    assert!(matches!(result, Err(AuthServiceError::InvalidToken)));
}
