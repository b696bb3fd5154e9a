use visage_auth::error::AuthServiceError;
use visage_auth::usecase::login::{LoginInput, LoginUseCase};
use visage_auth::usecase::token::validate_token;
use visage_face::FaceMatcher;

use crate::helpers::{
    MockFacePort, MockUserRepo, TEST_JWT_SECRET, TEST_PASSWORD, TEST_TTL_SECS, descriptor,
    descriptor_at_distance, test_user, upload_path,
};

fn usecase(users: MockUserRepo, faces: MockFacePort) -> LoginUseCase<MockUserRepo, MockFacePort> {
    LoginUseCase {
        users,
        faces,
        matcher: FaceMatcher::default(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        token_ttl_secs: TEST_TTL_SECS,
    }
}

fn password_input(username: &str, password: &str) -> LoginInput {
    LoginInput {
        username: username.to_owned(),
        password: Some(password.to_owned()),
        image: None,
    }
}

fn image_input(username: &str) -> LoginInput {
    LoginInput {
        username: username.to_owned(),
        password: None,
        image: Some(upload_path()),
    }
}

// ── password login ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_login_with_correct_password() {
    let user = test_user("alice", None);
    let uc = usecase(MockUserRepo::new(vec![user.clone()]), MockFacePort::no_face());

    let output = uc.execute(password_input("alice", TEST_PASSWORD)).await.unwrap();

    assert_eq!(output.user, user.profile());
    let claims = validate_token(&output.token, TEST_JWT_SECRET).unwrap();
    assert_eq!(claims.user_id().unwrap(), user.id);
}

#[tokio::test]
async fn should_reject_unknown_username() {
    let uc = usecase(MockUserRepo::empty(), MockFacePort::no_face());
    let result = uc.execute(password_input("ghost", TEST_PASSWORD)).await;
    assert!(
        matches!(result, Err(AuthServiceError::InvalidUsername)),
        "expected InvalidUsername, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_wrong_password() {
    let uc = usecase(
        MockUserRepo::new(vec![test_user("alice", None)]),
        MockFacePort::no_face(),
    );
    let result = uc.execute(password_input("alice", "wrong")).await;
    assert!(
        matches!(result, Err(AuthServiceError::InvalidPassword)),
        "expected InvalidPassword, got {result:?}"
    );
}

#[tokio::test]
async fn password_takes_precedence_over_image() {
    let faces = MockFacePort::no_face();
    let calls = faces.calls_handle();
    let uc = usecase(MockUserRepo::new(vec![test_user("alice", None)]), faces);

    let input = LoginInput {
        image: Some(upload_path()),
        ..password_input("alice", TEST_PASSWORD)
    };
    uc.execute(input).await.unwrap();

    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_require_password_or_image() {
    let uc = usecase(
        MockUserRepo::new(vec![test_user("alice", None)]),
        MockFacePort::no_face(),
    );
    let result = uc.execute(password_input("alice", "")).await;
    assert!(
        matches!(result, Err(AuthServiceError::MissingCredentials)),
        "expected MissingCredentials, got {result:?}"
    );
}

// ── face login ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_login_with_matching_face() {
    let user = test_user("alice", Some(descriptor(0.0)));
    let uc = usecase(
        MockUserRepo::new(vec![user.clone()]),
        MockFacePort::detecting(descriptor_at_distance(0.3)),
    );

    let output = uc.execute(image_input("alice")).await.unwrap();
    assert_eq!(output.user.id, user.id);
}

#[tokio::test]
async fn should_reject_face_beyond_threshold() {
    let uc = usecase(
        MockUserRepo::new(vec![test_user("alice", Some(descriptor(0.0)))]),
        MockFacePort::detecting(descriptor_at_distance(0.5)),
    );
    let result = uc.execute(image_input("alice")).await;
    assert!(
        matches!(result, Err(AuthServiceError::InvalidFace)),
        "expected InvalidFace, got {result:?}"
    );
}

#[tokio::test]
async fn face_exactly_at_threshold_does_not_match() {
    // 0.25 is exact in binary, so the distance equals the threshold exactly.
    let mut uc = usecase(
        MockUserRepo::new(vec![test_user("alice", Some(descriptor(0.0)))]),
        MockFacePort::detecting(descriptor_at_distance(0.25)),
    );
    uc.matcher = FaceMatcher::new(0.25).unwrap();
    let result = uc.execute(image_input("alice")).await;
    assert!(matches!(result, Err(AuthServiceError::InvalidFace)));
}

#[tokio::test]
async fn should_require_enrolled_face() {
    let faces = MockFacePort::detecting(descriptor(0.0));
    let calls = faces.calls_handle();
    let uc = usecase(MockUserRepo::new(vec![test_user("alice", None)]), faces);

    let result = uc.execute(image_input("alice")).await;
    assert!(
        matches!(result, Err(AuthServiceError::FaceNotEnrolled)),
        "expected FaceNotEnrolled, got {result:?}"
    );
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_image_without_face() {
    let uc = usecase(
        MockUserRepo::new(vec![test_user("alice", Some(descriptor(0.0)))]),
        MockFacePort::no_face(),
    );
    let result = uc.execute(image_input("alice")).await;
    assert!(
        matches!(result, Err(AuthServiceError::NoFaceDetected)),
        "expected NoFaceDetected, got {result:?}"
    );
}
