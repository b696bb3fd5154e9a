use visage_auth::error::AuthServiceError;
use visage_auth::usecase::password::verify_password;
use visage_auth::usecase::register::{RegisterInput, RegisterUseCase};
use visage_auth::usecase::token::validate_token;

use crate::helpers::{
    MockFacePort, MockUserRepo, TEST_JWT_SECRET, TEST_PASSWORD, TEST_TTL_SECS, descriptor,
    test_user, upload_path,
};

fn usecase(
    users: MockUserRepo,
    faces: MockFacePort,
) -> RegisterUseCase<MockUserRepo, MockFacePort> {
    RegisterUseCase {
        users,
        faces,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        token_ttl_secs: TEST_TTL_SECS,
    }
}

fn input(username: &str) -> RegisterInput {
    RegisterInput {
        username: username.to_owned(),
        password: TEST_PASSWORD.to_owned(),
        name: "Alice".to_owned(),
        image: None,
        image_descriptor: None,
    }
}

#[tokio::test]
async fn should_register_without_face() {
    let users = MockUserRepo::empty();
    let stored = users.users_handle();
    let uc = usecase(users, MockFacePort::no_face());

    let output = uc.execute(input("alice")).await.unwrap();

    assert_eq!(output.user.username, "alice");
    assert_eq!(output.user.name, "Alice");
    let claims = validate_token(&output.token, TEST_JWT_SECRET).unwrap();
    assert_eq!(claims.user_id().unwrap(), output.user.id);

    let stored = stored.lock().unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].descriptor.is_none());
    assert_ne!(stored[0].password_hash, TEST_PASSWORD);
    assert!(verify_password(TEST_PASSWORD, &stored[0].password_hash));
}

#[tokio::test]
async fn should_enrol_face_from_uploaded_image() {
    let users = MockUserRepo::empty();
    let stored = users.users_handle();
    let uc = usecase(users, MockFacePort::detecting(descriptor(0.1)));

    let request = RegisterInput {
        image: Some(upload_path()),
        // Ignored when an image is uploaded.
        image_descriptor: Some("garbage".to_owned()),
        ..input("alice")
    };
    uc.execute(request).await.unwrap();

    assert_eq!(stored.lock().unwrap()[0].descriptor, Some(descriptor(0.1)));
}

#[tokio::test]
async fn should_reject_image_without_face() {
    let users = MockUserRepo::empty();
    let stored = users.users_handle();
    let uc = usecase(users, MockFacePort::no_face());

    let request = RegisterInput {
        image: Some(upload_path()),
        ..input("alice")
    };
    let result = uc.execute(request).await;

    assert!(
        matches!(result, Err(AuthServiceError::NoFaceDetected)),
        "expected NoFaceDetected, got {result:?}"
    );
    assert!(stored.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_enrol_supplied_descriptor() {
    let users = MockUserRepo::empty();
    let stored = users.users_handle();
    let uc = usecase(users, MockFacePort::no_face());

    let request = RegisterInput {
        image_descriptor: Some(descriptor(0.25).to_string()),
        ..input("alice")
    };
    uc.execute(request).await.unwrap();

    assert_eq!(stored.lock().unwrap()[0].descriptor, Some(descriptor(0.25)));
}

#[tokio::test]
async fn blank_descriptor_is_ignored() {
    let users = MockUserRepo::empty();
    let stored = users.users_handle();
    let uc = usecase(users, MockFacePort::no_face());

    let request = RegisterInput {
        image_descriptor: Some("   ".to_owned()),
        ..input("alice")
    };
    uc.execute(request).await.unwrap();

    assert!(stored.lock().unwrap()[0].descriptor.is_none());
}

#[tokio::test]
async fn should_reject_malformed_descriptor() {
    let uc = usecase(MockUserRepo::empty(), MockFacePort::no_face());

    let request = RegisterInput {
        image_descriptor: Some("0.1,0.2,0.3".to_owned()),
        ..input("alice")
    };
    let result = uc.execute(request).await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidRequest(ref m)) if m.starts_with("imageDescriptor")),
        "expected InvalidRequest, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_existing_username() {
    let users = MockUserRepo::new(vec![test_user("alice", None)]);
    let stored = users.users_handle();
    let uc = usecase(users, MockFacePort::no_face());

    let result = uc.execute(input("alice")).await;

    assert!(
        matches!(result, Err(AuthServiceError::UserAlreadyExists)),
        "expected UserAlreadyExists, got {result:?}"
    );
    assert_eq!(stored.lock().unwrap().len(), 1);
}
