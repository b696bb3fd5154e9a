use chrono::Utc;

use visage_auth::domain::types::CustomerEnrollment;
use visage_auth::error::AuthServiceError;
use visage_auth::usecase::face::{IdentifyFaceUseCase, UpdateFaceInput, UpdateFaceUseCase};

use crate::helpers::{
    MockCustomerTable, MockFacePort, MockUserRepo, descriptor, test_user, upload_path,
};

// ── IdentifyFaceUseCase ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_identify_face_in_image() {
    let uc = IdentifyFaceUseCase {
        faces: MockFacePort::detecting(descriptor(0.5)),
    };
    let path = upload_path();
    let found = uc.execute(Some(&path)).await.unwrap();
    assert_eq!(found, Some(descriptor(0.5)));
}

#[tokio::test]
async fn identify_reports_missing_face_as_none() {
    let uc = IdentifyFaceUseCase {
        faces: MockFacePort::no_face(),
    };
    let path = upload_path();
    assert_eq!(uc.execute(Some(&path)).await.unwrap(), None);
}

#[tokio::test]
async fn identify_requires_upload() {
    let uc = IdentifyFaceUseCase {
        faces: MockFacePort::no_face(),
    };
    let result = uc.execute(None).await;
    assert!(
        matches!(result, Err(AuthServiceError::NoFileUploaded)),
        "expected NoFileUploaded, got {result:?}"
    );
}

// ── UpdateFaceUseCase ────────────────────────────────────────────────────────

fn update_input(username: &str, with_image: bool) -> UpdateFaceInput {
    UpdateFaceInput {
        username: username.to_owned(),
        image: with_image.then(upload_path),
    }
}

#[tokio::test]
async fn should_replace_descriptor_and_complete_enrollment() {
    let users = MockUserRepo::new(vec![test_user("alice", Some(descriptor(0.0)))]);
    let stored_users = users.users_handle();
    let customers = MockCustomerTable::default();
    let records = customers.records_handle();
    let uc = UpdateFaceUseCase {
        users,
        customers,
        faces: MockFacePort::detecting(descriptor(0.75)),
    };

    let input = update_input("alice", true);
    let image_name = input
        .image
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap();
    uc.execute(input).await.unwrap();

    assert_eq!(
        stored_users.lock().unwrap()[0].descriptor,
        Some(descriptor(0.75))
    );
    let records = records.lock().unwrap();
    let record = records.get("alice").unwrap();
    assert!(record.completed);
    assert_eq!(record.image, image_name);
    assert_eq!(record.descriptor, descriptor(0.75).to_string());
}

#[tokio::test]
async fn should_overwrite_existing_enrollment() {
    let customers = MockCustomerTable::default();
    let records = customers.records_handle();
    let uc = UpdateFaceUseCase {
        users: MockUserRepo::new(vec![test_user("alice", None)]),
        customers,
        faces: MockFacePort::detecting(descriptor(0.5)),
    };

    uc.execute(update_input("alice", true)).await.unwrap();
    let first = records.lock().unwrap().get("alice").cloned().unwrap();
    uc.execute(update_input("alice", true)).await.unwrap();

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_ne!(records["alice"].image, first.image);
}

#[tokio::test]
async fn should_overwrite_record_created_by_concurrent_writer() {
    let stale = CustomerEnrollment {
        username: "alice".to_owned(),
        image: "older-upload".to_owned(),
        descriptor: descriptor(0.0).to_string(),
        completed: false,
        updated_at: Utc::now(),
    };
    let customers = MockCustomerTable {
        racing_writer: true,
        ..MockCustomerTable::with_record(stale)
    };
    let records = customers.records_handle();
    let uc = UpdateFaceUseCase {
        users: MockUserRepo::new(vec![test_user("alice", None)]),
        customers,
        faces: MockFacePort::detecting(descriptor(0.5)),
    };

    uc.execute(update_input("alice", true)).await.unwrap();

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    let record = &records["alice"];
    assert!(record.completed);
    assert_ne!(record.image, "older-upload");
    assert_eq!(record.descriptor, descriptor(0.5).to_string());
}

#[tokio::test]
async fn update_succeeds_when_enrollment_table_is_down() {
    let users = MockUserRepo::new(vec![test_user("alice", None)]);
    let stored_users = users.users_handle();
    let uc = UpdateFaceUseCase {
        users,
        customers: MockCustomerTable {
            unavailable: true,
            ..MockCustomerTable::default()
        },
        faces: MockFacePort::detecting(descriptor(0.5)),
    };

    uc.execute(update_input("alice", true)).await.unwrap();

    assert_eq!(stored_users.lock().unwrap()[0].descriptor, Some(descriptor(0.5)));
}

#[tokio::test]
async fn update_rejects_unknown_user_before_checking_image() {
    let uc = UpdateFaceUseCase {
        users: MockUserRepo::empty(),
        customers: MockCustomerTable::default(),
        faces: MockFacePort::detecting(descriptor(0.5)),
    };
    let result = uc.execute(update_input("ghost", false)).await;
    assert!(
        matches!(result, Err(AuthServiceError::InvalidUsername)),
        "expected InvalidUsername, got {result:?}"
    );
}

#[tokio::test]
async fn update_requires_image() {
    let uc = UpdateFaceUseCase {
        users: MockUserRepo::new(vec![test_user("alice", None)]),
        customers: MockCustomerTable::default(),
        faces: MockFacePort::detecting(descriptor(0.5)),
    };
    let result = uc.execute(update_input("alice", false)).await;
    assert!(
        matches!(result, Err(AuthServiceError::MissingImage)),
        "expected MissingImage, got {result:?}"
    );
}

#[tokio::test]
async fn update_rejects_image_without_face() {
    let users = MockUserRepo::new(vec![test_user("alice", Some(descriptor(0.0)))]);
    let stored_users = users.users_handle();
    let customers = MockCustomerTable::default();
    let records = customers.records_handle();
    let uc = UpdateFaceUseCase {
        users,
        customers,
        faces: MockFacePort::no_face(),
    };

    let result = uc.execute(update_input("alice", true)).await;

    assert!(
        matches!(result, Err(AuthServiceError::NoFaceDetected)),
        "expected NoFaceDetected, got {result:?}"
    );
    assert_eq!(stored_users.lock().unwrap()[0].descriptor, Some(descriptor(0.0)));
    assert!(records.lock().unwrap().is_empty());
}
