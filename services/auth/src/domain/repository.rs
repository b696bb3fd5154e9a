#![allow(async_fn_in_trait)]

use std::path::Path;

use uuid::Uuid;

use visage_face::FaceDescriptor;

use crate::domain::types::{CustomerEnrollment, User};
use crate::error::AuthServiceError;

/// Repository for registered users.
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError>;

    /// Insert a new user. A duplicate username yields `UserAlreadyExists`.
    async fn create(&self, user: &User) -> Result<(), AuthServiceError>;

    /// Replace the enrolled face of `username`. Returns `false` if no such user.
    async fn update_descriptor(
        &self,
        username: &str,
        descriptor: &FaceDescriptor,
    ) -> Result<bool, AuthServiceError>;
}

/// Key-value table of face enrollments, keyed by username.
pub trait CustomerRepository: Send + Sync {
    async fn find(&self, username: &str) -> Result<Option<CustomerEnrollment>, AuthServiceError>;

    /// Insert a record. Returns `false` if the key already exists.
    async fn create(&self, record: &CustomerEnrollment) -> Result<bool, AuthServiceError>;

    /// Overwrite an existing record. Returns `false` if the key is absent.
    async fn update(&self, record: &CustomerEnrollment) -> Result<bool, AuthServiceError>;
}

/// Port to the face detection engine.
pub trait FacePort: Send + Sync {
    /// Descriptor of the most prominent face in the image file, `None` if there is none.
    async fn describe(&self, image: &Path) -> Result<Option<FaceDescriptor>, AuthServiceError>;
}
