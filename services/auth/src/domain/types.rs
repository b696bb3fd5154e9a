use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use visage_face::FaceDescriptor;

/// Registered account as the auth flows see it.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub name: String,
    /// Enrolled face, if any.
    pub descriptor: Option<FaceDescriptor>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            name: self.name.clone(),
        }
    }
}

/// Public subset of [`User`] returned to clients and embedded in tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub name: String,
}

/// Face enrollment record kept in the key-value table, keyed by username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerEnrollment {
    pub username: String,
    /// File name of the uploaded image in the upload directory.
    pub image: String,
    /// Serialized face descriptor.
    pub descriptor: String,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}

/// Minimum length of username, password and display name.
pub const MIN_FIELD_LEN: usize = 1;
