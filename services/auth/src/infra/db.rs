use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, SqlErr,
};
use uuid::Uuid;

use visage_auth_schema::users;
use visage_face::FaceDescriptor;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::AuthServiceError;

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find user by username")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &User) -> Result<(), AuthServiceError> {
        let result = users::ActiveModel {
            id: Set(user.id),
            username: Set(user.username.clone()),
            password_hash: Set(user.password_hash.clone()),
            name: Set(user.name.clone()),
            descriptor: Set(user.descriptor.as_ref().map(ToString::to_string)),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(AuthServiceError::UserAlreadyExists),
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }

    async fn update_descriptor(
        &self,
        username: &str,
        descriptor: &FaceDescriptor,
    ) -> Result<bool, AuthServiceError> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::Descriptor,
                sea_orm::sea_query::Expr::value(descriptor.to_string()),
            )
            .col_expr(
                users::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(Utc::now()),
            )
            .filter(users::Column::Username.eq(username))
            .exec(&self.db)
            .await
            .context("update user descriptor")?;
        Ok(result.rows_affected > 0)
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Map a row to the domain user. A corrupt stored descriptor is treated as
/// "not enrolled" so the user can still log in with a password and re-enrol.
fn user_from_model(model: users::Model) -> User {
    let descriptor = model.descriptor.as_deref().and_then(|raw| {
        raw.parse::<FaceDescriptor>()
            .inspect_err(|e| {
                tracing::warn!(username = %model.username, error = %e, "stored descriptor is invalid");
            })
            .ok()
    });
    User {
        id: model.id,
        username: model.username,
        password_hash: model.password_hash,
        name: model.name,
        descriptor,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
