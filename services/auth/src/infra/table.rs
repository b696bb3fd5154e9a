use anyhow::Context as _;
use deadpool_redis::Pool;
use deadpool_redis::redis::{self, AsyncCommands};

use crate::domain::repository::CustomerRepository;
use crate::domain::types::CustomerEnrollment;
use crate::error::AuthServiceError;

/// Customer enrollments stored as one JSON document per username.
#[derive(Clone)]
pub struct RedisCustomerTable {
    pub pool: Pool,
}

fn customer_key(username: &str) -> String {
    format!("customer:{username}")
}

impl RedisCustomerTable {
    async fn conn(&self) -> Result<deadpool_redis::Connection, AuthServiceError> {
        self.pool
            .get()
            .await
            .map_err(|e| AuthServiceError::Internal(e.into()))
    }

    /// `SET key value <NX|XX>`; `true` when the write happened.
    async fn set_conditional(
        &self,
        record: &CustomerEnrollment,
        condition: &str,
    ) -> Result<bool, AuthServiceError> {
        let payload = serde_json::to_string(record).context("encode customer enrollment")?;
        let mut conn = self.conn().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(customer_key(&record.username))
            .arg(payload)
            .arg(condition)
            .query_async(&mut conn)
            .await
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        Ok(reply.is_some())
    }
}

impl CustomerRepository for RedisCustomerTable {
    async fn find(&self, username: &str) -> Result<Option<CustomerEnrollment>, AuthServiceError> {
        let mut conn = self.conn().await?;
        let value: Option<String> = conn
            .get(customer_key(username))
            .await
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        value
            .map(|raw| serde_json::from_str(&raw).context("decode customer enrollment"))
            .transpose()
            .map_err(AuthServiceError::from)
    }

    async fn create(&self, record: &CustomerEnrollment) -> Result<bool, AuthServiceError> {
        self.set_conditional(record, "NX").await
    }

    async fn update(&self, record: &CustomerEnrollment) -> Result<bool, AuthServiceError> {
        self.set_conditional(record, "XX").await
    }
}
