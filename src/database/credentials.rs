use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;

use super::models::MerchantAdmin;

#[derive(Debug, Error)]
pub enum CredentialStoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("credential store backend: {0}")]
    Backend(String),
}

/// Read-mostly view of the administrator table. `record_login` is the one
/// write: login bookkeeping, best-effort by contract of the caller.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a live account by login name or phone number.
    async fn find_by_login(
        &self,
        account: &str,
    ) -> Result<Option<MerchantAdmin>, CredentialStoreError>;

    /// Update last-login bookkeeping (IP, time, counter).
    async fn record_login(
        &self,
        admin_id: i32,
        ip: &str,
        at: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError>;
}

pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_login(
        &self,
        account: &str,
    ) -> Result<Option<MerchantAdmin>, CredentialStoreError> {
        let query = r#"
            SELECT
                merchant_admin_id, merchant_id, account, phone, pwd, real_name,
                status, is_del, login_count, last_ip, last_time, create_time
            FROM mer_merchant_admin
            WHERE (account = $1 OR phone = $1)
              AND is_del = 0
        "#;

        let admin = sqlx::query_as::<_, MerchantAdmin>(query)
            .bind(account)
            .fetch_optional(&self.pool)
            .await?;
        Ok(admin)
    }

    async fn record_login(
        &self,
        admin_id: i32,
        ip: &str,
        at: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError> {
        let query = r#"
            UPDATE mer_merchant_admin
            SET last_ip = $2,
                last_time = $3,
                login_count = login_count + 1
            WHERE merchant_admin_id = $1
        "#;

        sqlx::query(query)
            .bind(admin_id)
            .bind(ip)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
