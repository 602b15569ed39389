use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use crate::database::credentials::{CredentialStore, CredentialStoreError};
use crate::database::models::MerchantAdmin;

use super::password;
use super::session::{SessionRecord, SessionStore, SessionStoreError};
use super::token::{self, Claims, TokenError};

const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown account and wrong password collapse into this one variant so
    /// callers cannot enumerate accounts.
    #[error("invalid account or password")]
    InvalidCredentials,
    #[error("account has been disabled")]
    AccountDisabled,
    #[error("token is invalid or expired")]
    InvalidOrExpiredToken,
    #[error("token has been revoked")]
    TokenRevoked,
    #[error("login IP has changed")]
    IpChanged,
    #[error("token does not match the session")]
    TokenDataMismatch,
    #[error("session store error: {0}")]
    SessionStore(SessionStoreError),
    #[error("credential store error: {0}")]
    CredentialStore(#[from] CredentialStoreError),
    #[error("token error: {0}")]
    Token(#[from] TokenError),
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub admin_info: MerchantAdmin,
    pub expires_in: u64,
}

/// Orchestrates the session lifecycle: login issues a token and pins a
/// revocable session record to the client IP; verification requires the
/// token, the record, and the IP to agree; logout deletes the record.
///
/// Store handles are constructor-injected; there is no process-wide state.
pub struct SessionAuthority {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    secret: String,
    token_ttl: Duration,
}

impl SessionAuthority {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        secret: impl Into<String>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            credentials,
            sessions,
            secret: secret.into(),
            token_ttl,
        }
    }

    /// Authenticate by account (or phone) and password from `client_ip`.
    ///
    /// On success the session record is written before the token is
    /// returned; a token without its record would be dead on arrival. The
    /// login-bookkeeping update is best-effort and never fails the login.
    pub async fn login(
        &self,
        account: &str,
        pass: &str,
        client_ip: &str,
    ) -> Result<LoginResponse, AuthError> {
        let mut admin = self
            .credentials
            .find_by_login(account)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !admin.is_enabled() {
            return Err(AuthError::AccountDisabled);
        }

        if !password::verify_password(&admin.pwd, pass) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = token::issue(
            admin.merchant_admin_id,
            admin.merchant_id,
            &admin.account,
            ADMIN_ROLE,
            &self.secret,
            self.token_ttl.as_secs(),
        )?;

        self.sessions
            .put(
                &token,
                SessionRecord::new(admin.merchant_admin_id, client_ip),
                self.token_ttl,
            )
            .await
            .map_err(AuthError::SessionStore)?;

        if let Err(e) = self
            .credentials
            .record_login(admin.merchant_admin_id, client_ip, Utc::now())
            .await
        {
            tracing::warn!(
                admin_id = admin.merchant_admin_id,
                "failed to update login bookkeeping: {}",
                e
            );
        }

        admin.pwd.clear();
        Ok(LoginResponse {
            token,
            admin_info: admin,
            expires_in: self.token_ttl.as_secs(),
        })
    }

    /// Check all four clauses of the authentication invariant: signature and
    /// embedded expiry, session record presence, pinned IP, and subject
    /// agreement between record and claims. Each clause fails distinctly.
    pub async fn verify_token(&self, tok: &str, current_ip: &str) -> Result<Claims, AuthError> {
        let claims =
            token::verify(tok, &self.secret).map_err(|_| AuthError::InvalidOrExpiredToken)?;

        let record = match self.sessions.get(tok).await {
            Ok(Some(record)) => record,
            Ok(None) => return Err(AuthError::TokenRevoked),
            Err(SessionStoreError::Malformed) => return Err(AuthError::TokenDataMismatch),
            Err(e) => return Err(AuthError::SessionStore(e)),
        };

        if record.ip != current_ip {
            return Err(AuthError::IpChanged);
        }

        if record.admin_id != claims.admin_id {
            return Err(AuthError::TokenDataMismatch);
        }

        Ok(claims)
    }

    /// Delete the session record for `tok`. Idempotent: a second logout of
    /// the same token succeeds.
    pub async fn logout(&self, tok: &str) -> Result<(), AuthError> {
        self.sessions
            .delete(tok)
            .await
            .map_err(AuthError::SessionStore)
    }
}
