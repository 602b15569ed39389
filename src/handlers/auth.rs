use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::middleware::auth::bearer_token;
use crate::middleware::client_ip;
use crate::state::AppState;

use super::success;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name or phone number
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub password: String,
}

/// POST /mer_admin/auth/login
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.account.is_empty() || req.password.is_empty() {
        return Err(ApiError::validation("account and password are required"));
    }

    let ip = client_ip(&headers, Some(&peer));
    let resp = state.auth.login(&req.account, &req.password, &ip).await?;

    tracing::info!(admin_id = resp.admin_info.merchant_admin_id, %ip, "admin logged in");
    Ok(success(resp))
}

/// POST /mer_admin/auth/logout - revoke the presented token. Requires only
/// the bearer header; the session record is deleted unconditionally.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let token = bearer_token(&headers)?;
    state.auth.logout(&token).await?;
    Ok(success(Value::Null))
}
