use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::AppState;

use super::client_ip::client_ip;

/// Authenticated request context extracted from a verified session.
/// Passed to handlers as a typed extension, never as loose key/value pairs.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub admin_id: i32,
    pub merchant_id: i32,
    pub username: String,
    pub role: String,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            admin_id: claims.admin_id,
            merchant_id: claims.merchant_id,
            username: claims.username,
            role: claims.role,
        }
    }
}

/// Admin authentication middleware: bearer extraction, then the full
/// session check (token signature and expiry, session record, pinned IP,
/// subject agreement) before the request reaches a handler.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?;

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let current_ip = client_ip(request.headers(), peer.as_ref());

    let claims = state.auth.verify_token(&token, &current_ip).await?;

    request.extensions_mut().insert(AuthContext::from(claims));
    Ok(next.run(request).await)
}

/// Extract the credential from an `Authorization: Bearer <token>` header.
/// Rejected here, before any verification logic runs.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthorized("missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("invalid Authorization header"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err(ApiError::unauthorized("empty bearer token")),
        None => Err(ApiError::unauthorized(
            "Authorization header must use the Bearer scheme",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn rejects_missing_header() {
        let headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());
    }

    #[test]
    fn rejects_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Token abc"));
        assert!(bearer_token(&headers).is_err());
    }

    #[test]
    fn rejects_empty_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert!(bearer_token(&headers).is_err());
    }
}
