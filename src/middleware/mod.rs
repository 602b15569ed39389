pub mod auth;
pub mod client_ip;

pub use auth::{admin_auth_middleware, AuthContext};
pub use client_ip::client_ip;
