use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

pub mod auth;
pub mod health;
pub mod store_category;
pub mod store_product;

/// Standard success envelope: `{ "success": true, "data": ... }`.
pub fn success(data: impl Serialize) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": data,
    }))
}
