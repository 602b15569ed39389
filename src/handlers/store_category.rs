use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::catalog::CategoryFields;
use crate::error::ApiError;
use crate::middleware::AuthContext;
use crate::state::AppState;

use super::success;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

/// POST /mer_admin/store_category
pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(fields): Json<CategoryFields>,
) -> Result<Json<Value>, ApiError> {
    if fields.cate_name.is_empty() {
        return Err(ApiError::validation("cate_name is required"));
    }

    let category = state.categories.create(ctx.merchant_id, &fields).await?;
    Ok(success(category))
}

/// GET /mer_admin/store_category
pub async fn list(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let (list, total) = state
        .categories
        .list(ctx.merchant_id, query.page, query.page_size)
        .await?;

    Ok(success(json!({
        "list": list,
        "total": total,
        "page": query.page,
        "page_size": query.page_size,
    })))
}

/// GET /mer_admin/store_category/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let category = state.categories.get(id, ctx.merchant_id).await?;
    Ok(success(category))
}

/// PUT /mer_admin/store_category/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i32>,
    Json(fields): Json<CategoryFields>,
) -> Result<Json<Value>, ApiError> {
    if fields.cate_name.is_empty() {
        return Err(ApiError::validation("cate_name is required"));
    }

    state
        .categories
        .update(id, ctx.merchant_id, &fields)
        .await?;
    Ok(success(Value::Null))
}

/// DELETE /mer_admin/store_category/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    state.categories.delete(id, ctx.merchant_id).await?;
    Ok(success(Value::Null))
}
