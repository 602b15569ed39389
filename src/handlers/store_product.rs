use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::catalog::ProductListFilter;
use crate::error::ApiError;
use crate::middleware::AuthContext;
use crate::services::UpsertProductRequest;
use crate::state::AppState;

use super::success;

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub cate_id: Option<i32>,
    pub is_show: Option<i16>,
    pub sale_status: Option<bool>,
    pub keyword: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

impl From<ProductListQuery> for ProductListFilter {
    fn from(query: ProductListQuery) -> Self {
        ProductListFilter {
            page: query.page,
            page_size: query.page_size,
            cate_id: query.cate_id,
            is_show: query.is_show,
            sale_status: query.sale_status,
            keyword: query.keyword,
        }
    }
}

fn validate_upsert(req: &UpsertProductRequest) -> Result<(), ApiError> {
    if req.fields.store_name.is_empty() {
        return Err(ApiError::validation("store_name is required"));
    }
    if req.fields.unit_name.is_empty() {
        return Err(ApiError::validation("unit_name is required"));
    }
    if req.fields.image.is_empty() {
        return Err(ApiError::validation("image is required"));
    }
    if req.fields.cate_id <= 0 {
        return Err(ApiError::validation("cate_id is required"));
    }
    if req.skus.is_empty() {
        return Err(ApiError::validation("at least one sku is required"));
    }
    Ok(())
}

/// POST /mer_admin/store_product
pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<UpsertProductRequest>,
) -> Result<Json<Value>, ApiError> {
    validate_upsert(&req)?;

    let aggregate = state.products.create(ctx.merchant_id, &req).await?;
    tracing::info!(
        merchant_id = ctx.merchant_id,
        product_id = aggregate.product.product_id,
        "product created"
    );
    Ok(success(aggregate))
}

/// PUT /mer_admin/store_product/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i32>,
    Json(req): Json<UpsertProductRequest>,
) -> Result<Json<Value>, ApiError> {
    validate_upsert(&req)?;

    state.products.update(id, ctx.merchant_id, &req).await?;
    Ok(success(Value::Null))
}

/// DELETE /mer_admin/store_product/:id - soft delete
pub async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    state.products.delete(id, ctx.merchant_id).await?;
    Ok(success(Value::Null))
}

/// GET /mer_admin/store_product/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let aggregate = state.products.get(id, ctx.merchant_id).await?;
    Ok(success(aggregate))
}

/// GET /mer_admin/store_product
pub async fn list(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Value>, ApiError> {
    let page = query.page;
    let page_size = query.page_size;
    let (list, total) = state
        .products
        .list(ctx.merchant_id, &query.into())
        .await?;

    Ok(success(json!({
        "list": list,
        "total": total,
        "page": page,
        "page_size": page_size,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ListingStatusRequest {
    pub is_show: i16,
}

/// PUT /mer_admin/store_product/:id/listing_status
pub async fn update_listing_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i32>,
    Json(req): Json<ListingStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.is_show != 0 && req.is_show != 1 {
        return Err(ApiError::validation("is_show must be 0 or 1"));
    }

    state
        .products
        .set_listing_status(id, ctx.merchant_id, req.is_show)
        .await?;
    Ok(success(Value::Null))
}

#[derive(Debug, Deserialize)]
pub struct SoldOutStatusRequest {
    pub sale_status: bool,
}

/// PUT /mer_admin/store_product/:id/sold_out_status
pub async fn update_sold_out_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i32>,
    Json(req): Json<SoldOutStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .products
        .set_sale_status(id, ctx.merchant_id, req.sale_status)
        .await?;
    Ok(success(Value::Null))
}
