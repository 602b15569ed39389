use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Product row from `mer_store_product`. Soft-deleted rows carry a
/// `delete_at` timestamp and are excluded from all merchant-facing reads.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoreProduct {
    pub product_id: i32,
    pub merchant_id: i32,
    pub cate_id: i32,
    pub store_name: String,
    pub store_info: String,
    pub keyword: String,
    pub unit_name: String,
    pub sort: i32,
    /// 1 = listed, 0 = unlisted
    pub is_show: i16,
    /// true = on sale, false = sold out
    pub sale_status: Option<bool>,
    pub sales: i32,
    pub price: Option<f64>,
    pub cost: Option<f64>,
    pub ot_price: Option<f64>,
    pub is_good: bool,
    pub product_type: i32,
    pub image: String,
    pub slider_image: String,
    pub refund_switch: Option<i32>,
    pub bar_code_number: Option<String>,
    pub create_at: Option<DateTime<Utc>>,
    pub update_at: Option<DateTime<Utc>>,
    pub delete_at: Option<DateTime<Utc>>,
}

/// One-to-one rich-text description for a product.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductContent {
    pub product_id: i32,
    pub content: String,
}

/// Variant (SKU) row from `mer_store_product_sku`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductSku {
    pub product_sku_id: i32,
    pub product_id: i32,
    pub attr_name: Option<String>,
    pub price: Option<f64>,
    pub cost: Option<f64>,
    pub ot_price: Option<f64>,
    pub image: Option<String>,
}
