use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Store category row from `mer_store_category`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoreCategory {
    pub store_category_id: i32,
    pub merchant_id: i32,
    pub cate_name: String,
    pub pic: Option<String>,
    pub sort: i32,
    pub is_show: i16,
    pub create_time: Option<DateTime<Utc>>,
}
