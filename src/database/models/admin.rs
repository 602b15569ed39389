use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Administrator account row from `mer_merchant_admin`.
///
/// The password hash never leaves the server: `pwd` is skipped on
/// serialization, so login responses carry the admin profile without it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MerchantAdmin {
    pub merchant_admin_id: i32,
    pub merchant_id: i32,
    pub account: String,
    pub phone: Option<String>,
    #[serde(skip_serializing, default)]
    pub pwd: String,
    pub real_name: Option<String>,
    /// 1 = enabled, anything else is disabled
    pub status: i16,
    /// 0 = live, 1 = deleted
    pub is_del: i16,
    pub login_count: i32,
    pub last_ip: Option<String>,
    pub last_time: Option<DateTime<Utc>>,
    pub create_time: Option<DateTime<Utc>>,
}

impl MerchantAdmin {
    pub fn is_enabled(&self) -> bool {
        self.status == 1
    }
}
