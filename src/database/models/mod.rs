pub mod admin;
pub mod category;
pub mod product;

pub use admin::MerchantAdmin;
pub use category::StoreCategory;
pub use product::{ProductContent, ProductSku, StoreProduct};
