use std::sync::Arc;

use crate::database::catalog::{CatalogError, CatalogStore, CategoryFields};
use crate::database::models::StoreCategory;

/// Merchant-scoped category CRUD. Every operation is restricted to the
/// caller's merchant; a miss and a foreign row are indistinguishable.
pub struct CategoryService {
    store: Arc<dyn CatalogStore>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        merchant_id: i32,
        fields: &CategoryFields,
    ) -> Result<StoreCategory, CatalogError> {
        self.store.create_category(merchant_id, fields).await
    }

    pub async fn update(
        &self,
        id: i32,
        merchant_id: i32,
        fields: &CategoryFields,
    ) -> Result<(), CatalogError> {
        self.store.update_category(id, merchant_id, fields).await
    }

    pub async fn delete(&self, id: i32, merchant_id: i32) -> Result<(), CatalogError> {
        self.store.delete_category(id, merchant_id).await
    }

    pub async fn get(&self, id: i32, merchant_id: i32) -> Result<StoreCategory, CatalogError> {
        self.store
            .get_category(id, merchant_id)
            .await?
            .ok_or(CatalogError::NotFound)
    }

    pub async fn list(
        &self,
        merchant_id: i32,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<StoreCategory>, i64), CatalogError> {
        self.store
            .list_categories(merchant_id, page.max(1), page_size.clamp(1, 100))
            .await
    }
}
