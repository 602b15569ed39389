use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::catalog::{
    CatalogError, CatalogStore, ProductFields, ProductListFilter,
};
use crate::database::models::{ProductContent, ProductSku, StoreCategory, StoreProduct};

use super::reconcile::{self, ReconcileError, SkuInput};

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("category not found or access denied")]
    CategoryNotFoundOrForbidden,
    #[error("product not found or access denied")]
    NotFoundOrForbidden,
    #[error("sku {0} does not belong to this product")]
    UnknownSku(i32),
    #[error(transparent)]
    Store(#[from] CatalogError),
}

impl From<ReconcileError> for ProductError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::UnknownChildId(id) => ProductError::UnknownSku(id),
        }
    }
}

/// Upsert payload: parent columns, the one-to-one content record, and the
/// desired SKU list.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertProductRequest {
    #[serde(flatten)]
    pub fields: ProductFields,
    pub content: Option<String>,
    pub skus: Vec<SkuInput>,
}

/// A product with its related records, as returned by the read and create
/// endpoints.
#[derive(Debug, Serialize)]
pub struct ProductAggregate {
    #[serde(flatten)]
    pub product: StoreProduct,
    pub category: Option<StoreCategory>,
    pub content: Option<ProductContent>,
    pub skus: Vec<ProductSku>,
}

/// Writes a product and its child records as one unit.
///
/// Ownership checks run before any transaction opens; the store then
/// applies parent, content, and the reconciled SKU set atomically.
pub struct ProductService {
    store: Arc<dyn CatalogStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Create a product aggregate. Fails fast if the category does not
    /// belong to the merchant.
    pub async fn create(
        &self,
        merchant_id: i32,
        req: &UpsertProductRequest,
    ) -> Result<ProductAggregate, ProductError> {
        let category = self
            .store
            .get_category(req.fields.cate_id, merchant_id)
            .await?
            .ok_or(ProductError::CategoryNotFoundOrForbidden)?;

        let (product, content, skus) = self
            .store
            .create_aggregate(
                merchant_id,
                &req.fields,
                req.content.as_deref().unwrap_or_default(),
                &req.skus,
            )
            .await?;

        Ok(ProductAggregate {
            product,
            category: Some(category),
            content: Some(content),
            skus,
        })
    }

    /// Update a product aggregate, reconciling its SKU list against the
    /// desired one: existing rows missing from the payload are deleted,
    /// rows with an id are updated in place, rows without an id are
    /// inserted. A payload id that is not among this product's SKUs is
    /// rejected before any write.
    pub async fn update(
        &self,
        product_id: i32,
        merchant_id: i32,
        req: &UpsertProductRequest,
    ) -> Result<(), ProductError> {
        self.store
            .find_product(product_id, merchant_id)
            .await?
            .ok_or(ProductError::NotFoundOrForbidden)?;

        self.store
            .get_category(req.fields.cate_id, merchant_id)
            .await?
            .ok_or(ProductError::CategoryNotFoundOrForbidden)?;

        let existing = self.store.list_skus(product_id).await?;
        let existing_ids: Vec<i32> = existing.iter().map(|s| s.product_sku_id).collect();
        let plan = reconcile::plan(&existing_ids, &req.skus)?;

        self.store
            .update_aggregate(product_id, &req.fields, req.content.as_deref(), &plan)
            .await?;
        Ok(())
    }

    /// Soft-delete a product after the ownership check.
    pub async fn delete(&self, product_id: i32, merchant_id: i32) -> Result<(), ProductError> {
        self.store
            .find_product(product_id, merchant_id)
            .await?
            .ok_or(ProductError::NotFoundOrForbidden)?;
        self.store.soft_delete_product(product_id).await?;
        Ok(())
    }

    pub async fn get(
        &self,
        product_id: i32,
        merchant_id: i32,
    ) -> Result<ProductAggregate, ProductError> {
        let product = self
            .store
            .find_product(product_id, merchant_id)
            .await?
            .ok_or(ProductError::NotFoundOrForbidden)?;

        self.assemble(product).await
    }

    pub async fn list(
        &self,
        merchant_id: i32,
        filter: &ProductListFilter,
    ) -> Result<(Vec<ProductAggregate>, i64), ProductError> {
        let mut filter = filter.clone();
        filter.page = filter.page.max(1);
        filter.page_size = filter.page_size.clamp(1, 100);

        let (products, total) = self.store.list_products(merchant_id, &filter).await?;

        let mut list = Vec::with_capacity(products.len());
        for product in products {
            list.push(self.assemble(product).await?);
        }
        Ok((list, total))
    }

    pub async fn set_listing_status(
        &self,
        product_id: i32,
        merchant_id: i32,
        is_show: i16,
    ) -> Result<(), ProductError> {
        self.store
            .find_product(product_id, merchant_id)
            .await?
            .ok_or(ProductError::NotFoundOrForbidden)?;
        self.store.set_listing_status(product_id, is_show).await?;
        Ok(())
    }

    pub async fn set_sale_status(
        &self,
        product_id: i32,
        merchant_id: i32,
        sale_status: bool,
    ) -> Result<(), ProductError> {
        self.store
            .find_product(product_id, merchant_id)
            .await?
            .ok_or(ProductError::NotFoundOrForbidden)?;
        self.store.set_sale_status(product_id, sale_status).await?;
        Ok(())
    }

    async fn assemble(&self, product: StoreProduct) -> Result<ProductAggregate, ProductError> {
        let category = self.store.find_category(product.cate_id).await?;
        let content = self.store.get_content(product.product_id).await?;
        let skus = self.store.list_skus(product.product_id).await?;
        Ok(ProductAggregate {
            product,
            category,
            content,
            skus,
        })
    }
}
