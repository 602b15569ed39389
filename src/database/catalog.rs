use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;

use crate::services::reconcile::{SkuInput, SkuPlan};

use super::models::{ProductContent, ProductSku, StoreCategory, StoreProduct};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("catalog backend: {0}")]
    Backend(String),
}

/// Mutable parent columns of a product, as supplied by an upsert payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductFields {
    pub store_name: String,
    pub store_info: Option<String>,
    #[serde(default)]
    pub keyword: String,
    pub cate_id: i32,
    pub unit_name: String,
    #[serde(default)]
    pub sort: i32,
    pub price: Option<f64>,
    pub cost: Option<f64>,
    pub ot_price: Option<f64>,
    #[serde(default)]
    pub is_good: bool,
    #[serde(default)]
    pub product_type: i32,
    pub image: String,
    #[serde(default)]
    pub slider_image: String,
    pub refund_switch: Option<i32>,
    pub bar_code_number: Option<String>,
}

/// Category CRUD input.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryFields {
    pub cate_name: String,
    pub pic: Option<String>,
    #[serde(default)]
    pub sort: i32,
    #[serde(default = "default_is_show")]
    pub is_show: i16,
}

fn default_is_show() -> i16 {
    1
}

/// Paging plus the product list filters.
#[derive(Debug, Clone, Default)]
pub struct ProductListFilter {
    pub page: i64,
    pub page_size: i64,
    pub cate_id: Option<i32>,
    pub is_show: Option<i16>,
    pub sale_status: Option<bool>,
    pub keyword: Option<String>,
}

/// Relational store behind categories and product aggregates.
///
/// The two aggregate writes are each one atomic unit: parent write, then
/// content write, then child reconciliation, all inside a single
/// transaction in the Postgres implementation. Ownership checks live in the
/// service layer; row-level operations here are scoped by the ids they are
/// given.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn ping(&self) -> Result<(), CatalogError>;

    // -- categories --
    async fn create_category(
        &self,
        merchant_id: i32,
        fields: &CategoryFields,
    ) -> Result<StoreCategory, CatalogError>;
    async fn update_category(
        &self,
        id: i32,
        merchant_id: i32,
        fields: &CategoryFields,
    ) -> Result<(), CatalogError>;
    async fn delete_category(&self, id: i32, merchant_id: i32) -> Result<(), CatalogError>;
    async fn get_category(
        &self,
        id: i32,
        merchant_id: i32,
    ) -> Result<Option<StoreCategory>, CatalogError>;
    async fn find_category(&self, id: i32) -> Result<Option<StoreCategory>, CatalogError>;
    async fn list_categories(
        &self,
        merchant_id: i32,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<StoreCategory>, i64), CatalogError>;

    // -- product reads --
    /// Live (non-soft-deleted) product owned by the merchant.
    async fn find_product(
        &self,
        id: i32,
        merchant_id: i32,
    ) -> Result<Option<StoreProduct>, CatalogError>;
    async fn get_content(&self, product_id: i32) -> Result<Option<ProductContent>, CatalogError>;
    async fn list_skus(&self, product_id: i32) -> Result<Vec<ProductSku>, CatalogError>;
    async fn list_products(
        &self,
        merchant_id: i32,
        filter: &ProductListFilter,
    ) -> Result<(Vec<StoreProduct>, i64), CatalogError>;

    // -- atomic aggregate writes --
    async fn create_aggregate(
        &self,
        merchant_id: i32,
        fields: &ProductFields,
        content: &str,
        skus: &[SkuInput],
    ) -> Result<(StoreProduct, ProductContent, Vec<ProductSku>), CatalogError>;
    async fn update_aggregate(
        &self,
        product_id: i32,
        fields: &ProductFields,
        content: Option<&str>,
        plan: &SkuPlan,
    ) -> Result<(), CatalogError>;

    // -- product status writes --
    async fn soft_delete_product(&self, product_id: i32) -> Result<(), CatalogError>;
    async fn set_listing_status(&self, product_id: i32, is_show: i16) -> Result<(), CatalogError>;
    async fn set_sale_status(&self, product_id: i32, sale_status: bool)
        -> Result<(), CatalogError>;
}

const PRODUCT_COLUMNS: &str = r#"
    product_id, merchant_id, cate_id, store_name, store_info, keyword,
    unit_name, sort, is_show, sale_status, sales, price, cost, ot_price,
    is_good, product_type, image, slider_image, refund_switch,
    bar_code_number, create_at, update_at, delete_at
"#;

const SKU_COLUMNS: &str =
    "product_sku_id, product_id, attr_name, price, cost, ot_price, image";

const CATEGORY_COLUMNS: &str =
    "store_category_id, merchant_id, cate_name, pic, sort, is_show, create_time";

pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn ping(&self) -> Result<(), CatalogError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_category(
        &self,
        merchant_id: i32,
        fields: &CategoryFields,
    ) -> Result<StoreCategory, CatalogError> {
        let query = format!(
            r#"
            INSERT INTO mer_store_category (merchant_id, cate_name, pic, sort, is_show, create_time)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CATEGORY_COLUMNS}
            "#
        );

        let category = sqlx::query_as::<_, StoreCategory>(&query)
            .bind(merchant_id)
            .bind(&fields.cate_name)
            .bind(&fields.pic)
            .bind(fields.sort)
            .bind(fields.is_show)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        Ok(category)
    }

    async fn update_category(
        &self,
        id: i32,
        merchant_id: i32,
        fields: &CategoryFields,
    ) -> Result<(), CatalogError> {
        let query = r#"
            UPDATE mer_store_category
            SET cate_name = $3, pic = $4, sort = $5, is_show = $6
            WHERE store_category_id = $1 AND merchant_id = $2
        "#;

        let result = sqlx::query(query)
            .bind(id)
            .bind(merchant_id)
            .bind(&fields.cate_name)
            .bind(&fields.pic)
            .bind(fields.sort)
            .bind(fields.is_show)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound);
        }
        Ok(())
    }

    async fn delete_category(&self, id: i32, merchant_id: i32) -> Result<(), CatalogError> {
        let result =
            sqlx::query("DELETE FROM mer_store_category WHERE store_category_id = $1 AND merchant_id = $2")
                .bind(id)
                .bind(merchant_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound);
        }
        Ok(())
    }

    async fn get_category(
        &self,
        id: i32,
        merchant_id: i32,
    ) -> Result<Option<StoreCategory>, CatalogError> {
        let query = format!(
            "SELECT {CATEGORY_COLUMNS} FROM mer_store_category WHERE store_category_id = $1 AND merchant_id = $2"
        );
        let category = sqlx::query_as::<_, StoreCategory>(&query)
            .bind(id)
            .bind(merchant_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn find_category(&self, id: i32) -> Result<Option<StoreCategory>, CatalogError> {
        let query = format!(
            "SELECT {CATEGORY_COLUMNS} FROM mer_store_category WHERE store_category_id = $1"
        );
        let category = sqlx::query_as::<_, StoreCategory>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn list_categories(
        &self,
        merchant_id: i32,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<StoreCategory>, i64), CatalogError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM mer_store_category WHERE merchant_id = $1")
                .bind(merchant_id)
                .fetch_one(&self.pool)
                .await?;

        let query = format!(
            r#"
            SELECT {CATEGORY_COLUMNS} FROM mer_store_category
            WHERE merchant_id = $1
            ORDER BY sort DESC, store_category_id DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let list = sqlx::query_as::<_, StoreCategory>(&query)
            .bind(merchant_id)
            .bind(page_size)
            .bind((page - 1) * page_size)
            .fetch_all(&self.pool)
            .await?;
        Ok((list, total))
    }

    async fn find_product(
        &self,
        id: i32,
        merchant_id: i32,
    ) -> Result<Option<StoreProduct>, CatalogError> {
        let query = format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM mer_store_product
            WHERE product_id = $1 AND merchant_id = $2 AND delete_at IS NULL
            "#
        );
        let product = sqlx::query_as::<_, StoreProduct>(&query)
            .bind(id)
            .bind(merchant_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    async fn get_content(&self, product_id: i32) -> Result<Option<ProductContent>, CatalogError> {
        let content = sqlx::query_as::<_, ProductContent>(
            "SELECT product_id, content FROM mer_store_product_content WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(content)
    }

    async fn list_skus(&self, product_id: i32) -> Result<Vec<ProductSku>, CatalogError> {
        let query = format!(
            "SELECT {SKU_COLUMNS} FROM mer_store_product_sku WHERE product_id = $1 ORDER BY product_sku_id"
        );
        let skus = sqlx::query_as::<_, ProductSku>(&query)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(skus)
    }

    async fn list_products(
        &self,
        merchant_id: i32,
        filter: &ProductListFilter,
    ) -> Result<(Vec<StoreProduct>, i64), CatalogError> {
        fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, merchant_id: i32, filter: &ProductListFilter) {
            qb.push(" WHERE merchant_id = ").push_bind(merchant_id);
            qb.push(" AND delete_at IS NULL");
            if let Some(cate_id) = filter.cate_id {
                qb.push(" AND cate_id = ").push_bind(cate_id);
            }
            if let Some(is_show) = filter.is_show {
                qb.push(" AND is_show = ").push_bind(is_show);
            }
            if let Some(sale_status) = filter.sale_status {
                qb.push(" AND sale_status = ").push_bind(sale_status);
            }
            if let Some(keyword) = filter.keyword.as_deref().filter(|k| !k.is_empty()) {
                qb.push(" AND store_name LIKE ").push_bind(format!("%{}%", keyword));
            }
        }

        let mut count_qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM mer_store_product");
        push_filters(&mut count_qb, merchant_id, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut list_qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM mer_store_product"));
        push_filters(&mut list_qb, merchant_id, filter);
        list_qb.push(" ORDER BY sort DESC, product_id DESC");
        list_qb.push(" LIMIT ").push_bind(filter.page_size);
        list_qb
            .push(" OFFSET ")
            .push_bind((filter.page - 1) * filter.page_size);

        let list = list_qb
            .build_query_as::<StoreProduct>()
            .fetch_all(&self.pool)
            .await?;
        Ok((list, total))
    }

    async fn create_aggregate(
        &self,
        merchant_id: i32,
        fields: &ProductFields,
        content: &str,
        skus: &[SkuInput],
    ) -> Result<(StoreProduct, ProductContent, Vec<ProductSku>), CatalogError> {
        let mut tx = self.pool.begin().await?;

        // Parent first: children need its generated id
        let insert_product = format!(
            r#"
            INSERT INTO mer_store_product (
                merchant_id, cate_id, store_name, store_info, keyword, unit_name,
                sort, is_show, sale_status, sales, price, cost, ot_price, is_good,
                product_type, image, slider_image, refund_switch, bar_code_number,
                create_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 1, TRUE, 0, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let product = sqlx::query_as::<_, StoreProduct>(&insert_product)
            .bind(merchant_id)
            .bind(fields.cate_id)
            .bind(&fields.store_name)
            .bind(fields.store_info.as_deref().unwrap_or_default())
            .bind(&fields.keyword)
            .bind(&fields.unit_name)
            .bind(fields.sort)
            .bind(fields.price)
            .bind(fields.cost)
            .bind(fields.ot_price)
            .bind(fields.is_good)
            .bind(fields.product_type)
            .bind(&fields.image)
            .bind(&fields.slider_image)
            .bind(fields.refund_switch)
            .bind(&fields.bar_code_number)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        let stored_content = sqlx::query_as::<_, ProductContent>(
            r#"
            INSERT INTO mer_store_product_content (product_id, content)
            VALUES ($1, $2)
            RETURNING product_id, content
            "#,
        )
        .bind(product.product_id)
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;

        let insert_sku = format!(
            r#"
            INSERT INTO mer_store_product_sku (product_id, attr_name, price, cost, ot_price, image)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SKU_COLUMNS}
            "#
        );
        let mut stored_skus = Vec::with_capacity(skus.len());
        for sku in skus {
            let row = sqlx::query_as::<_, ProductSku>(&insert_sku)
                .bind(product.product_id)
                .bind(&sku.attr_name)
                .bind(sku.price)
                .bind(sku.cost)
                .bind(sku.ot_price)
                .bind(&sku.image)
                .fetch_one(&mut *tx)
                .await?;
            stored_skus.push(row);
        }

        tx.commit().await?;
        Ok((product, stored_content, stored_skus))
    }

    async fn update_aggregate(
        &self,
        product_id: i32,
        fields: &ProductFields,
        content: Option<&str>,
        plan: &SkuPlan,
    ) -> Result<(), CatalogError> {
        let mut tx = self.pool.begin().await?;

        // Serialize concurrent updates of one aggregate on its root row
        let locked =
            sqlx::query("SELECT product_id FROM mer_store_product WHERE product_id = $1 FOR UPDATE")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(CatalogError::NotFound);
        }

        let update_product = r#"
            UPDATE mer_store_product
            SET store_name = $2,
                store_info = COALESCE($3, store_info),
                keyword = $4,
                cate_id = $5,
                unit_name = $6,
                sort = $7,
                price = $8,
                cost = $9,
                ot_price = $10,
                is_good = $11,
                product_type = $12,
                image = $13,
                slider_image = $14,
                refund_switch = $15,
                bar_code_number = $16,
                update_at = $17
            WHERE product_id = $1
        "#;
        sqlx::query(update_product)
            .bind(product_id)
            .bind(&fields.store_name)
            .bind(&fields.store_info)
            .bind(&fields.keyword)
            .bind(fields.cate_id)
            .bind(&fields.unit_name)
            .bind(fields.sort)
            .bind(fields.price)
            .bind(fields.cost)
            .bind(fields.ot_price)
            .bind(fields.is_good)
            .bind(fields.product_type)
            .bind(&fields.image)
            .bind(&fields.slider_image)
            .bind(fields.refund_switch)
            .bind(&fields.bar_code_number)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        if let Some(content) = content {
            sqlx::query(
                "UPDATE mer_store_product_content SET content = $2 WHERE product_id = $1",
            )
            .bind(product_id)
            .bind(content)
            .execute(&mut *tx)
            .await?;
        }

        for &sku_id in &plan.delete_ids {
            sqlx::query(
                "DELETE FROM mer_store_product_sku WHERE product_sku_id = $1 AND product_id = $2",
            )
            .bind(sku_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        }

        for sku in &plan.updates {
            sqlx::query(
                r#"
                UPDATE mer_store_product_sku
                SET attr_name = $3, price = $4, cost = $5, ot_price = $6, image = $7
                WHERE product_sku_id = $1 AND product_id = $2
                "#,
            )
            .bind(sku.product_sku_id)
            .bind(product_id)
            .bind(&sku.attr_name)
            .bind(sku.price)
            .bind(sku.cost)
            .bind(sku.ot_price)
            .bind(&sku.image)
            .execute(&mut *tx)
            .await?;
        }

        for sku in &plan.inserts {
            sqlx::query(
                r#"
                INSERT INTO mer_store_product_sku (product_id, attr_name, price, cost, ot_price, image)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(product_id)
            .bind(&sku.attr_name)
            .bind(sku.price)
            .bind(sku.cost)
            .bind(sku.ot_price)
            .bind(&sku.image)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn soft_delete_product(&self, product_id: i32) -> Result<(), CatalogError> {
        let result =
            sqlx::query("UPDATE mer_store_product SET delete_at = $2 WHERE product_id = $1")
                .bind(product_id)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound);
        }
        Ok(())
    }

    async fn set_listing_status(&self, product_id: i32, is_show: i16) -> Result<(), CatalogError> {
        let result = sqlx::query("UPDATE mer_store_product SET is_show = $2 WHERE product_id = $1")
            .bind(product_id)
            .bind(is_show)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound);
        }
        Ok(())
    }

    async fn set_sale_status(
        &self,
        product_id: i32,
        sale_status: bool,
    ) -> Result<(), CatalogError> {
        let result =
            sqlx::query("UPDATE mer_store_product SET sale_status = $2 WHERE product_id = $1")
                .bind(product_id)
                .bind(sale_status)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound);
        }
        Ok(())
    }
}
