use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use merchant_api::app::app;
use merchant_api::auth::password::hash_password;
use merchant_api::auth::{MemorySessionStore, SessionAuthority};
use merchant_api::database::catalog::{
    CatalogError, CatalogStore, CategoryFields, ProductFields, ProductListFilter,
};
use merchant_api::database::credentials::{CredentialStore, CredentialStoreError};
use merchant_api::database::models::{
    MerchantAdmin, ProductContent, ProductSku, StoreCategory, StoreProduct,
};
use merchant_api::services::reconcile::{SkuInput, SkuPlan};
use merchant_api::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Seedable credential store backed by a map, mirroring the live table's
/// lookup semantics (account or phone, live rows only).
pub struct MemoryCredentialStore {
    admins: Mutex<HashMap<i32, MerchantAdmin>>,
    next_id: AtomicI32,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            admins: Mutex::new(HashMap::new()),
            next_id: AtomicI32::new(1),
        }
    }

    /// Insert an admin with a freshly hashed password; returns its id.
    pub async fn seed_admin(
        &self,
        merchant_id: i32,
        account: &str,
        password: &str,
        status: i16,
    ) -> i32 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let admin = MerchantAdmin {
            merchant_admin_id: id,
            merchant_id,
            account: account.to_string(),
            phone: None,
            pwd: hash_password(password).expect("hash password"),
            real_name: None,
            status,
            is_del: 0,
            login_count: 0,
            last_ip: None,
            last_time: None,
            create_time: Some(Utc::now()),
        };
        self.admins.lock().await.insert(id, admin);
        id
    }

    pub async fn set_status(&self, admin_id: i32, status: i16) {
        if let Some(admin) = self.admins.lock().await.get_mut(&admin_id) {
            admin.status = status;
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_login(
        &self,
        account: &str,
    ) -> Result<Option<MerchantAdmin>, CredentialStoreError> {
        let admins = self.admins.lock().await;
        Ok(admins
            .values()
            .find(|a| {
                a.is_del == 0 && (a.account == account || a.phone.as_deref() == Some(account))
            })
            .cloned())
    }

    async fn record_login(
        &self,
        admin_id: i32,
        ip: &str,
        at: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError> {
        let mut admins = self.admins.lock().await;
        if let Some(admin) = admins.get_mut(&admin_id) {
            admin.last_ip = Some(ip.to_string());
            admin.last_time = Some(at);
            admin.login_count += 1;
        }
        Ok(())
    }
}

#[derive(Default, Clone)]
struct CatalogState {
    categories: HashMap<i32, StoreCategory>,
    products: HashMap<i32, StoreProduct>,
    contents: HashMap<i32, ProductContent>,
    skus: HashMap<i32, ProductSku>,
    next_category_id: i32,
    next_product_id: i32,
    next_sku_id: i32,
}

/// In-memory catalog with the same observable semantics as the Postgres
/// store. Aggregate writes are applied to a working copy and committed in
/// one swap, so a failure mid-write leaves nothing behind; setting
/// `fail_on_sku_insert` forces such a failure at the child-insert step.
pub struct MemoryCatalogStore {
    state: Mutex<CatalogState>,
    pub fail_on_sku_insert: AtomicBool,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CatalogState {
                next_category_id: 1,
                next_product_id: 1,
                next_sku_id: 1,
                ..CatalogState::default()
            }),
            fail_on_sku_insert: AtomicBool::new(false),
        }
    }

    fn apply_parent(product: &mut StoreProduct, fields: &ProductFields) {
        product.store_name = fields.store_name.clone();
        if let Some(info) = &fields.store_info {
            product.store_info = info.clone();
        }
        product.keyword = fields.keyword.clone();
        product.cate_id = fields.cate_id;
        product.unit_name = fields.unit_name.clone();
        product.sort = fields.sort;
        product.price = fields.price;
        product.cost = fields.cost;
        product.ot_price = fields.ot_price;
        product.is_good = fields.is_good;
        product.product_type = fields.product_type;
        product.image = fields.image.clone();
        product.slider_image = fields.slider_image.clone();
        product.refund_switch = fields.refund_switch;
        product.bar_code_number = fields.bar_code_number.clone();
        product.update_at = Some(Utc::now());
    }

    fn insert_sku(
        work: &mut CatalogState,
        product_id: i32,
        sku: &SkuInput,
    ) -> ProductSku {
        let id = work.next_sku_id;
        work.next_sku_id += 1;
        let row = ProductSku {
            product_sku_id: id,
            product_id,
            attr_name: sku.attr_name.clone(),
            price: Some(sku.price),
            cost: sku.cost,
            ot_price: sku.ot_price,
            image: sku.image.clone(),
        };
        work.skus.insert(id, row.clone());
        row
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn ping(&self) -> Result<(), CatalogError> {
        Ok(())
    }

    async fn create_category(
        &self,
        merchant_id: i32,
        fields: &CategoryFields,
    ) -> Result<StoreCategory, CatalogError> {
        let mut state = self.state.lock().await;
        let id = state.next_category_id;
        state.next_category_id += 1;
        let category = StoreCategory {
            store_category_id: id,
            merchant_id,
            cate_name: fields.cate_name.clone(),
            pic: fields.pic.clone(),
            sort: fields.sort,
            is_show: fields.is_show,
            create_time: Some(Utc::now()),
        };
        state.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: i32,
        merchant_id: i32,
        fields: &CategoryFields,
    ) -> Result<(), CatalogError> {
        let mut state = self.state.lock().await;
        match state.categories.get_mut(&id) {
            Some(category) if category.merchant_id == merchant_id => {
                category.cate_name = fields.cate_name.clone();
                category.pic = fields.pic.clone();
                category.sort = fields.sort;
                category.is_show = fields.is_show;
                Ok(())
            }
            _ => Err(CatalogError::NotFound),
        }
    }

    async fn delete_category(&self, id: i32, merchant_id: i32) -> Result<(), CatalogError> {
        let mut state = self.state.lock().await;
        match state.categories.get(&id) {
            Some(category) if category.merchant_id == merchant_id => {
                state.categories.remove(&id);
                Ok(())
            }
            _ => Err(CatalogError::NotFound),
        }
    }

    async fn get_category(
        &self,
        id: i32,
        merchant_id: i32,
    ) -> Result<Option<StoreCategory>, CatalogError> {
        let state = self.state.lock().await;
        Ok(state
            .categories
            .get(&id)
            .filter(|c| c.merchant_id == merchant_id)
            .cloned())
    }

    async fn find_category(&self, id: i32) -> Result<Option<StoreCategory>, CatalogError> {
        let state = self.state.lock().await;
        Ok(state.categories.get(&id).cloned())
    }

    async fn list_categories(
        &self,
        merchant_id: i32,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<StoreCategory>, i64), CatalogError> {
        let state = self.state.lock().await;
        let mut list: Vec<StoreCategory> = state
            .categories
            .values()
            .filter(|c| c.merchant_id == merchant_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| {
            b.sort
                .cmp(&a.sort)
                .then(b.store_category_id.cmp(&a.store_category_id))
        });
        let total = list.len() as i64;
        let start = ((page - 1) * page_size) as usize;
        let list = list
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect();
        Ok((list, total))
    }

    async fn find_product(
        &self,
        id: i32,
        merchant_id: i32,
    ) -> Result<Option<StoreProduct>, CatalogError> {
        let state = self.state.lock().await;
        Ok(state
            .products
            .get(&id)
            .filter(|p| p.merchant_id == merchant_id && p.delete_at.is_none())
            .cloned())
    }

    async fn get_content(&self, product_id: i32) -> Result<Option<ProductContent>, CatalogError> {
        let state = self.state.lock().await;
        Ok(state.contents.get(&product_id).cloned())
    }

    async fn list_skus(&self, product_id: i32) -> Result<Vec<ProductSku>, CatalogError> {
        let state = self.state.lock().await;
        let mut skus: Vec<ProductSku> = state
            .skus
            .values()
            .filter(|s| s.product_id == product_id)
            .cloned()
            .collect();
        skus.sort_by_key(|s| s.product_sku_id);
        Ok(skus)
    }

    async fn list_products(
        &self,
        merchant_id: i32,
        filter: &ProductListFilter,
    ) -> Result<(Vec<StoreProduct>, i64), CatalogError> {
        let state = self.state.lock().await;
        let mut list: Vec<StoreProduct> = state
            .products
            .values()
            .filter(|p| p.merchant_id == merchant_id && p.delete_at.is_none())
            .filter(|p| filter.cate_id.map_or(true, |c| p.cate_id == c))
            .filter(|p| filter.is_show.map_or(true, |s| p.is_show == s))
            .filter(|p| filter.sale_status.map_or(true, |s| p.sale_status == Some(s)))
            .filter(|p| {
                filter
                    .keyword
                    .as_deref()
                    .filter(|k| !k.is_empty())
                    .map_or(true, |k| p.store_name.contains(k))
            })
            .cloned()
            .collect();
        list.sort_by(|a, b| b.sort.cmp(&a.sort).then(b.product_id.cmp(&a.product_id)));
        let total = list.len() as i64;
        let start = ((filter.page - 1) * filter.page_size) as usize;
        let list = list
            .into_iter()
            .skip(start)
            .take(filter.page_size as usize)
            .collect();
        Ok((list, total))
    }

    async fn create_aggregate(
        &self,
        merchant_id: i32,
        fields: &ProductFields,
        content: &str,
        skus: &[SkuInput],
    ) -> Result<(StoreProduct, ProductContent, Vec<ProductSku>), CatalogError> {
        let mut state = self.state.lock().await;
        let mut work = state.clone();

        let product_id = work.next_product_id;
        work.next_product_id += 1;
        let mut product = StoreProduct {
            product_id,
            merchant_id,
            cate_id: fields.cate_id,
            store_name: String::new(),
            store_info: fields.store_info.clone().unwrap_or_default(),
            keyword: String::new(),
            unit_name: String::new(),
            sort: 0,
            is_show: 1,
            sale_status: Some(true),
            sales: 0,
            price: None,
            cost: None,
            ot_price: None,
            is_good: false,
            product_type: 0,
            image: String::new(),
            slider_image: String::new(),
            refund_switch: None,
            bar_code_number: None,
            create_at: Some(Utc::now()),
            update_at: None,
            delete_at: None,
        };
        Self::apply_parent(&mut product, fields);
        product.update_at = None;
        work.products.insert(product_id, product.clone());

        let stored_content = ProductContent {
            product_id,
            content: content.to_string(),
        };
        work.contents.insert(product_id, stored_content.clone());

        let mut stored_skus = Vec::with_capacity(skus.len());
        for sku in skus {
            if self.fail_on_sku_insert.load(Ordering::SeqCst) {
                return Err(CatalogError::Backend("injected sku insert failure".into()));
            }
            stored_skus.push(Self::insert_sku(&mut work, product_id, sku));
        }

        *state = work;
        Ok((product, stored_content, stored_skus))
    }

    async fn update_aggregate(
        &self,
        product_id: i32,
        fields: &ProductFields,
        content: Option<&str>,
        plan: &SkuPlan,
    ) -> Result<(), CatalogError> {
        let mut state = self.state.lock().await;
        let mut work = state.clone();

        let product = work
            .products
            .get_mut(&product_id)
            .ok_or(CatalogError::NotFound)?;
        Self::apply_parent(product, fields);

        if let Some(content) = content {
            work.contents
                .entry(product_id)
                .and_modify(|c| c.content = content.to_string())
                .or_insert_with(|| ProductContent {
                    product_id,
                    content: content.to_string(),
                });
        }

        for sku_id in &plan.delete_ids {
            if let Some(sku) = work.skus.get(sku_id) {
                if sku.product_id == product_id {
                    work.skus.remove(sku_id);
                }
            }
        }

        for sku in &plan.updates {
            let id = sku.product_sku_id.expect("update entries carry an id");
            if let Some(row) = work.skus.get_mut(&id) {
                if row.product_id == product_id {
                    row.attr_name = sku.attr_name.clone();
                    row.price = Some(sku.price);
                    row.cost = sku.cost;
                    row.ot_price = sku.ot_price;
                    row.image = sku.image.clone();
                }
            }
        }

        for sku in &plan.inserts {
            if self.fail_on_sku_insert.load(Ordering::SeqCst) {
                return Err(CatalogError::Backend("injected sku insert failure".into()));
            }
            Self::insert_sku(&mut work, product_id, sku);
        }

        *state = work;
        Ok(())
    }

    async fn soft_delete_product(&self, product_id: i32) -> Result<(), CatalogError> {
        let mut state = self.state.lock().await;
        match state.products.get_mut(&product_id) {
            Some(product) => {
                product.delete_at = Some(Utc::now());
                Ok(())
            }
            None => Err(CatalogError::NotFound),
        }
    }

    async fn set_listing_status(&self, product_id: i32, is_show: i16) -> Result<(), CatalogError> {
        let mut state = self.state.lock().await;
        match state.products.get_mut(&product_id) {
            Some(product) => {
                product.is_show = is_show;
                Ok(())
            }
            None => Err(CatalogError::NotFound),
        }
    }

    async fn set_sale_status(
        &self,
        product_id: i32,
        sale_status: bool,
    ) -> Result<(), CatalogError> {
        let mut state = self.state.lock().await;
        match state.products.get_mut(&product_id) {
            Some(product) => {
                product.sale_status = Some(sale_status);
                Ok(())
            }
            None => Err(CatalogError::NotFound),
        }
    }
}

pub struct TestApp {
    pub base_url: String,
    pub credentials: Arc<MemoryCredentialStore>,
    pub catalog: Arc<MemoryCatalogStore>,
}

/// Spawn the real router on a free local port, backed by in-memory stores.
pub async fn spawn_app() -> Result<TestApp> {
    let credentials = Arc::new(MemoryCredentialStore::new());
    let catalog = Arc::new(MemoryCatalogStore::new());

    let authority = SessionAuthority::new(
        credentials.clone(),
        Arc::new(MemorySessionStore::new()),
        TEST_SECRET,
        Duration::from_secs(3600),
    );
    let state = AppState::new(authority, catalog.clone());

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(
            listener,
            app(state).into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("test server");
    });

    Ok(TestApp {
        base_url,
        credentials,
        catalog,
    })
}

/// Log in over HTTP and return the issued token.
pub async fn login(
    client: &reqwest::Client,
    app: &TestApp,
    account: &str,
    password: &str,
    ip: &str,
) -> Result<String> {
    let resp = client
        .post(format!("{}/mer_admin/auth/login", app.base_url))
        .header("X-Forwarded-For", ip)
        .json(&serde_json::json!({ "account": account, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(
        resp.status().is_success(),
        "login failed with status {}",
        resp.status()
    );
    let body: serde_json::Value = resp.json().await?;
    let token = body["data"]["token"]
        .as_str()
        .context("login response missing token")?
        .to_string();
    Ok(token)
}
