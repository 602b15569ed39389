use std::sync::Arc;

use crate::auth::SessionAuthority;
use crate::database::catalog::CatalogStore;
use crate::services::{CategoryService, ProductService};

/// Shared application state. All store handles are injected at startup;
/// handlers and middleware reach them only through this value.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<SessionAuthority>,
    pub catalog: Arc<dyn CatalogStore>,
    pub categories: Arc<CategoryService>,
    pub products: Arc<ProductService>,
}

impl AppState {
    pub fn new(auth: SessionAuthority, catalog: Arc<dyn CatalogStore>) -> Self {
        Self {
            auth: Arc::new(auth),
            categories: Arc::new(CategoryService::new(catalog.clone())),
            products: Arc::new(ProductService::new(catalog.clone())),
            catalog,
        }
    }
}
