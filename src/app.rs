use axum::routing::{get, post, put};
use axum::{middleware as axum_middleware, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config;
use crate::handlers::{auth, health, store_category, store_product};
use crate::middleware::admin_auth_middleware;
use crate::state::AppState;

/// Build the full application router. Everything under /mer_admin except
/// the auth endpoints goes through the admin session check.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/store_category",
            post(store_category::create).get(store_category::list),
        )
        .route(
            "/store_category/:id",
            get(store_category::get)
                .put(store_category::update)
                .delete(store_category::delete),
        )
        .route(
            "/store_product",
            post(store_product::create).get(store_product::list),
        )
        .route(
            "/store_product/:id",
            get(store_product::get)
                .put(store_product::update)
                .delete(store_product::delete),
        )
        .route(
            "/store_product/:id/listing_status",
            put(store_product::update_listing_status),
        )
        .route(
            "/store_product/:id/sold_out_status",
            put(store_product::update_sold_out_status),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    let mer_admin = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .merge(protected);

    let mut router = Router::new()
        .route("/health", get(health::health))
        .nest("/mer_admin", mer_admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if config::config().security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router
}
