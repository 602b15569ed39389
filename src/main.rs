use std::net::SocketAddr;
use std::sync::Arc;

use merchant_api::app::app;
use merchant_api::auth::redis_store::RedisSessionStore;
use merchant_api::auth::SessionAuthority;
use merchant_api::config;
use merchant_api::database;
use merchant_api::database::catalog::PgCatalogStore;
use merchant_api::database::credentials::PgCredentialStore;
use merchant_api::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, REDIS_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("starting merchant API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        panic!("JWT_SECRET must be set");
    }

    let pool = database::connect(&config.database)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to database: {}", e));
    tracing::info!("database pool ready");

    let sessions = RedisSessionStore::connect(&config.redis.url)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to redis: {}", e));
    tracing::info!("session cache ready");

    let authority = SessionAuthority::new(
        Arc::new(PgCredentialStore::new(pool.clone())),
        Arc::new(sessions),
        config.security.jwt_secret.clone(),
        std::time::Duration::from_secs(config.security.token_ttl_secs),
    );
    let state = AppState::new(authority, Arc::new(PgCatalogStore::new(pool)));

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("merchant API listening on http://{}", bind_addr);

    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server");
}
