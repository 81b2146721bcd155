//! Router configuration for the marketplace.
//!
//! Builds the complete Axum router with all endpoints and middleware.

use super::health::{db_check, health_check, metrics, root};
use super::state::AppState;
use crate::api::{listings, purchases, users, wallet};
use crate::config::ServerConfig;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
};
use chaingo_web::correlation_id;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};

/// Build the complete Axum router.
///
/// Layers, outermost first: correlation id, CORS, request tracing, body
/// limit. Bodies declaring a length over `max_body_bytes` are rejected with
/// 413 before any handler runs.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        // Health and operations
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/db-check", get(db_check))
        .route("/metrics", get(metrics))
        // Users and sessions
        .route("/is_exists_user", post(users::is_exists_user))
        .route("/create_new_user", post(users::create_new_user))
        .route("/verify_token", post(users::verify_token))
        // Wallets
        .route("/get_user_wallet", get(wallet::get_user_wallet))
        .route("/save_wallet_code", post(wallet::save_wallet_code))
        // Listings
        .route("/create_listing", post(listings::create_listing))
        .route("/delete_listing/:id", delete(listings::delete_listing))
        .route("/get_listing/:id", get(listings::get_listing))
        .route("/get_user_listings", get(listings::get_user_listings))
        .route("/list_active_listings", get(listings::list_active_listings))
        // Purchases
        .route("/complete_purchase", post(purchases::complete_purchase))
        .route("/get_user_purchases", get(purchases::get_user_purchases))
        // Uploaded images
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_allowed_origins))
        .layer(middleware::from_fn(correlation_id))
        .with_state(state)
}

/// CORS for the configured origins, with credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
