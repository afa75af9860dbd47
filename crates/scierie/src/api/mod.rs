//! HTTP API.
//!
//! Routes keep the paths the web pages already call (`/stock/api`,
//! `/invoices/api/pdf/{id}`, ...). Handlers run storage calls on the
//! blocking pool and answer errors as `{"error": "..."}`.

mod auth;
mod charges;
mod dashboard;
mod expenses;
pub mod input;
mod invoices;
mod middleware;
mod productions;
mod profit;
mod reports;
mod sales;
mod stock;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::auth::TokenIssuer;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::Storage;

/// State shared by every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database handle.
    pub storage: Arc<Storage>,
    /// Loaded configuration.
    pub config: Arc<Config>,
    /// Session token issuer.
    pub tokens: TokenIssuer,
}

impl AppState {
    /// Build the state from an opened database and the configuration.
    #[must_use]
    pub fn new(storage: Storage, config: Config) -> Self {
        let tokens = TokenIssuer::new(&config.auth.jwt_secret, config.token_ttl());
        Self {
            storage: Arc::new(storage),
            config: Arc::new(config),
            tokens,
        }
    }
}

/// Run a storage call on the blocking pool.
///
/// # Errors
///
/// Returns the call's error, or an internal error if the task panicked.
pub(crate) async fn with_storage<T, F>(state: &AppState, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&Storage) -> Result<T> + Send + 'static,
{
    let storage = Arc::clone(&state.storage);
    tokio::task::spawn_blocking(move || f(&storage))
        .await
        .map_err(|e| Error::internal(format!("storage task failed: {e}")))?
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route(
            "/stock/api",
            get(stock::list)
                .post(stock::upsert)
                .put(stock::update)
                .delete(stock::remove),
        )
        .route(
            "/productions/api",
            get(productions::list)
                .post(productions::create)
                .put(productions::update)
                .delete(productions::remove),
        )
        .route("/sales/api", get(sales::list).post(sales::record))
        .route(
            "/expenses/api",
            get(expenses::list)
                .post(expenses::create)
                .put(expenses::update)
                .delete(expenses::remove),
        )
        .route(
            "/charges/api",
            get(charges::list)
                .post(charges::create)
                .put(charges::update)
                .delete(charges::remove),
        )
        .route(
            "/invoices/api",
            get(invoices::list)
                .post(invoices::create)
                .put(invoices::update)
                .delete(invoices::remove),
        )
        .route("/invoices/api/pdf/{id}", get(invoices::pdf))
        .route("/benefice/api", get(profit::current))
        .route("/benefice/api/summary", get(profit::summary))
        .route("/benefice/api/history", get(profit::history))
        .route("/api/dashboard", get(dashboard::show))
        .route("/reports/api", get(reports::show));

    let router = if state.config.server.require_auth {
        router.layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_session,
        ))
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn version() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
