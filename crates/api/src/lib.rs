//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST routes under `/api`
//! - JWT authentication middleware and the [`AuthUser`](middleware::AuthUser) extractor
//! - The `{success, data|error}` response envelope
//! - The email/SMS notifier used by the transaction recorder

pub mod middleware;
pub mod notifier;
pub mod response;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use backoffice_core::recorder::TransactionRecorder;
use backoffice_db::{ChartCache, GlRepository, TransactionRepository};
use backoffice_shared::JwtService;

pub use notifier::ChannelNotifier;

/// The recorder wired to the database and the live notifier.
pub type Recorder = TransactionRecorder<TransactionRepository, GlRepository, ChannelNotifier>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Email and SMS delivery.
    pub notifier: ChannelNotifier,
    /// Chart-of-accounts cache shared by every GL repository.
    pub chart: ChartCache,
}

impl AppState {
    /// GL repository sharing the process-wide chart cache.
    #[must_use]
    pub fn gl(&self) -> GlRepository {
        GlRepository::with_cache((*self.db).clone(), self.chart.clone())
    }

    /// Transaction recorder for one request.
    #[must_use]
    pub fn recorder(&self) -> Recorder {
        TransactionRecorder::new(
            TransactionRepository::new((*self.db).clone()),
            self.gl(),
            self.notifier.clone(),
        )
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
