//! HTTP API Layer
//!
//! REST API for the household bills engine using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: bill, split and health endpoints
//! - **Middleware**: JWT authentication, audit logging
//! - **DTOs**: camelCase request/response bodies
//! - **Error Handling**: domain errors mapped to status codes in [`error`]
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(service, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_http::cors::{CorsLayer, Any};

use domain_bills::SettlementService;

use crate::config::ApiConfig;
use crate::middleware::{auth_middleware, audit_middleware};
use crate::handlers::{bills, health};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: SettlementService,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `service` - Settlement service wired to its stores
/// * `config` - API configuration
pub fn create_router(service: SettlementService, config: ApiConfig) -> Router {
    let state = AppState { service, config };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let bill_routes = Router::new()
        .route("/", post(bills::create_bill).get(bills::list_my_bills))
        .route("/:id", get(bills::get_bill).delete(bills::delete_bill))
        .route("/:id/splits", get(bills::list_bill_splits));

    let split_routes = Router::new()
        .route("/", get(bills::list_my_splits))
        .route("/:id/settle", post(bills::settle_split))
        .route("/:id/approve", post(bills::approve_split));

    // Protected API routes; audit runs inside auth so it sees the user
    let api_routes = Router::new()
        .nest("/bills", bill_routes)
        .nest("/splits", split_routes)
        .route("/users/:id/bills", get(bills::list_user_bills))
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
