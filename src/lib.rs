//! Estaciona API Library
//!
//! Parking access backend: users and their vehicles, the entry door flag and
//! parking place allocation across buildings.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<config::AppConfig>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let services = handlers::AppServices::new(db.clone(), &config);
        Self {
            db,
            config: Arc::new(config),
            services,
        }
    }
}

/// Parking routes under their original paths and English aliases
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Users
        .route("/data", get(handlers::users::list_users))
        .route("/users", get(handlers::users::list_users))
        .route("/updateEdificio", post(handlers::users::update_building))
        .route("/updateBuilding", post(handlers::users::update_building))
        .route(
            "/update_salida_y_reset",
            post(handlers::users::exit_and_reset),
        )
        .route(
            "/update_exit_and_reset",
            post(handlers::users::exit_and_reset),
        )
        // Door
        .route("/set_requested_entrada", post(handlers::doors::request_entry))
        .route("/set_requested_entry", post(handlers::doors::request_entry))
        // Places
        .route("/get_lugares", get(handlers::places::list_places))
        .route("/get_places", get(handlers::places::list_places))
        .route("/asignar_lugar", post(handlers::places::assign_place))
        .route("/assign_place", post(handlers::places::assign_place))
        .route("/liberar_lugar", post(handlers::places::release_place))
        .route("/release_place", post(handlers::places::release_place))
}

/// Full application router: API, health, docs, tracing, compression and request ids.
///
/// CORS is left to the caller since it depends on deployment configuration.
pub fn app_router(state: AppState) -> Router {
    Router::<AppState>::new()
        .merge(api_routes())
        .nest("/health", health::health_routes(state.db.clone()))
        .merge(openapi::swagger_ui())
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        // Outermost so the trace span and error bodies see the request id
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

/// Builds the CORS layer from configuration.
///
/// Explicit origins win; otherwise a permissive layer is used in development or
/// when `cors_allow_any_origin` is set.
pub fn cors_layer(cfg: &config::AppConfig) -> Result<CorsLayer, errors::ServiceError> {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        let layer = CorsLayer::new().allow_origin(origins);
        // Credentials cannot be combined with wildcard methods or headers
        return Ok(if cfg.cors_allow_credentials {
            layer
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
        } else {
            layer.allow_methods(Any).allow_headers(Any)
        });
    }

    if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        return Ok(CorsLayer::permissive());
    }

    Err(errors::ServiceError::InternalError(
        "Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true"
            .to_string(),
    ))
}

pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::db::{DatabaseAccess, DbPool};
    pub use crate::errors::{ErrorResponse, ServiceError};
    pub use crate::services::*;
    pub use crate::{api_routes, app_router, AppState};
}

#[cfg(test)]
mod cors_tests {
    use super::*;

    fn cfg(environment: &str) -> config::AppConfig {
        config::AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            5000,
            environment.into(),
        )
    }

    #[test]
    fn development_falls_back_to_permissive() {
        assert!(cors_layer(&cfg("development")).is_ok());
    }

    #[test]
    fn production_without_origins_is_rejected() {
        assert!(cors_layer(&cfg("production")).is_err());
    }

    #[test]
    fn production_with_origins_builds_layer() {
        let mut cfg = cfg("production");
        cfg.cors_allowed_origins = Some("https://gate.example.edu, ".into());
        cfg.cors_allow_credentials = true;
        assert!(cors_layer(&cfg).is_ok());
    }
}
