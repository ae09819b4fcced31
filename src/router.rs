use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::middleware::auth::authenticate;
use crate::middleware::exception::translate_auth_failures;
use crate::middleware::policy::authorize;
use crate::modules::users::router::init_auth_router;
use crate::state::AppState;
use anyhow::anyhow;
use axum::http::{HeaderValue, Method};
use axum::{Json, Router, middleware, routing::get};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use todo_core::AppError;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

/// Builds the application router.
///
/// Layers run outermost first: request logging, CORS, auth failure translation,
/// authentication, authorization, then the handler.
pub fn init_router(state: AppState) -> Router {
    let cors = cors_layer(&state);

    Router::new()
        .route("/", get(root))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api", init_auth_router())
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(logging_middleware))
                .layer(cors)
                .layer(middleware::from_fn(translate_auth_failures))
                .layer(middleware::from_fn_with_state(state.clone(), authenticate))
                .layer(middleware::from_fn_with_state(state.clone(), authorize)),
        )
        .with_state(state)
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true)
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn not_found() -> AppError {
    AppError::not_found(anyhow!("Not found"))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
