//! Route table
//!
//! Mirrors the platform's v1 surface: workspace and module operations under
//! `/api/v1`, the kubeconfig connection sub-resource under the workspace
//! prefix, and an unauthenticated health probe at the root.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::extract::MAX_FORM_BYTES;
use crate::handlers::{module, workspace};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/workspace",
            post(workspace::create)
                .patch(workspace::update)
                .delete(workspace::delete),
        )
        .route("/workspace/list", get(workspace::list))
        .route(
            "/workspace/connection/kubeconfig",
            post(workspace::create_kubeconfig_secret)
                .delete(workspace::delete_kubeconfig_secret),
        )
        .route(
            "/workspace/connection/kubeconfig/list",
            get(workspace::list_kubeconfig_secrets),
        )
        .route(
            "/module",
            post(module::create)
                .patch(module::update)
                .delete(module::delete),
        )
        .route("/module/list", get(module::list));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]);

    Router::new()
        .nest("/api/v1", api)
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
