// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Json, Router,
};
use utoipa::OpenApi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

/// Monta todas as rotas sobre o estado já construído.
pub fn build_router(app_state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/sign-out", post(handlers::auth::sign_out))
        .route("/password", put(handlers::auth::change_password));

    let requests_routes = Router::new()
        .route(
            "/",
            get(handlers::requests::list_requests).post(handlers::requests::create_request),
        )
        .route("/{id}/approve", post(handlers::requests::approve_request))
        .route("/{id}/reject", post(handlers::requests::reject_request));

    let treasury_routes = Router::new()
        .route("/", get(handlers::treasury::get_treasury))
        .route("/transactions", post(handlers::treasury::create_transaction))
        .route("/categories", get(handlers::treasury::list_categories));

    let notification_routes = Router::new()
        .route("/", get(handlers::notifications::list_notifications))
        .route("/{id}/read", post(handlers::notifications::mark_read))
        .route("/read-all", post(handlers::notifications::mark_all_read));

    // Tudo aqui exige um token da sessão atual
    let protected = Router::new()
        .nest("/auth", auth_routes)
        .route("/session/reload", post(handlers::session::reload))
        .route(
            "/profile",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        .nest("/requests", requests_routes)
        .nest("/treasury", treasury_routes)
        .nest("/notifications", notification_routes)
        .route("/dashboard", get(handlers::dashboard::get_summary))
        .route("/admin/stats", get(handlers::dashboard::get_admin_stats))
        .route("/congregations", get(handlers::directory::list_congregations))
        .route("/ministries", get(handlers::directory::list_ministries))
        .route("/networks", get(handlers::directory::list_networks))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        // Rotas públicas
        .route("/api/auth/sign-up", post(handlers::auth::sign_up))
        .route("/api/auth/sign-in", post(handlers::auth::sign_in))
        .route("/api/session", get(handlers::session::get_session))
        .route("/api/docs/openapi.json", get(|| async { Json(docs::ApiDoc::openapi()) }))
        .nest("/api", protected)
        .with_state(app_state)
}
