// src/handlers/session.rs

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::dashboard::SessionView,
    services::access::CapabilitySet,
};

// GET /api/session (pública: o front usa para saber se mostra o login)
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "Session",
    responses((status = 200, description = "Estado da sessão atual", body = SessionView))
)]
pub async fn get_session(State(app_state): State<AppState>) -> Json<SessionView> {
    let identity = app_state.session.identity();
    let profile = app_state
        .store
        .profile()
        .await
        .filter(|p| identity.as_ref().is_some_and(|i| i.user_id == p.id));
    let caps = profile.as_ref().map(|p| CapabilitySet::for_role(p.role));

    Json(SessionView {
        signed_in: identity.is_some(),
        initializing: app_state.session.is_initializing(),
        loading: app_state.store.is_loading().await,
        user_id: identity.map(|i| i.user_id),
        tier: caps.map(|c| c.tier()),
        capabilities: caps.map(|c| c.slugs()).unwrap_or_default(),
    })
}

// POST /api/session/reload
#[utoipa::path(
    post,
    path = "/api/session/reload",
    tag = "Session",
    responses(
        (status = 204, description = "Coleções recarregadas"),
        (status = 503, description = "Backend indisponível; estado anterior mantido")
    ),
    security(("api_jwt" = []))
)]
pub async fn reload(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<StatusCode, AppError> {
    app_state.store.reload(identity).await?;
    Ok(StatusCode::NO_CONTENT)
}
