// src/handlers/dashboard.rs

use axum::{extract::State, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::dashboard::{AdminStats, DashboardSummary},
    services::views,
};

// GET /api/dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    responses((status = 200, description = "Cards do painel", body = DashboardSummary)),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<DashboardSummary>, AppError> {
    let (_, snapshot) = app_state.loaded_view(&identity).await?;
    Ok(Json(views::dashboard_summary(&snapshot)))
}

// GET /api/admin/stats
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "Dashboard",
    responses((status = 200, description = "Contadores da administração", body = AdminStats)),
    security(("api_jwt" = []))
)]
pub async fn get_admin_stats(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<AdminStats>, AppError> {
    let (_, snapshot) = app_state.loaded_view(&identity).await?;
    Ok(Json(views::admin_stats(&snapshot)))
}
