// src/handlers/notifications.rs

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{dashboard::NotificationsView, notification::Notification},
    services::views,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkAllReadResponse {
    pub updated: usize,
}

#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    responses((status = 200, description = "Notificações do usuário", body = NotificationsView)),
    security(("api_jwt" = []))
)]
pub async fn list_notifications(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<NotificationsView>, AppError> {
    let (_, snapshot) = app_state.loaded_view(&identity).await?;
    Ok(Json(views::notifications_view(&snapshot.notifications)))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    tag = "Notifications",
    params(("id" = Uuid, Path, description = "ID da notificação")),
    responses(
        (status = 200, description = "Notificação marcada como lida", body = Notification),
        (status = 404, description = "Notificação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, AppError> {
    let (_, snapshot) = app_state.loaded_view(&identity).await?;
    // Só as notificações do próprio usuário estão na coleção
    if !snapshot.notifications.iter().any(|n| n.id == id) {
        return Err(AppError::NotFound("notificação"));
    }
    Ok(Json(app_state.store.mark_notification_read(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    tag = "Notifications",
    responses((status = 200, description = "Quantidade marcada como lida", body = MarkAllReadResponse)),
    security(("api_jwt" = []))
)]
pub async fn mark_all_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<MarkAllReadResponse>, AppError> {
    app_state.loaded_view(&identity).await?;
    let updated = app_state.store.mark_all_notifications_read().await?;
    Ok(Json(MarkAllReadResponse { updated }))
}
