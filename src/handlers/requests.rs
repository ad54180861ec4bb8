// src/handlers/requests.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermCreateRequests, PermReviewRequests, RequirePermission},
    },
    models::{
        dashboard::RequestsView,
        request::{NewRequest, Request},
    },
    services::views,
};

// GET /api/requests
#[utoipa::path(
    get,
    path = "/api/requests",
    tag = "Requests",
    responses(
        (status = 200, description = "Solicitações visíveis para o usuário", body = RequestsView)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_requests(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<RequestsView>, AppError> {
    let (profile, snapshot) = app_state.loaded_view(&identity).await?;
    Ok(Json(views::requests_view(&snapshot.requests, &profile)))
}

// POST /api/requests
#[utoipa::path(
    post,
    path = "/api/requests",
    tag = "Requests",
    request_body = NewRequest,
    responses(
        (status = 201, description = "Solicitação criada", body = Request),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_request(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermCreateRequests>,
    Json(payload): Json<NewRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let request = app_state.store.create_request(payload).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

// POST /api/requests/{id}/approve
#[utoipa::path(
    post,
    path = "/api/requests/{id}/approve",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Solicitação aprovada", body = Request),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Solicitação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_request(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermReviewRequests>,
    Path(id): Path<Uuid>,
) -> Result<Json<Request>, AppError> {
    Ok(Json(app_state.store.approve_request(id).await?))
}

// POST /api/requests/{id}/reject
#[utoipa::path(
    post,
    path = "/api/requests/{id}/reject",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Solicitação rejeitada", body = Request),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Solicitação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_request(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermReviewRequests>,
    Path(id): Path<Uuid>,
) -> Result<Json<Request>, AppError> {
    Ok(Json(app_state.store.reject_request(id).await?))
}
