// src/handlers/profile.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::member::{Member, MemberProfileUpdate},
};

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Profile",
    responses(
        (status = 200, description = "Perfil do membro logado", body = Member),
        (status = 404, description = "Perfil não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_profile(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<Member>, AppError> {
    let (profile, _) = app_state.loaded_view(&identity).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "Profile",
    request_body = MemberProfileUpdate,
    responses(
        (status = 200, description = "Perfil atualizado", body = Member),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_profile(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Json(payload): Json<MemberProfileUpdate>,
) -> Result<Json<Member>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    app_state.loaded_view(&identity).await?;

    let member = app_state.store.update_profile(payload).await?;
    Ok(Json(member))
}
