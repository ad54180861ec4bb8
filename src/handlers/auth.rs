// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{AuthResponse, ChangePasswordPayload, SignInPayload, SignUpPayload},
};

// Handler de cadastro: cria conta + perfil e já devolve o token da sessão
#[utoipa::path(
    post,
    path = "/api/auth/sign-up",
    tag = "Auth",
    request_body = SignUpPayload,
    responses(
        (status = 201, description = "Conta criada", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn sign_up(
    State(app_state): State<AppState>,
    Json(payload): Json<SignUpPayload>,
) -> Result<impl IntoResponse, AppError> {
    let token = app_state.auth_service.sign_up(payload).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse { token })))
}

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/sign-in",
    tag = "Auth",
    request_body = SignInPayload,
    responses(
        (status = 200, description = "Sessão iniciada", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn sign_in(
    State(app_state): State<AppState>,
    Json(payload): Json<SignInPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    let token = app_state.auth_service.sign_in(payload).await?;
    Ok(Json(AuthResponse { token }))
}

#[utoipa::path(
    post,
    path = "/api/auth/sign-out",
    tag = "Auth",
    responses((status = 204, description = "Sessão encerrada")),
    security(("api_jwt" = []))
)]
pub async fn sign_out(State(app_state): State<AppState>) -> StatusCode {
    app_state.auth_service.sign_out().await;
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    put,
    path = "/api/auth/password",
    tag = "Auth",
    request_body = ChangePasswordPayload,
    responses(
        (status = 204, description = "Senha alterada"),
        (status = 400, description = "Senha muito curta")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_password(
    State(app_state): State<AppState>,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<StatusCode, AppError> {
    app_state.auth_service.change_password(payload).await?;
    Ok(StatusCode::NO_CONTENT)
}
