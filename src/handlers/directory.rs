// src/handlers/directory.rs
//
// Congregações, ministérios e redes: listas com busca por nome.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        dashboard::{CongregationDirectory, MinistryEntry, NetworkEntry},
        ministry::MinistryCategory,
        network::NetworkKind,
    },
    services::views,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Trecho do nome, sem diferenciar maiúsculas
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MinistryQuery {
    pub search: Option<String>,
    pub category: Option<MinistryCategory>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NetworkQuery {
    pub search: Option<String>,
    pub kind: Option<NetworkKind>,
}

#[utoipa::path(
    get,
    path = "/api/congregations",
    tag = "Directory",
    params(SearchQuery),
    responses((status = 200, description = "Congregações e estatísticas", body = CongregationDirectory)),
    security(("api_jwt" = []))
)]
pub async fn list_congregations(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<CongregationDirectory>, AppError> {
    let (_, snapshot) = app_state.loaded_view(&identity).await?;
    Ok(Json(views::congregation_directory(&snapshot, query.search.as_deref())))
}

#[utoipa::path(
    get,
    path = "/api/ministries",
    tag = "Directory",
    params(MinistryQuery),
    responses((status = 200, description = "Ministérios", body = Vec<MinistryEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_ministries(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Query(query): Query<MinistryQuery>,
) -> Result<Json<Vec<MinistryEntry>>, AppError> {
    let (_, snapshot) = app_state.loaded_view(&identity).await?;
    Ok(Json(views::ministry_directory(&snapshot, query.search.as_deref(), query.category)))
}

#[utoipa::path(
    get,
    path = "/api/networks",
    tag = "Directory",
    params(NetworkQuery),
    responses((status = 200, description = "Células, grupos de estudo e pontos de pregação", body = Vec<NetworkEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_networks(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Query(query): Query<NetworkQuery>,
) -> Result<Json<Vec<NetworkEntry>>, AppError> {
    let (_, snapshot) = app_state.loaded_view(&identity).await?;
    Ok(Json(views::network_directory(&snapshot, query.search.as_deref(), query.kind)))
}
