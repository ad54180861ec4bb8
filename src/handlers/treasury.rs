// src/handlers/treasury.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermTreasuryWrite, RequirePermission},
    },
    models::finance::{
        FinancialSummary, NewTransaction, Transaction, INFLOW_CATEGORIES, OUTFLOW_CATEGORIES,
    },
    services::{
        access::{Capability, CapabilitySet},
        views::{self, TimeWindow},
    },
};

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TreasuryQuery {
    /// Padrão: ano corrente
    #[validate(range(min = 1900, max = 9999, message = "Ano inválido."))]
    pub year: Option<i32>,

    /// 1 a 12. Padrão: mês corrente
    #[validate(range(min = 1, max = 12, message = "Mês inválido."))]
    pub month: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreasuryView {
    pub year: i32,
    pub month: u32,
    pub summary: FinancialSummary,
    // Só as movimentações do período, mais novas primeiro
    pub transactions: Vec<Transaction>,
    pub can_record: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TreasuryCategories {
    pub inflow: Vec<String>,
    pub outflow: Vec<String>,
}

// GET /api/treasury?year=2025&month=3
#[utoipa::path(
    get,
    path = "/api/treasury",
    tag = "Treasury",
    params(TreasuryQuery),
    responses(
        (status = 200, description = "Resumo financeiro do mês", body = TreasuryView),
        (status = 400, description = "Período inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_treasury(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Query(query): Query<TreasuryQuery>,
) -> Result<Json<TreasuryView>, AppError> {
    query.validate().map_err(AppError::ValidationError)?;

    let window = match (query.year, query.month) {
        (None, None) => TimeWindow::current_month(),
        (year, month) => {
            let today = Utc::now();
            TimeWindow::month(year.unwrap_or(today.year()), month.unwrap_or(today.month()))
        }
    }
    .ok_or_else(|| anyhow::anyhow!("Período sem representação: {:?}/{:?}", query.month, query.year))?;
    let (year, month) = (window.start.year(), window.start.month());

    let (profile, snapshot) = app_state.loaded_view(&identity).await?;
    let can_record = CapabilitySet::for_role(profile.role).allows(Capability::RecordTransactions);

    Ok(Json(TreasuryView {
        year,
        month,
        summary: views::summarize(&snapshot.transactions, &window),
        transactions: views::transactions_in(&snapshot.transactions, &window)
            .into_iter()
            .cloned()
            .collect(),
        can_record,
    }))
}

// POST /api/treasury/transactions
#[utoipa::path(
    post,
    path = "/api/treasury/transactions",
    tag = "Treasury",
    request_body = NewTransaction,
    responses(
        (status = 201, description = "Movimentação registrada", body = Transaction),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_transaction(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermTreasuryWrite>,
    Json(payload): Json<NewTransaction>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let transaction = app_state.store.create_transaction(payload).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

// GET /api/treasury/categories
#[utoipa::path(
    get,
    path = "/api/treasury/categories",
    tag = "Treasury",
    responses((status = 200, description = "Categorias sugeridas", body = TreasuryCategories)),
    security(("api_jwt" = []))
)]
pub async fn list_categories() -> Json<TreasuryCategories> {
    Json(TreasuryCategories {
        inflow: INFLOW_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        outflow: OUTFLOW_CATEGORIES.iter().map(|c| c.to_string()).collect(),
    })
}
