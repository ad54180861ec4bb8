// src/models/finance.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::Record;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_direction")]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[sqlx(rename = "entrada")]
    Inflow,
    #[sqlx(rename = "saida")]
    Outflow,
}

// Sugestões para o formulário da tesouraria. A categoria continua sendo texto livre.
pub const INFLOW_CATEGORIES: [&str; 5] = ["Dízimo", "Ofertas", "Doações", "Eventos", "Vendas"];
pub const OUTFLOW_CATEGORIES: [&str; 7] = [
    "Aluguel",
    "Água",
    "Energia",
    "Internet",
    "Materiais",
    "Eventos",
    "Manutenção",
];

// --- Structs ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,

    pub direction: Direction,

    #[schema(example = "Dízimo")]
    pub category: String,

    // Positivo por convenção; a direção diz se entra ou sai
    #[schema(example = "150.00")]
    pub amount: Decimal,

    pub description: Option<String>,

    pub occurred_at: DateTime<Utc>,

    pub congregation_id: Option<Uuid>,
}

impl Record for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub direction: Direction,

    #[validate(length(min = 1, max = 60, message = "Informe a categoria."))]
    #[schema(example = "Ofertas")]
    pub category: String,

    #[schema(example = "50.00")]
    pub amount: Decimal,

    #[validate(length(max = 500, message = "Descrição muito longa."))]
    pub description: Option<String>,

    // Preenchido com a congregação do perfil quando ausente
    pub congregation_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub direction: Direction,
    pub category: String,
    pub total: Decimal,
}

/// Totais de um período. Sempre recalculado a partir da coleção em memória.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub inflow: Decimal,
    pub outflow: Decimal,
    pub balance: Decimal,
    pub by_category: Vec<CategoryTotal>,
    pub transaction_count: usize,
}
