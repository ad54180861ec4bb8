// src/models/congregation.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "congregation_kind")]
#[serde(rename_all = "snake_case")]
pub enum CongregationKind {
    #[sqlx(rename = "sede")]
    Headquarters,
    #[sqlx(rename = "filial")]
    Branch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Congregation {
    pub id: Uuid,

    #[schema(example = "Congregação Central")]
    pub name: String,

    #[schema(example = "Av. Paulista, 1000")]
    pub address: Option<String>,

    pub kind: CongregationKind,

    // Se presente, é o id de um membro
    pub leader_id: Option<Uuid>,

    pub phone: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Record for Congregation {
    fn id(&self) -> Uuid {
        self.id
    }
}
