// src/models/request.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::Record;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "request_kind")]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    #[sqlx(rename = "carteirinha")]
    MembershipCard,
    #[sqlx(rename = "agendamento")]
    Scheduling,
    #[sqlx(rename = "batismo")]
    Baptism,
    #[sqlx(rename = "transferencia")]
    Transfer,
    #[sqlx(rename = "alteracao_dados")]
    DataChange,
    #[sqlx(rename = "ministerio")]
    Ministry,
    #[sqlx(rename = "rede")]
    Network,
}

impl RequestKind {
    pub const ALL: [RequestKind; 7] = [
        RequestKind::MembershipCard,
        RequestKind::Scheduling,
        RequestKind::Baptism,
        RequestKind::Transfer,
        RequestKind::DataChange,
        RequestKind::Ministry,
        RequestKind::Network,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RequestKind::MembershipCard => "Carteirinha de Membro",
            RequestKind::Scheduling => "Agendamento",
            RequestKind::Baptism => "Batismo",
            RequestKind::Transfer => "Transferência",
            RequestKind::DataChange => "Alteração de Dados",
            RequestKind::Ministry => "Criar Ministério",
            RequestKind::Network => "Criar Rede",
        }
    }
}

/// pending -> approved | rejected. Os dois últimos são terminais.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "request_status")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[sqlx(rename = "pendente")]
    Pending,
    #[sqlx(rename = "aprovada")]
    Approved,
    #[sqlx(rename = "rejeitada")]
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

// --- Structs ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub kind: RequestKind,
    pub status: RequestStatus,

    #[schema(example = "Preciso da segunda via da carteirinha.")]
    pub details: String,

    pub created_at: DateTime<Utc>,
}

impl Record for Request {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// O que o membro preenche. Solicitante e status são definidos pela camada de escrita.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewRequest {
    pub kind: RequestKind,

    #[validate(length(max = 2000, message = "Detalhes muito longos."))]
    #[serde(default)]
    #[schema(example = "Mudança para a congregação do bairro.")]
    pub details: String,
}
