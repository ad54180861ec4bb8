// src/models/network.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "network_kind")]
#[serde(rename_all = "snake_case")]
pub enum NetworkKind {
    #[sqlx(rename = "Célula")]
    Cell,
    #[sqlx(rename = "Grupo de Estudo")]
    StudyGroup,
    #[sqlx(rename = "Ponto de Pregação")]
    PreachingPoint,
}

/// Célula / grupo de estudo / ponto de pregação.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub id: Uuid,

    #[schema(example = "Célula Esperança")]
    pub name: String,

    pub kind: NetworkKind,

    pub leader_id: Option<Uuid>,

    pub address: Option<String>,

    #[schema(example = "Quarta-feira")]
    pub weekday: Option<String>,

    #[schema(example = "19:30")]
    pub meeting_time: Option<String>,

    pub member_ids: Vec<Uuid>,
}

impl Record for Network {
    fn id(&self) -> Uuid {
        self.id
    }
}
