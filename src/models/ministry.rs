// src/models/ministry.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "ministry_category")]
#[serde(rename_all = "snake_case")]
pub enum MinistryCategory {
    #[sqlx(rename = "Louvor")]
    Worship,
    #[sqlx(rename = "Ensino")]
    Teaching,
    #[sqlx(rename = "Evangelismo")]
    Evangelism,
    #[sqlx(rename = "Jovens")]
    Youth,
    #[sqlx(rename = "Crianças")]
    Children,
    #[sqlx(rename = "Ação Social")]
    SocialAction,
    #[sqlx(rename = "Mídia")]
    Media,
    #[sqlx(rename = "Recepção")]
    Reception,
    #[sqlx(rename = "Infraestrutura")]
    Infrastructure,
    #[sqlx(rename = "Outro")]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ministry {
    pub id: Uuid,

    #[schema(example = "Ministério de Louvor")]
    pub name: String,

    pub description: Option<String>,

    pub leader_id: Option<Uuid>,

    pub category: MinistryCategory,

    // Vem da tabela ministry_members (agregado no SELECT)
    pub member_ids: Vec<Uuid>,
}

impl Record for Ministry {
    fn id(&self) -> Uuid {
        self.id
    }
}
