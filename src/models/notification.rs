// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_severity")]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[sqlx(rename = "info")]
    Info,
    #[sqlx(rename = "sucesso")]
    Success,
    #[sqlx(rename = "aviso")]
    Warning,
    #[sqlx(rename = "erro")]
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub severity: Severity,

    #[schema(example = "Solicitação aprovada")]
    pub title: String,

    pub body: String,

    // Só vai de false para true
    pub read: bool,

    pub created_at: DateTime<Utc>,
}

impl Record for Notification {
    fn id(&self) -> Uuid {
        self.id
    }
}
