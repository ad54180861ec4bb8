// src/db/congregation_repo.rs

use sqlx::PgPool;

use crate::{common::error::AppError, models::congregation::Congregation};

#[derive(Clone)]
pub struct CongregationRepository {
    pool: PgPool,
}

impl CongregationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Congregation>, AppError> {
        sqlx::query_as::<_, Congregation>(
            r#"
            SELECT id, name, address, kind, leader_id, phone, created_at
            FROM congregations
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from_read)
    }
}
