// src/db/ministry_repo.rs

use sqlx::PgPool;

use crate::{common::error::AppError, models::ministry::Ministry};

#[derive(Clone)]
pub struct MinistryRepository {
    pool: PgPool,
}

impl MinistryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Participantes vêm da tabela de vínculo, agregados num uuid[]
    pub async fn list_all(&self) -> Result<Vec<Ministry>, AppError> {
        sqlx::query_as::<_, Ministry>(
            r#"
            SELECT
                m.id, m.name, m.description, m.leader_id, m.category,
                COALESCE(
                    array_agg(mm.member_id) FILTER (WHERE mm.member_id IS NOT NULL),
                    '{}'
                ) AS member_ids
            FROM ministries m
            LEFT JOIN ministry_members mm ON mm.ministry_id = m.id
            GROUP BY m.id
            ORDER BY m.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from_read)
    }
}
