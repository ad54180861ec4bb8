// src/db/network_repo.rs

use sqlx::PgPool;

use crate::{common::error::AppError, models::network::Network};

#[derive(Clone)]
pub struct NetworkRepository {
    pool: PgPool,
}

impl NetworkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Network>, AppError> {
        sqlx::query_as::<_, Network>(
            r#"
            SELECT
                n.id, n.name, n.kind, n.leader_id, n.address, n.weekday, n.meeting_time,
                COALESCE(
                    array_agg(nm.member_id) FILTER (WHERE nm.member_id IS NOT NULL),
                    '{}'
                ) AS member_ids
            FROM networks n
            LEFT JOIN network_members nm ON nm.network_id = n.id
            GROUP BY n.id
            ORDER BY n.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from_read)
    }
}
