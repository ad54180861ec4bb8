// src/db/notification_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::notification::Notification};

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Notification>, AppError> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from_read)
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET read = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    // Só as não lidas do dono; o RETURNING diz exatamente quais mudaram
    pub async fn mark_all_read(&self, owner_id: Uuid) -> Result<Vec<Notification>, AppError> {
        let changed = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET read = TRUE
            WHERE owner_id = $1 AND read = FALSE
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(changed)
    }
}
