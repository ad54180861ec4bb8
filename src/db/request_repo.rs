// src/db/request_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::request::{NewRequest, Request, RequestStatus},
};

#[derive(Clone)]
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Mais novas primeiro
    pub async fn list_all(&self) -> Result<Vec<Request>, AppError> {
        sqlx::query_as::<_, Request>("SELECT * FROM requests ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from_read)
    }

    // Toda solicitação nasce pendente
    pub async fn create(&self, requester_id: Uuid, input: &NewRequest) -> Result<Request, AppError> {
        let request = sqlx::query_as::<_, Request>(
            r#"
            INSERT INTO requests (requester_id, kind, status, details)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(requester_id)
        .bind(input.kind)
        .bind(RequestStatus::Pending)
        .bind(&input.details)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn update_status(&self, id: Uuid, status: RequestStatus) -> Result<Request, AppError> {
        let request = sqlx::query_as::<_, Request>(
            "UPDATE requests SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }
}
