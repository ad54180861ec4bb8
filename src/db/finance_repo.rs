// src/db/finance_repo.rs

use sqlx::PgPool;
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::finance::{NewTransaction, Transaction},
};

#[derive(Clone)]
pub struct FinanceRepository {
    pool: PgPool,
}

impl FinanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  MOVIMENTAÇÕES (Entradas e Saídas)
    // =========================================================================

    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, direction, category, amount, description, occurred_at, congregation_id
            FROM transactions
            ORDER BY occurred_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from_read)
    }

    // A data da movimentação é o NOW() do servidor
    pub async fn create_transaction(
        &self,
        input: &NewTransaction,
        congregation_id: Option<Uuid>,
    ) -> Result<Transaction, AppError> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (direction, category, amount, description, congregation_id, occurred_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, direction, category, amount, description, occurred_at, congregation_id
            "#,
        )
        .bind(input.direction)
        .bind(&input.category)
        .bind(input.amount)
        .bind(input.description.as_deref())
        .bind(congregation_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(transaction)
    }
}
