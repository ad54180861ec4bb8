// src/db/member_repo.rs

use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::member::{Member, MemberProfileUpdate, NewMemberProfile},
};

#[derive(Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Perfil do usuário logado: exatamente uma linha ou NotFound
    pub async fn find_by_id(&self, id: Uuid) -> Result<Member, AppError> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from_read)?
            .ok_or(AppError::NotFound("perfil de membro"))
    }

    pub async fn list_all(&self) -> Result<Vec<Member>, AppError> {
        sqlx::query_as::<_, Member>("SELECT * FROM members ORDER BY full_name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from_read)
    }

    // Perfil inicial criado junto com a conta (mesma transação)
    pub async fn create_profile<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        profile: &NewMemberProfile,
    ) -> Result<Member, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (id, full_name, birth_date, email)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&profile.full_name)
        .bind(profile.birth_date)
        .bind(&profile.email)
        .fetch_one(executor)
        .await?;

        Ok(member)
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        update: &MemberProfileUpdate,
    ) -> Result<Member, AppError> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            UPDATE members
            SET full_name = $2, phone = $3, marital_status = $4, address = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.full_name)
        .bind(update.phone.as_deref())
        .bind(update.marital_status)
        .bind(update.address.clone().map(Json))
        .fetch_one(&self.pool)
        .await?;

        Ok(member)
    }
}
