// src/db/pg.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    AccountStore, ChurchBackend, CongregationRepository, FinanceRepository, MemberRepository,
    MinistryRepository, NetworkRepository, NotificationRepository, RequestRepository,
    UserRepository,
};
use crate::{
    common::error::AppError,
    models::{
        auth::Account,
        congregation::Congregation,
        finance::{NewTransaction, Transaction},
        member::{Member, MemberProfileUpdate, NewMemberProfile},
        ministry::Ministry,
        network::Network,
        notification::Notification,
        request::{NewRequest, Request, RequestStatus},
    },
};

/// Backend PostgreSQL: uma fachada sobre os repositórios de cada tabela.
#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
    users: UserRepository,
    members: MemberRepository,
    congregations: CongregationRepository,
    requests: RequestRepository,
    finance: FinanceRepository,
    ministries: MinistryRepository,
    networks: NetworkRepository,
    notifications: NotificationRepository,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            members: MemberRepository::new(pool.clone()),
            congregations: CongregationRepository::new(pool.clone()),
            requests: RequestRepository::new(pool.clone()),
            finance: FinanceRepository::new(pool.clone()),
            ministries: MinistryRepository::new(pool.clone()),
            networks: NetworkRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl ChurchBackend for PgBackend {
    async fn fetch_profile(&self, member_id: Uuid) -> Result<Member, AppError> {
        self.members.find_by_id(member_id).await
    }

    async fn fetch_members(&self) -> Result<Vec<Member>, AppError> {
        self.members.list_all().await
    }

    async fn fetch_congregations(&self) -> Result<Vec<Congregation>, AppError> {
        self.congregations.list_all().await
    }

    async fn fetch_requests(&self) -> Result<Vec<Request>, AppError> {
        self.requests.list_all().await
    }

    async fn fetch_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        self.finance.list_transactions().await
    }

    async fn fetch_ministries(&self) -> Result<Vec<Ministry>, AppError> {
        self.ministries.list_all().await
    }

    async fn fetch_networks(&self) -> Result<Vec<Network>, AppError> {
        self.networks.list_all().await
    }

    async fn fetch_notifications(&self, owner_id: Uuid) -> Result<Vec<Notification>, AppError> {
        self.notifications.list_for_owner(owner_id).await
    }

    async fn insert_request(&self, requester_id: Uuid, input: &NewRequest) -> Result<Request, AppError> {
        self.requests.create(requester_id, input).await
    }

    async fn update_request_status(&self, id: Uuid, status: RequestStatus) -> Result<Request, AppError> {
        self.requests.update_status(id, status).await
    }

    async fn insert_transaction(
        &self,
        input: &NewTransaction,
        congregation_id: Option<Uuid>,
    ) -> Result<Transaction, AppError> {
        self.finance.create_transaction(input, congregation_id).await
    }

    async fn mark_notification_read(&self, id: Uuid) -> Result<Notification, AppError> {
        self.notifications.mark_read(id).await
    }

    async fn mark_all_notifications_read(&self, owner_id: Uuid) -> Result<Vec<Notification>, AppError> {
        self.notifications.mark_all_read(owner_id).await
    }

    async fn update_member_profile(
        &self,
        member_id: Uuid,
        update: &MemberProfileUpdate,
    ) -> Result<Member, AppError> {
        self.members.update_profile(member_id, update).await
    }
}

#[async_trait]
impl AccountStore for PgBackend {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        self.users.find_by_email(email).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        self.users.find_by_id(id).await
    }

    async fn create_account(
        &self,
        email: &str,
        password_hash: &str,
        profile: &NewMemberProfile,
    ) -> Result<Account, AppError> {
        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        let account = self.users.create_account(&mut *tx, email, password_hash).await?;

        // Se falhar aqui, a conta criada acima é desfeita no drop do tx
        self.members.create_profile(&mut *tx, account.id, profile).await?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!("👤 Conta e perfil de membro criados para {}", account.email);
        Ok(account)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        self.users.update_password(id, password_hash).await
    }
}
