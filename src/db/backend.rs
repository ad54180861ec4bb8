// src/db/backend.rs

use async_trait::async_trait;
use uuid::Uuid;

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

/// API de coleções do backend hospedado, como a camada de workflow a enxerga.
///
/// Leituras devolvem as linhas já na ordem de exibição (mais novas primeiro para
/// solicitações, movimentações e notificações). Escritas devolvem a linha confirmada
/// pelo servidor, com id, defaults e timestamps preenchidos.
#[async_trait]
pub trait ChurchBackend: Send + Sync {
    /// Perfil do usuário logado. Zero linhas => `AppError::NotFound`.
    async fn fetch_profile(&self, member_id: Uuid) -> Result<Member, AppError>;

    async fn fetch_members(&self) -> Result<Vec<Member>, AppError>;
    async fn fetch_congregations(&self) -> Result<Vec<Congregation>, AppError>;
    async fn fetch_requests(&self) -> Result<Vec<Request>, AppError>;
    async fn fetch_transactions(&self) -> Result<Vec<Transaction>, AppError>;
    async fn fetch_ministries(&self) -> Result<Vec<Ministry>, AppError>;
    async fn fetch_networks(&self) -> Result<Vec<Network>, AppError>;

    /// Filtrado no servidor pelo dono.
    async fn fetch_notifications(&self, owner_id: Uuid) -> Result<Vec<Notification>, AppError>;

    async fn insert_request(&self, requester_id: Uuid, input: &NewRequest) -> Result<Request, AppError>;

    async fn update_request_status(&self, id: Uuid, status: RequestStatus) -> Result<Request, AppError>;

    async fn insert_transaction(
        &self,
        input: &NewTransaction,
        congregation_id: Option<Uuid>,
    ) -> Result<Transaction, AppError>;

    async fn mark_notification_read(&self, id: Uuid) -> Result<Notification, AppError>;

    /// Uma única chamada; devolve as linhas efetivamente alteradas.
    async fn mark_all_notifications_read(&self, owner_id: Uuid) -> Result<Vec<Notification>, AppError>;

    async fn update_member_profile(
        &self,
        member_id: Uuid,
        update: &MemberProfileUpdate,
    ) -> Result<Member, AppError>;
}

/// Armazenamento das contas de acesso usado pelo provedor de autenticação.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError>;

    /// Cria a conta e o perfil de membro na mesma transação.
    async fn create_account(
        &self,
        email: &str,
        password_hash: &str,
        profile: &NewMemberProfile,
    ) -> Result<Account, AppError>;

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError>;
}
