//! Backend em memória com injeção de falhas e atrasos.
//!
//! Implementa [`ChurchBackend`] e [`AccountStore`] sem banco, para os testes da camada
//! de workflow. Só é compilado em testes ou com a feature `test-support`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AccountStore, ChurchBackend};
use crate::{
    common::error::AppError,
    models::{
        auth::Account,
        congregation::Congregation,
        finance::{NewTransaction, Transaction},
        member::{EcclesiasticalRole, Member, MemberProfileUpdate, NewMemberProfile},
        ministry::Ministry,
        network::Network,
        notification::Notification,
        request::{NewRequest, Request, RequestStatus},
    },
};

#[derive(Default)]
struct Tables {
    accounts: Vec<Account>,
    members: Vec<Member>,
    congregations: Vec<Congregation>,
    requests: Vec<Request>,
    transactions: Vec<Transaction>,
    ministries: Vec<Ministry>,
    networks: Vec<Network>,
    notifications: Vec<Notification>,
}

#[derive(Default)]
struct Faults {
    transport_down: bool,
    reject_writes: bool,
    failing_collection: Option<&'static str>,
    profile_delays: HashMap<Uuid, Duration>,
    write_delay: Option<Duration>,
}

/// Backend que guarda tudo em memória.
#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<Tables>,
    faults: RwLock<Faults>,
    write_calls: AtomicUsize,
    profile_fetches: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toda chamada passa a falhar com `TransportFailure`.
    pub async fn set_transport_down(&self, down: bool) {
        self.faults.write().await.transport_down = down;
    }

    /// Toda escrita passa a falhar com `WriteRejected`.
    pub async fn set_reject_writes(&self, reject: bool) {
        self.faults.write().await.reject_writes = reject;
    }

    /// Faz só a leitura da coleção indicada falhar (ex.: "transactions").
    pub async fn set_failing_collection(&self, collection: Option<&'static str>) {
        self.faults.write().await.failing_collection = collection;
    }

    /// Atrasa a busca de perfil de uma identidade específica.
    pub async fn set_profile_delay(&self, member_id: Uuid, delay: Duration) {
        self.faults.write().await.profile_delays.insert(member_id, delay);
    }

    /// Atrasa toda escrita, depois de contá-la.
    pub async fn set_write_delay(&self, delay: Option<Duration>) {
        self.faults.write().await.write_delay = delay;
    }

    /// Quantas buscas de perfil chegaram aqui (uma por recarga).
    pub fn profile_fetches(&self) -> usize {
        self.profile_fetches.load(Ordering::SeqCst)
    }

    /// Quantas escritas chegaram ao "servidor" (inclusive as rejeitadas).
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub async fn seed_member(&self, member: Member) {
        self.tables.write().await.members.push(member);
    }

    pub async fn seed_congregation(&self, congregation: Congregation) {
        self.tables.write().await.congregations.push(congregation);
    }

    pub async fn seed_request(&self, request: Request) {
        self.tables.write().await.requests.push(request);
    }

    pub async fn seed_transaction(&self, transaction: Transaction) {
        self.tables.write().await.transactions.push(transaction);
    }

    pub async fn seed_ministry(&self, ministry: Ministry) {
        self.tables.write().await.ministries.push(ministry);
    }

    pub async fn seed_network(&self, network: Network) {
        self.tables.write().await.networks.push(network);
    }

    pub async fn seed_notification(&self, notification: Notification) {
        self.tables.write().await.notifications.push(notification);
    }

    /// Promove (ou rebaixa) um membro direto na tabela.
    pub async fn set_member_role(&self, member_id: Uuid, role: EcclesiasticalRole) {
        let mut tables = self.tables.write().await;
        if let Some(member) = tables.members.iter_mut().find(|m| m.id == member_id) {
            member.role = role;
        }
    }

    /// Estado "do servidor" de uma solicitação, para conferir o que foi gravado.
    pub async fn stored_request(&self, id: Uuid) -> Option<Request> {
        self.tables.read().await.requests.iter().find(|r| r.id == id).cloned()
    }

    pub async fn stored_notifications(&self) -> Vec<Notification> {
        self.tables.read().await.notifications.clone()
    }

    async fn check_read(&self, collection: &'static str) -> Result<(), AppError> {
        let faults = self.faults.read().await;
        if faults.transport_down {
            return Err(AppError::TransportFailure("backend em memória fora do ar".into()));
        }
        if faults.failing_collection == Some(collection) {
            return Err(AppError::TransportFailure(format!("falha ao ler {collection}")));
        }
        Ok(())
    }

    async fn check_write(&self) -> Result<(), AppError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.faults.read().await.write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let faults = self.faults.read().await;
        if faults.transport_down {
            return Err(AppError::TransportFailure("backend em memória fora do ar".into()));
        }
        if faults.reject_writes {
            return Err(AppError::WriteRejected("escrita recusada pelo teste".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChurchBackend for MemoryBackend {
    async fn fetch_profile(&self, member_id: Uuid) -> Result<Member, AppError> {
        self.profile_fetches.fetch_add(1, Ordering::SeqCst);
        let delay = self.faults.read().await.profile_delays.get(&member_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_read("members").await?;
        self.tables
            .read()
            .await
            .members
            .iter()
            .find(|m| m.id == member_id)
            .cloned()
            .ok_or(AppError::NotFound("perfil de membro"))
    }

    async fn fetch_members(&self) -> Result<Vec<Member>, AppError> {
        self.check_read("members").await?;
        let mut members = self.tables.read().await.members.clone();
        members.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(members)
    }

    async fn fetch_congregations(&self) -> Result<Vec<Congregation>, AppError> {
        self.check_read("congregations").await?;
        let mut congregations = self.tables.read().await.congregations.clone();
        congregations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(congregations)
    }

    async fn fetch_requests(&self) -> Result<Vec<Request>, AppError> {
        self.check_read("requests").await?;
        let mut requests = self.tables.read().await.requests.clone();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn fetch_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        self.check_read("transactions").await?;
        let mut transactions = self.tables.read().await.transactions.clone();
        transactions.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(transactions)
    }

    async fn fetch_ministries(&self) -> Result<Vec<Ministry>, AppError> {
        self.check_read("ministries").await?;
        Ok(self.tables.read().await.ministries.clone())
    }

    async fn fetch_networks(&self) -> Result<Vec<Network>, AppError> {
        self.check_read("networks").await?;
        Ok(self.tables.read().await.networks.clone())
    }

    async fn fetch_notifications(&self, owner_id: Uuid) -> Result<Vec<Notification>, AppError> {
        self.check_read("notifications").await?;
        let mut notifications: Vec<Notification> = self
            .tables
            .read()
            .await
            .notifications
            .iter()
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn insert_request(&self, requester_id: Uuid, input: &NewRequest) -> Result<Request, AppError> {
        self.check_write().await?;
        let request = Request {
            id: Uuid::new_v4(),
            requester_id,
            kind: input.kind,
            status: RequestStatus::Pending,
            details: input.details.clone(),
            created_at: Utc::now(),
        };
        self.tables.write().await.requests.push(request.clone());
        Ok(request)
    }

    async fn update_request_status(&self, id: Uuid, status: RequestStatus) -> Result<Request, AppError> {
        self.check_write().await?;
        let mut tables = self.tables.write().await;
        let request = tables
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AppError::NotFound("solicitação"))?;
        request.status = status;
        Ok(request.clone())
    }

    async fn insert_transaction(
        &self,
        input: &NewTransaction,
        congregation_id: Option<Uuid>,
    ) -> Result<Transaction, AppError> {
        self.check_write().await?;
        let transaction = Transaction {
            id: Uuid::new_v4(),
            direction: input.direction,
            category: input.category.clone(),
            amount: input.amount,
            description: input.description.clone(),
            occurred_at: Utc::now(),
            congregation_id,
        };
        self.tables.write().await.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn mark_notification_read(&self, id: Uuid) -> Result<Notification, AppError> {
        self.check_write().await?;
        let mut tables = self.tables.write().await;
        let notification = tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(AppError::NotFound("notificação"))?;
        notification.read = true;
        Ok(notification.clone())
    }

    async fn mark_all_notifications_read(&self, owner_id: Uuid) -> Result<Vec<Notification>, AppError> {
        self.check_write().await?;
        let mut tables = self.tables.write().await;
        let mut changed = Vec::new();
        for notification in tables
            .notifications
            .iter_mut()
            .filter(|n| n.owner_id == owner_id && !n.read)
        {
            notification.read = true;
            changed.push(notification.clone());
        }
        Ok(changed)
    }

    async fn update_member_profile(
        &self,
        member_id: Uuid,
        update: &MemberProfileUpdate,
    ) -> Result<Member, AppError> {
        self.check_write().await?;
        let mut tables = self.tables.write().await;
        let member = tables
            .members
            .iter_mut()
            .find(|m| m.id == member_id)
            .ok_or(AppError::NotFound("perfil de membro"))?;
        update.apply_to(member);
        Ok(member.clone())
    }
}

#[async_trait]
impl AccountStore for MemoryBackend {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        self.check_read("users").await?;
        Ok(self.tables.read().await.accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        self.check_read("users").await?;
        Ok(self.tables.read().await.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn create_account(
        &self,
        email: &str,
        password_hash: &str,
        profile: &NewMemberProfile,
    ) -> Result<Account, AppError> {
        self.check_write().await?;
        let mut tables = self.tables.write().await;
        if tables.accounts.iter().any(|a| a.email == email) {
            return Err(AppError::EmailAlreadyExists);
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        let mut member = fixtures::member(&profile.full_name, EcclesiasticalRole::None, None);
        member.id = account.id;
        member.birth_date = profile.birth_date;
        member.email = Some(profile.email.clone());

        tables.accounts.push(account.clone());
        tables.members.push(member);
        Ok(account)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        self.check_write().await?;
        let mut tables = self.tables.write().await;
        let account = tables
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AppError::NotFound("conta"))?;
        account.password_hash = password_hash.to_string();
        account.updated_at = Utc::now();
        Ok(())
    }
}

/// Construtores de linhas para os testes.
pub mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::models::{
        congregation::{Congregation, CongregationKind},
        finance::{Direction, Transaction},
        member::{EcclesiasticalRole, Member},
        ministry::{Ministry, MinistryCategory},
        network::{Network, NetworkKind},
        notification::{Notification, Severity},
        request::{Request, RequestKind, RequestStatus},
    };

    pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    pub fn member(full_name: &str, role: EcclesiasticalRole, congregation_id: Option<Uuid>) -> Member {
        Member {
            id: Uuid::new_v4(),
            registration_number: None,
            full_name: full_name.to_string(),
            birth_date: None,
            phone: None,
            email: None,
            document_number: None,
            sex: None,
            marital_status: None,
            baptized: false,
            role,
            address: None,
            congregation_id,
            created_at: Utc::now(),
        }
    }

    pub fn congregation(name: &str, kind: CongregationKind, leader_id: Option<Uuid>) -> Congregation {
        Congregation {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address: None,
            kind,
            leader_id,
            phone: None,
            created_at: Utc::now(),
        }
    }

    pub fn request(requester_id: Uuid, kind: RequestKind, status: RequestStatus) -> Request {
        Request {
            id: Uuid::new_v4(),
            requester_id,
            kind,
            status,
            details: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn transaction(
        direction: Direction,
        category: &str,
        amount: Decimal,
        occurred_at: DateTime<Utc>,
    ) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            direction,
            category: category.to_string(),
            amount,
            description: None,
            occurred_at,
            congregation_id: None,
        }
    }

    pub fn ministry(name: &str, category: MinistryCategory, leader_id: Option<Uuid>, member_ids: Vec<Uuid>) -> Ministry {
        Ministry {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            leader_id,
            category,
            member_ids,
        }
    }

    pub fn network(name: &str, kind: NetworkKind, leader_id: Option<Uuid>, member_ids: Vec<Uuid>) -> Network {
        Network {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind,
            leader_id,
            address: None,
            weekday: None,
            meeting_time: None,
            member_ids,
        }
    }

    pub fn notification(owner_id: Uuid, title: &str, read: bool) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            owner_id,
            severity: Severity::Info,
            title: title.to_string(),
            body: String::new(),
            read,
            created_at: Utc::now(),
        }
    }
}
