// src/services/store/mutators.rs
//
// Escritas: chamada remota primeiro, patch local só com a linha confirmada.

use std::collections::HashSet;

use uuid::Uuid;

use super::{AggregateStore, StoreState};
use crate::{
    common::error::AppError,
    models::{
        finance::{NewTransaction, Transaction},
        member::{Member, MemberProfileUpdate},
        notification::Notification,
        request::{NewRequest, Request, RequestStatus},
    },
    services::reconcile::{bulk_patch, insert_front, replace_by_id},
};

impl StoreState {
    /// Perfil dono das escritas. Durante a troca de conta o perfil carregado já não vale.
    fn session_member(&self) -> Result<&Member, AppError> {
        let profile = self.profile.as_ref().ok_or(AppError::NotSignedIn)?;
        if self.loading_for.is_some_and(|id| id != profile.id) {
            tracing::warn!(member_id = %profile.id, "Troca de conta em andamento; escrita recusada");
            return Err(AppError::NotSignedIn);
        }
        Ok(profile)
    }
}

impl AggregateStore {
    /// Perfil da sessão atual e a época em que a escrita começou.
    async fn session_profile(&self) -> Result<(Member, u64), AppError> {
        let state = self.state.read().await;
        let profile = state.session_member()?.clone();
        Ok((profile, state.epoch))
    }

    /// Aplica o patch se a sessão que pediu a escrita ainda é a atual.
    async fn patch<F>(&self, epoch: u64, apply: F) -> bool
    where
        F: FnOnce(&mut StoreState),
    {
        let mut state = self.state.write().await;
        if state.epoch != epoch {
            tracing::debug!(epoch, current = state.epoch, "Sessão encerrada durante a escrita; patch ignorado");
            return false;
        }
        apply(&mut state);
        true
    }

    pub async fn create_request(&self, input: NewRequest) -> Result<Request, AppError> {
        let (profile, epoch) = self.session_profile().await?;

        let confirmed = self
            .backend
            .insert_request(profile.id, &input)
            .await
            .inspect_err(|e| tracing::warn!("Falha ao criar solicitação: {}", e))?;

        tracing::info!(request_id = %confirmed.id, kind = ?confirmed.kind, "📝 Solicitação criada");
        let row = confirmed.clone();
        self.patch(epoch, move |state| insert_front(&mut state.data.requests, row))
            .await;
        Ok(confirmed)
    }

    /// Não valida a transição: quem oferece aprovar/rejeitar só o faz para pendentes.
    pub async fn update_request_status(&self, id: Uuid, status: RequestStatus) -> Result<Request, AppError> {
        let (_, epoch) = self.session_profile().await?;

        let confirmed = self
            .backend
            .update_request_status(id, status)
            .await
            .inspect_err(|e| tracing::warn!(request_id = %id, "Falha ao atualizar solicitação: {}", e))?;

        tracing::info!(request_id = %id, status = ?confirmed.status, "Solicitação atualizada");
        let row = confirmed.clone();
        self.patch(epoch, move |state| {
            replace_by_id(&mut state.data.requests, row);
        })
        .await;
        Ok(confirmed)
    }

    pub async fn approve_request(&self, id: Uuid) -> Result<Request, AppError> {
        self.update_request_status(id, RequestStatus::Approved).await
    }

    pub async fn reject_request(&self, id: Uuid) -> Result<Request, AppError> {
        self.update_request_status(id, RequestStatus::Rejected).await
    }

    /// Sem congregação informada, usa a do perfil.
    pub async fn create_transaction(&self, input: NewTransaction) -> Result<Transaction, AppError> {
        let (profile, epoch) = self.session_profile().await?;
        let congregation_id = input.congregation_id.or(profile.congregation_id);

        let confirmed = self
            .backend
            .insert_transaction(&input, congregation_id)
            .await
            .inspect_err(|e| tracing::warn!("Falha ao registrar movimentação: {}", e))?;

        tracing::info!(
            transaction_id = %confirmed.id,
            direction = ?confirmed.direction,
            amount = %confirmed.amount,
            "💰 Movimentação registrada"
        );
        let row = confirmed.clone();
        self.patch(epoch, move |state| insert_front(&mut state.data.transactions, row))
            .await;
        Ok(confirmed)
    }

    pub async fn mark_notification_read(&self, id: Uuid) -> Result<Notification, AppError> {
        let (_, epoch) = self.session_profile().await?;

        let confirmed = self
            .backend
            .mark_notification_read(id)
            .await
            .inspect_err(|e| tracing::warn!(notification_id = %id, "Falha ao marcar notificação: {}", e))?;

        let row = confirmed.clone();
        self.patch(epoch, move |state| {
            replace_by_id(&mut state.data.notifications, row);
        })
        .await;
        Ok(confirmed)
    }

    /// Uma chamada remota e uma passada local. Sem nada pendente, nem chama o servidor.
    ///
    /// Devolve quantas notificações o servidor alterou.
    pub async fn mark_all_notifications_read(&self) -> Result<usize, AppError> {
        let (owner_id, epoch, unread) = {
            let state = self.state.read().await;
            let profile = state.session_member()?;
            let unread = state.data.notifications.iter().filter(|n| !n.read).count();
            (profile.id, state.epoch, unread)
        };
        if unread == 0 {
            return Ok(0);
        }

        let changed = self
            .backend
            .mark_all_notifications_read(owner_id)
            .await
            .inspect_err(|e| tracing::warn!("Falha ao marcar notificações como lidas: {}", e))?;

        let ids: HashSet<Uuid> = changed.iter().map(|n| n.id).collect();
        self.patch(epoch, move |state| {
            bulk_patch(
                &mut state.data.notifications,
                |n| ids.contains(&n.id),
                |n| n.read = true,
            );
        })
        .await;

        tracing::info!(count = changed.len(), "🔔 Notificações marcadas como lidas");
        Ok(changed.len())
    }

    /// Atualiza o próprio perfil; a linha confirmada vale para o perfil e para a lista de membros.
    pub async fn update_profile(&self, update: MemberProfileUpdate) -> Result<Member, AppError> {
        let (profile, epoch) = self.session_profile().await?;

        let confirmed = self
            .backend
            .update_member_profile(profile.id, &update)
            .await
            .inspect_err(|e| tracing::warn!(member_id = %profile.id, "Falha ao atualizar perfil: {}", e))?;

        tracing::info!(member_id = %confirmed.id, "👤 Perfil atualizado");
        let row = confirmed.clone();
        self.patch(epoch, move |state| {
            replace_by_id(&mut state.data.members, row.clone());
            state.profile = Some(row);
        })
        .await;
        Ok(confirmed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use crate::{
        common::error::AppError,
        db::memory::{fixtures, MemoryBackend},
        models::{
            auth::Identity,
            finance::{Direction, NewTransaction},
            member::{EcclesiasticalRole, Member, MemberProfileUpdate},
            request::{NewRequest, Request, RequestKind, RequestStatus},
        },
        services::store::AggregateStore,
    };

    async fn signed_in(backend: &Arc<MemoryBackend>, role: EcclesiasticalRole) -> (AggregateStore, Member) {
        let member = fixtures::member("Marta", role, None);
        backend.seed_member(member.clone()).await;
        let store = AggregateStore::new(backend.clone());
        store
            .reload(Identity { user_id: member.id, email: "marta@igreja.org".into() })
            .await
            .unwrap();
        (store, member)
    }

    fn aged(mut request: Request, minutes: i64) -> Request {
        request.created_at = Utc::now() - Duration::minutes(minutes);
        request
    }

    #[tokio::test]
    async fn approve_replaces_in_place() {
        let backend = Arc::new(MemoryBackend::new());
        let someone = uuid::Uuid::new_v4();
        let first = aged(fixtures::request(someone, RequestKind::Baptism, RequestStatus::Pending), 1);
        let second = aged(fixtures::request(someone, RequestKind::Transfer, RequestStatus::Approved), 2);
        let third = aged(fixtures::request(someone, RequestKind::Scheduling, RequestStatus::Pending), 3);
        for request in [&first, &second, &third] {
            backend.seed_request(request.clone()).await;
        }
        let (store, _) = signed_in(&backend, EcclesiasticalRole::Pastor).await;

        store.approve_request(first.id).await.unwrap();

        let requests = store.snapshot().await.requests;
        let order: Vec<_> = requests.iter().map(|r| (r.id, r.status)).collect();
        assert_eq!(
            order,
            vec![
                (first.id, RequestStatus::Approved),
                (second.id, RequestStatus::Approved),
                (third.id, RequestStatus::Pending),
            ]
        );
    }

    #[tokio::test]
    async fn approving_twice_keeps_approved() {
        let backend = Arc::new(MemoryBackend::new());
        let request = fixtures::request(uuid::Uuid::new_v4(), RequestKind::Baptism, RequestStatus::Pending);
        backend.seed_request(request.clone()).await;
        let (store, _) = signed_in(&backend, EcclesiasticalRole::Bishop).await;

        store.approve_request(request.id).await.unwrap();
        let again = store.approve_request(request.id).await.unwrap();

        assert_eq!(again.status, RequestStatus::Approved);
        assert_eq!(store.snapshot().await.requests[0].status, RequestStatus::Approved);
        assert_eq!(backend.stored_request(request.id).await.unwrap().status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn create_request_goes_to_the_front() {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .seed_request(fixtures::request(uuid::Uuid::new_v4(), RequestKind::Baptism, RequestStatus::Pending))
            .await;
        let (store, member) = signed_in(&backend, EcclesiasticalRole::None).await;

        let created = store
            .create_request(NewRequest { kind: RequestKind::MembershipCard, details: "segunda via".into() })
            .await
            .unwrap();

        let requests = store.snapshot().await.requests;
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], created);
        assert_eq!(created.requester_id, member.id);
        assert_eq!(created.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn transaction_defaults_to_profile_congregation() {
        let backend = Arc::new(MemoryBackend::new());
        let congregation = uuid::Uuid::new_v4();
        let treasurer = fixtures::member("Paulo", EcclesiasticalRole::Presbyter, Some(congregation));
        backend.seed_member(treasurer.clone()).await;
        let store = AggregateStore::new(backend.clone());
        store
            .reload(Identity { user_id: treasurer.id, email: "paulo@igreja.org".into() })
            .await
            .unwrap();

        let created = store
            .create_transaction(NewTransaction {
                direction: Direction::Inflow,
                category: "Ofertas".into(),
                amount: Decimal::from(50),
                description: None,
                congregation_id: None,
            })
            .await
            .unwrap();

        assert_eq!(created.congregation_id, Some(congregation));
        assert_eq!(store.snapshot().await.transactions[0], created);
    }

    #[tokio::test]
    async fn rejected_write_leaves_state_untouched() {
        let backend = Arc::new(MemoryBackend::new());
        let request = fixtures::request(uuid::Uuid::new_v4(), RequestKind::Baptism, RequestStatus::Pending);
        backend.seed_request(request.clone()).await;
        let (store, _) = signed_in(&backend, EcclesiasticalRole::Pastor).await;
        let before = store.snapshot().await;

        backend.set_reject_writes(true).await;
        let err = store.reject_request(request.id).await.unwrap_err();

        assert!(matches!(err, AppError::WriteRejected(_)));
        assert_eq!(store.snapshot().await, before);
        assert_eq!(backend.write_calls(), 1);
    }

    #[tokio::test]
    async fn writes_need_a_session() {
        let backend = Arc::new(MemoryBackend::new());
        let store = AggregateStore::new(backend.clone());

        let err = store
            .create_request(NewRequest { kind: RequestKind::Baptism, details: String::new() })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotSignedIn));
        assert_eq!(backend.write_calls(), 0);
    }

    #[tokio::test]
    async fn mark_all_without_unread_skips_the_server() {
        let backend = Arc::new(MemoryBackend::new());
        let (store, member) = signed_in(&backend, EcclesiasticalRole::None).await;
        backend.seed_notification(fixtures::notification(member.id, "lida", true)).await;
        store
            .reload(Identity { user_id: member.id, email: "marta@igreja.org".into() })
            .await
            .unwrap();

        assert_eq!(store.mark_all_notifications_read().await.unwrap(), 0);
        assert_eq!(backend.write_calls(), 0);
    }

    #[tokio::test]
    async fn mark_all_patches_every_unread_notification() {
        let backend = Arc::new(MemoryBackend::new());
        let member = fixtures::member("Marta", EcclesiasticalRole::None, None);
        backend.seed_member(member.clone()).await;
        for (title, read) in [("a", false), ("b", true), ("c", false)] {
            backend.seed_notification(fixtures::notification(member.id, title, read)).await;
        }
        let store = AggregateStore::new(backend.clone());
        store
            .reload(Identity { user_id: member.id, email: "marta@igreja.org".into() })
            .await
            .unwrap();

        let changed = store.mark_all_notifications_read().await.unwrap();

        assert_eq!(changed, 2);
        assert_eq!(backend.write_calls(), 1);
        assert!(store.snapshot().await.notifications.iter().all(|n| n.read));
        assert!(backend.stored_notifications().await.iter().all(|n| n.read));
    }

    #[tokio::test]
    async fn profile_update_reaches_profile_and_member_list() {
        let backend = Arc::new(MemoryBackend::new());
        let (store, member) = signed_in(&backend, EcclesiasticalRole::None).await;

        let updated = store
            .update_profile(MemberProfileUpdate {
                full_name: "Marta Oliveira".into(),
                phone: Some("11 99999-0000".into()),
                marital_status: None,
                address: None,
            })
            .await
            .unwrap();

        assert_eq!(updated.id, member.id);
        assert_eq!(store.profile().await.unwrap().full_name, "Marta Oliveira");
        let snapshot = store.snapshot().await;
        let listed = snapshot.members.iter().find(|m| m.id == member.id).unwrap();
        assert_eq!(listed.phone.as_deref(), Some("11 99999-0000"));
    }

    #[tokio::test]
    async fn profile_write_racing_an_account_switch_is_not_patched() {
        let backend = Arc::new(MemoryBackend::new());
        let (store, marta) = signed_in(&backend, EcclesiasticalRole::None).await;
        let davi = fixtures::member("Davi", EcclesiasticalRole::None, None);
        backend.seed_member(davi.clone()).await;
        backend.set_write_delay(Some(std::time::Duration::from_millis(100))).await;

        let (written, switched) = tokio::join!(
            store.update_profile(MemberProfileUpdate {
                full_name: "Marta Oliveira".into(),
                phone: None,
                marital_status: None,
                address: None,
            }),
            async {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                store.reload(Identity { user_id: davi.id, email: "davi@igreja.org".into() }).await
            }
        );

        assert_eq!(written.unwrap().id, marta.id);
        assert!(switched.is_ok());
        assert_eq!(store.identity().await.unwrap().user_id, davi.id);
        assert_eq!(store.profile().await.unwrap().id, davi.id);
    }

    #[tokio::test]
    async fn writes_are_refused_while_switching_accounts() {
        let backend = Arc::new(MemoryBackend::new());
        let (store, _) = signed_in(&backend, EcclesiasticalRole::Pastor).await;
        let davi = fixtures::member("Davi", EcclesiasticalRole::None, None);
        backend.seed_member(davi.clone()).await;
        backend.set_profile_delay(davi.id, std::time::Duration::from_millis(100)).await;
        let writes = backend.write_calls();

        let (_, filed) = tokio::join!(
            store.reload(Identity { user_id: davi.id, email: "davi@igreja.org".into() }),
            async {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                store
                    .create_request(NewRequest { kind: RequestKind::Baptism, details: String::new() })
                    .await
            }
        );

        assert!(matches!(filed, Err(AppError::NotSignedIn)));
        assert_eq!(backend.write_calls(), writes);
        assert!(store.snapshot().await.requests.is_empty());
    }

    #[tokio::test]
    async fn write_after_reset_does_not_patch() {
        let backend = Arc::new(MemoryBackend::new());
        let (store, _) = signed_in(&backend, EcclesiasticalRole::None).await;
        let (_, epoch) = store.session_profile().await.unwrap();

        store.reset().await;
        let applied = store.patch(epoch, |state| state.data.requests.clear()).await;

        assert!(!applied);
    }
}
