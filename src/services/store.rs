// src/services/store.rs

use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ChurchBackend,
    models::{
        auth::Identity,
        congregation::Congregation,
        finance::Transaction,
        member::Member,
        ministry::Ministry,
        network::Network,
        notification::Notification,
        request::Request,
    },
};

mod mutators;

/// Cópia das sete coleções, na ordem em que o backend entregou (ou em que os mutators inseriram).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub members: Vec<Member>,
    pub congregations: Vec<Congregation>,
    pub requests: Vec<Request>,
    pub transactions: Vec<Transaction>,
    pub ministries: Vec<Ministry>,
    pub networks: Vec<Network>,
    pub notifications: Vec<Notification>,
}

impl StoreSnapshot {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
            && self.congregations.is_empty()
            && self.requests.is_empty()
            && self.transactions.is_empty()
            && self.ministries.is_empty()
            && self.networks.is_empty()
            && self.notifications.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// O resultado desta chamada virou o estado atual.
    Applied,
    /// Outra recarga (ou um reset) começou depois desta; o resultado foi descartado.
    Superseded,
}

#[derive(Default)]
struct StoreState {
    identity: Option<Identity>,
    profile: Option<Member>,
    data: StoreSnapshot,
    // Token da recarga mais recente iniciada. Reset também avança.
    latest_token: u64,
    loading: bool,
    loading_for: Option<Uuid>,
    // Avança a cada reset e a cada troca de conta; mutators não aplicam patch de outra sessão
    epoch: u64,
}

/// Espelho em memória das coleções do backend para a sessão atual.
///
/// Dono exclusivo das cópias locais: nada fora de `reload`, `reset` e dos mutators
/// altera o estado. Passado por `Arc` no `AppState`, nunca global.
pub struct AggregateStore {
    backend: Arc<dyn ChurchBackend>,
    state: RwLock<StoreState>,
    // Sinaliza o fim da recarga mais recente (ou um reset)
    settled: watch::Sender<u64>,
}

impl AggregateStore {
    pub fn new(backend: Arc<dyn ChurchBackend>) -> Self {
        let (settled, _) = watch::channel(0);
        Self {
            backend,
            state: RwLock::new(StoreState::default()),
            settled,
        }
    }

    /// Busca perfil + sete coleções em paralelo e troca tudo de uma vez.
    ///
    /// Se qualquer busca falhar, nada é aplicado e o erro volta para o chamador. Se uma
    /// recarga mais nova (ou um reset) começou enquanto esta estava em voo, o resultado
    /// é descartado e a chamada devolve `ReloadOutcome::Superseded`.
    pub async fn reload(&self, identity: Identity) -> Result<ReloadOutcome, AppError> {
        let token = {
            let mut state = self.state.write().await;
            state.latest_token += 1;
            state.loading = true;
            state.loading_for = Some(identity.user_id);
            state.latest_token
        };

        tracing::debug!(token, user_id = %identity.user_id, "🔄 Recarregando coleções");
        let fetched = self.fetch_everything(identity.user_id).await;

        let mut state = self.state.write().await;
        if state.latest_token != token {
            tracing::debug!(token, latest = state.latest_token, "Resposta obsoleta descartada");
            return Ok(ReloadOutcome::Superseded);
        }
        state.loading = false;
        state.loading_for = None;
        self.settle();

        let (profile, data) = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(user_id = %identity.user_id, "Falha ao recarregar coleções: {}", e);
                return Err(e);
            }
        };

        tracing::info!(
            user_id = %identity.user_id,
            members = data.members.len(),
            requests = data.requests.len(),
            transactions = data.transactions.len(),
            "✅ Coleções carregadas"
        );
        if state.identity.as_ref().map(|i| i.user_id) != Some(identity.user_id) {
            state.epoch += 1;
        }
        state.identity = Some(identity);
        state.profile = Some(profile);
        state.data = data;
        Ok(ReloadOutcome::Applied)
    }

    async fn fetch_everything(&self, user_id: Uuid) -> Result<(Member, StoreSnapshot), AppError> {
        let backend = self.backend.as_ref();
        let (profile, members, congregations, requests, transactions, ministries, networks, notifications) = tokio::join!(
            backend.fetch_profile(user_id),
            backend.fetch_members(),
            backend.fetch_congregations(),
            backend.fetch_requests(),
            backend.fetch_transactions(),
            backend.fetch_ministries(),
            backend.fetch_networks(),
            backend.fetch_notifications(user_id),
        );

        // O perfil vem primeiro: é o erro que interessa ao chamador
        let profile = profile?;
        let data = StoreSnapshot {
            members: members?,
            congregations: congregations?,
            requests: requests?,
            transactions: transactions?,
            ministries: ministries?,
            networks: networks?,
            notifications: notifications?,
        };
        Ok((profile, data))
    }

    /// Limpa as sete coleções e o perfil de uma vez. Idempotente.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.latest_token += 1;
        state.epoch += 1;
        state.loading = false;
        state.loading_for = None;
        state.identity = None;
        state.profile = None;
        state.data = StoreSnapshot::default();
        self.settle();
        tracing::info!("🧹 Coleções locais limpas");
    }

    /// Garante perfil e coleções desta identidade.
    ///
    /// Se uma recarga para ela já está em voo, espera o resultado em vez de disparar outra.
    pub async fn ensure_loaded(&self, identity: &Identity) -> Result<(), AppError> {
        let mut settled = self.settled.subscribe();
        loop {
            {
                let state = self.state.read().await;
                if state.loading_for != Some(identity.user_id) {
                    if state.profile.as_ref().is_some_and(|p| p.id == identity.user_id) {
                        return Ok(());
                    }
                    break;
                }
            }
            tracing::debug!(user_id = %identity.user_id, "Aguardando recarga em voo");
            settled
                .changed()
                .await
                .map_err(|e| anyhow::anyhow!("Sinal do store encerrado: {}", e))?;
        }
        self.reload(identity.clone()).await.map(|_| ())
    }

    fn settle(&self) {
        self.settled.send_modify(|round| *round = round.wrapping_add(1));
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.data.clone()
    }

    pub async fn profile(&self) -> Option<Member> {
        self.state.read().await.profile.clone()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.state.read().await.identity.clone()
    }

    /// Perfil + coleções lidos sob a mesma trava.
    pub async fn view(&self) -> Option<(Member, StoreSnapshot)> {
        let state = self.state.read().await;
        state.profile.clone().map(|profile| (profile, state.data.clone()))
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::db::memory::{fixtures, MemoryBackend};
    use crate::models::{
        member::EcclesiasticalRole,
        request::{RequestKind, RequestStatus},
    };

    fn identity(member: &Member) -> Identity {
        Identity {
            user_id: member.id,
            email: format!("{}@igreja.org", member.id),
        }
    }

    async fn seeded() -> (Arc<MemoryBackend>, Member, Member) {
        let backend = Arc::new(MemoryBackend::new());
        let ana = fixtures::member("Ana", EcclesiasticalRole::Pastor, None);
        let bruno = fixtures::member("Bruno", EcclesiasticalRole::None, None);
        backend.seed_member(ana.clone()).await;
        backend.seed_member(bruno.clone()).await;
        backend
            .seed_request(fixtures::request(bruno.id, RequestKind::Baptism, RequestStatus::Pending))
            .await;
        backend.seed_notification(fixtures::notification(ana.id, "para Ana", false)).await;
        backend.seed_notification(fixtures::notification(bruno.id, "para Bruno", false)).await;
        (backend, ana, bruno)
    }

    #[tokio::test]
    async fn reload_replaces_all_collections() {
        let (backend, ana, _) = seeded().await;
        let store = AggregateStore::new(backend);

        let outcome = store.reload(identity(&ana)).await.unwrap();
        assert_eq!(outcome, ReloadOutcome::Applied);
        assert!(!store.is_loading().await);
        assert_eq!(store.profile().await.unwrap().id, ana.id);

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.members.len(), 2);
        assert_eq!(snapshot.requests.len(), 1);
        // notificações filtradas pelo dono
        assert_eq!(snapshot.notifications.len(), 1);
        assert_eq!(snapshot.notifications[0].owner_id, ana.id);
    }

    #[tokio::test]
    async fn missing_profile_keeps_previous_state() {
        let (backend, ana, _) = seeded().await;
        let store = AggregateStore::new(backend.clone());
        store.reload(identity(&ana)).await.unwrap();
        let before = store.snapshot().await;

        let ghost = Identity { user_id: Uuid::new_v4(), email: "ghost@igreja.org".into() };
        let err = store.reload(ghost).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(!store.is_loading().await);
        assert_eq!(store.snapshot().await, before);
        assert_eq!(store.profile().await.unwrap().id, ana.id);
    }

    #[tokio::test]
    async fn failing_collection_is_not_partially_applied() {
        let (backend, ana, bruno) = seeded().await;
        let store = AggregateStore::new(backend.clone());
        store.reload(identity(&ana)).await.unwrap();
        let before = store.snapshot().await;

        backend.seed_member(fixtures::member("Carla", EcclesiasticalRole::None, None)).await;
        backend.set_failing_collection(Some("transactions")).await;
        let err = store.reload(identity(&bruno)).await.unwrap_err();

        assert!(err.is_transient());
        assert_eq!(store.snapshot().await, before);
        assert_eq!(store.identity().await.unwrap().user_id, ana.id);
    }

    #[tokio::test]
    async fn most_recently_initiated_reload_wins() {
        let (backend, ana, bruno) = seeded().await;
        backend.set_profile_delay(ana.id, Duration::from_millis(150)).await;
        let store = AggregateStore::new(backend);

        let (slow, fast) = tokio::join!(store.reload(identity(&ana)), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            store.reload(identity(&bruno)).await
        });

        assert_eq!(fast.unwrap(), ReloadOutcome::Applied);
        assert_eq!(slow.unwrap(), ReloadOutcome::Superseded);
        assert_eq!(store.profile().await.unwrap().id, bruno.id);
        assert_eq!(store.snapshot().await.notifications[0].owner_id, bruno.id);
        assert!(!store.is_loading().await);
    }

    #[tokio::test]
    async fn reset_discards_reload_in_flight() {
        let (backend, ana, _) = seeded().await;
        backend.set_profile_delay(ana.id, Duration::from_millis(100)).await;
        let store = AggregateStore::new(backend);

        let (outcome, _) = tokio::join!(store.reload(identity(&ana)), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert!(store.is_loading().await);
            store.reset().await;
        });

        assert_eq!(outcome.unwrap(), ReloadOutcome::Superseded);
        assert!(store.snapshot().await.is_empty());
        assert!(store.profile().await.is_none());
    }

    #[tokio::test]
    async fn reset_is_idempotent() {
        let (backend, ana, _) = seeded().await;
        let store = AggregateStore::new(backend);
        store.reload(identity(&ana)).await.unwrap();

        store.reset().await;
        store.reset().await;

        assert!(store.snapshot().await.is_empty());
        assert!(store.profile().await.is_none());
        assert!(store.identity().await.is_none());
        assert!(!store.is_loading().await);
    }

    #[tokio::test]
    async fn ensure_loaded_joins_the_reload_in_flight() {
        let (backend, ana, _) = seeded().await;
        backend.set_profile_delay(ana.id, Duration::from_millis(100)).await;
        let store = AggregateStore::new(backend.clone());

        let (first, joined) = tokio::join!(store.reload(identity(&ana)), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            store.ensure_loaded(&identity(&ana)).await
        });

        assert_eq!(first.unwrap(), ReloadOutcome::Applied);
        joined.unwrap();
        assert_eq!(backend.profile_fetches(), 1);
        assert_eq!(store.profile().await.unwrap().id, ana.id);
    }

    #[tokio::test]
    async fn ensure_loaded_fetches_only_what_is_missing() {
        let (backend, ana, bruno) = seeded().await;
        let store = AggregateStore::new(backend.clone());
        store.reload(identity(&ana)).await.unwrap();

        store.ensure_loaded(&identity(&ana)).await.unwrap();
        assert_eq!(backend.profile_fetches(), 1);

        store.ensure_loaded(&identity(&bruno)).await.unwrap();
        assert_eq!(backend.profile_fetches(), 2);
        assert_eq!(store.profile().await.unwrap().id, bruno.id);
    }

    #[tokio::test]
    async fn waiter_retries_after_a_failed_reload() {
        let (backend, ana, _) = seeded().await;
        backend.set_profile_delay(ana.id, Duration::from_millis(60)).await;
        backend.set_failing_collection(Some("requests")).await;
        let store = AggregateStore::new(backend.clone());

        let (first, joined) = tokio::join!(store.reload(identity(&ana)), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            backend.set_failing_collection(None).await;
            store.ensure_loaded(&identity(&ana)).await
        });

        assert!(first.unwrap_err().is_transient());
        joined.unwrap();
        assert_eq!(backend.profile_fetches(), 2);
        assert_eq!(store.profile().await.unwrap().id, ana.id);
    }
}
