// src/services/session.rs

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, watch, Mutex};
use uuid::Uuid;

use super::store::AggregateStore;
use crate::{common::error::AppError, models::auth::Identity};

/// Mudanças de autenticação publicadas pelo provedor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Identity),
    SignedOut,
    UserUpdated(Identity),
}

/// O que a sessão precisa de um provedor de autenticação.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;

    /// Sessão já existente (ex.: restaurada) no momento da consulta.
    async fn current_session(&self) -> Result<Option<Identity>, AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub initializing: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            identity: None,
            initializing: true,
        }
    }
}

/// Liga os eventos de autenticação ao `AggregateStore`.
pub struct SessionGate {
    store: Arc<AggregateStore>,
    state: watch::Sender<SessionState>,
    // Identidade cuja recarga já foi disparada (ou concluída)
    reload_target: Mutex<Option<Uuid>>,
}

impl SessionGate {
    /// Cria o gate e dispara a task que acompanha o provedor.
    pub fn start(auth: Arc<dyn AuthProvider>, store: Arc<AggregateStore>) -> Arc<Self> {
        let (state, _) = watch::channel(SessionState::default());
        let gate = Arc::new(Self {
            store,
            state,
            reload_target: Mutex::new(None),
        });
        tokio::spawn(gate.clone().run(auth));
        gate
    }

    async fn run(self: Arc<Self>, auth: Arc<dyn AuthProvider>) {
        // Inscreve antes da consulta inicial para não perder eventos no meio
        let mut events = auth.subscribe();

        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => self.apply(event).await,
                Err(e) => {
                    tracing::warn!("Canal de autenticação indisponível: {}", e);
                    self.finish_initializing();
                }
            },
            initial = auth.current_session() => match initial {
                Ok(Some(identity)) => self.apply(AuthEvent::SignedIn(identity)).await,
                Ok(None) => self.finish_initializing(),
                Err(e) => {
                    tracing::warn!("Falha ao consultar a sessão inicial: {}", e);
                    self.finish_initializing();
                }
            },
        }

        loop {
            match events.recv().await {
                Ok(event) => self.apply(event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Eventos de autenticação perdidos");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("Provedor de autenticação encerrado");
    }

    async fn apply(self: &Arc<Self>, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(identity) => {
                tracing::info!(user_id = %identity.user_id, "🔐 Sessão iniciada");
                self.state.send_modify(|state| {
                    state.identity = Some(identity.clone());
                    state.initializing = false;
                });
                self.schedule_reload(identity).await;
            }
            AuthEvent::SignedOut => {
                tracing::info!("🚪 Sessão encerrada");
                *self.reload_target.lock().await = None;
                self.state.send_modify(|state| {
                    state.identity = None;
                    state.initializing = false;
                });
                self.store.reset().await;
            }
            AuthEvent::UserUpdated(identity) => {
                self.state.send_modify(|state| state.identity = Some(identity));
            }
        }
    }

    async fn schedule_reload(self: &Arc<Self>, identity: Identity) {
        {
            let mut target = self.reload_target.lock().await;
            if *target == Some(identity.user_id) {
                tracing::debug!(user_id = %identity.user_id, "Recarga já disparada para esta identidade");
                return;
            }
            *target = Some(identity.user_id);
        }

        let gate = self.clone();
        tokio::spawn(async move {
            let user_id = identity.user_id;
            if let Err(e) = gate.store.reload(identity).await {
                if e.is_transient() {
                    tracing::warn!(user_id = %user_id, "Backend indisponível na recarga após login: {}", e);
                } else {
                    tracing::error!(user_id = %user_id, "Recarga após login falhou: {}", e);
                }
                // Libera para que um novo login da mesma identidade tente de novo
                let mut target = gate.reload_target.lock().await;
                if *target == Some(user_id) {
                    *target = None;
                }
            }
        });
    }

    fn finish_initializing(&self) {
        self.state.send_modify(|state| state.initializing = false);
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    pub fn is_initializing(&self) -> bool {
        self.state.borrow().initializing
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn store(&self) -> &Arc<AggregateStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::db::memory::{fixtures, MemoryBackend};
    use crate::models::member::{EcclesiasticalRole, Member};

    struct FakeAuth {
        events: broadcast::Sender<AuthEvent>,
        initial: Option<Identity>,
        initial_delay: Duration,
    }

    impl FakeAuth {
        fn new(initial: Option<Identity>, initial_delay: Duration) -> Arc<Self> {
            let (events, _) = broadcast::channel(16);
            Arc::new(Self { events, initial, initial_delay })
        }

        fn publish(&self, event: AuthEvent) {
            let _ = self.events.send(event);
        }
    }

    #[async_trait]
    impl AuthProvider for FakeAuth {
        fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
            self.events.subscribe()
        }

        async fn current_session(&self) -> Result<Option<Identity>, AppError> {
            tokio::time::sleep(self.initial_delay).await;
            Ok(self.initial.clone())
        }
    }

    fn identity(member: &Member) -> Identity {
        Identity { user_id: member.id, email: format!("{}@igreja.org", member.full_name.to_lowercase()) }
    }

    async fn backend_with(names: &[&str]) -> (Arc<MemoryBackend>, Vec<Member>) {
        let backend = Arc::new(MemoryBackend::new());
        let mut members = Vec::new();
        for name in names {
            let member = fixtures::member(name, EcclesiasticalRole::None, None);
            backend.seed_member(member.clone()).await;
            members.push(member);
        }
        (backend, members)
    }

    async fn profile_becomes(store: &AggregateStore, expected: Option<Uuid>) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while store.profile().await.map(|p| p.id) != expected || store.is_loading().await {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("store não convergiu");
    }

    #[tokio::test]
    async fn restored_session_loads_the_store() {
        let (backend, members) = backend_with(&["Ana"]).await;
        let store = Arc::new(AggregateStore::new(backend));
        let auth = FakeAuth::new(Some(identity(&members[0])), Duration::ZERO);

        let gate = SessionGate::start(auth, store.clone());
        let mut state = gate.subscribe();
        state.wait_for(|s| !s.initializing).await.unwrap();

        assert_eq!(gate.identity().unwrap().user_id, members[0].id);
        profile_becomes(&store, Some(members[0].id)).await;
    }

    #[tokio::test]
    async fn no_session_just_finishes_initializing() {
        let (backend, _) = backend_with(&[]).await;
        let store = Arc::new(AggregateStore::new(backend));
        let gate = SessionGate::start(FakeAuth::new(None, Duration::ZERO), store.clone());

        gate.subscribe().wait_for(|s| !s.initializing).await.unwrap();

        assert!(gate.identity().is_none());
        assert!(store.profile().await.is_none());
    }

    #[tokio::test]
    async fn event_during_initial_query_wins() {
        let (backend, members) = backend_with(&["Ana", "Bruno"]).await;
        let store = Arc::new(AggregateStore::new(backend));
        let auth = FakeAuth::new(Some(identity(&members[0])), Duration::from_millis(200));

        let gate = SessionGate::start(auth.clone(), store.clone());
        tokio::time::sleep(Duration::from_millis(20)).await;
        auth.publish(AuthEvent::SignedIn(identity(&members[1])));

        profile_becomes(&store, Some(members[1].id)).await;
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(gate.identity().unwrap().user_id, members[1].id);
        assert_eq!(store.profile().await.unwrap().id, members[1].id);
    }

    #[tokio::test]
    async fn sign_out_resets_the_store() {
        let (backend, members) = backend_with(&["Ana"]).await;
        let store = Arc::new(AggregateStore::new(backend));
        let auth = FakeAuth::new(Some(identity(&members[0])), Duration::ZERO);
        let gate = SessionGate::start(auth.clone(), store.clone());
        profile_becomes(&store, Some(members[0].id)).await;

        auth.publish(AuthEvent::SignedOut);
        let mut state = gate.subscribe();
        state.wait_for(|s| s.identity.is_none()).await.unwrap();

        profile_becomes(&store, None).await;
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn repeated_sign_in_does_not_reload_again() {
        let (backend, members) = backend_with(&["Ana"]).await;
        let store = Arc::new(AggregateStore::new(backend.clone()));
        let auth = FakeAuth::new(Some(identity(&members[0])), Duration::ZERO);
        let _gate = SessionGate::start(auth.clone(), store.clone());
        profile_becomes(&store, Some(members[0].id)).await;

        // Um membro novo só apareceria se houvesse outra recarga
        backend.seed_member(fixtures::member("Carla", EcclesiasticalRole::None, None)).await;
        auth.publish(AuthEvent::SignedIn(identity(&members[0])));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.snapshot().await.members.len(), 1);

        store.reload(identity(&members[0])).await.unwrap();
        assert_eq!(store.snapshot().await.members.len(), 2);
    }

    #[tokio::test]
    async fn user_updated_only_touches_identity() {
        let (backend, members) = backend_with(&["Ana"]).await;
        let store = Arc::new(AggregateStore::new(backend));
        let auth = FakeAuth::new(Some(identity(&members[0])), Duration::ZERO);
        let gate = SessionGate::start(auth.clone(), store.clone());
        profile_becomes(&store, Some(members[0].id)).await;

        let renamed = Identity { user_id: members[0].id, email: "nova@igreja.org".into() };
        auth.publish(AuthEvent::UserUpdated(renamed.clone()));
        gate.subscribe().wait_for(|s| s.identity.as_ref() == Some(&renamed)).await.unwrap();

        assert_eq!(store.profile().await.unwrap().id, members[0].id);
    }
}
