// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    common::error::AppError,
    db::{AccountStore, ChurchBackend, PgBackend},
    models::{auth::Identity, member::Member},
    services::{
        auth::AuthService,
        session::SessionGate,
        store::{AggregateStore, StoreSnapshot},
    },
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub token_ttl: chrono::Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Mesmo que `from_env`, mas com a fonte das variáveis injetada.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let db_max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?;
        let acquire_secs: u64 = parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 3)?;
        let ttl_days: i64 = parse_or(&lookup, "TOKEN_TTL_DAYS", 7)?;

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            db_max_connections,
            db_acquire_timeout: Duration::from_secs(acquire_secs),
            token_ttl: chrono::Duration::days(ttl_days),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} inválida: {raw}")),
        None => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth_service: AuthService,
    pub store: Arc<AggregateStore>,
    pub session: Arc<SessionGate>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let backend = Arc::new(PgBackend::new(db_pool));
        let auth_service = AuthService::new(
            backend.clone(),
            config.jwt_secret.clone(),
            config.token_ttl,
        );

        Ok(Self::assemble(config, backend, auth_service))
    }

    /// Liga store, sessão e autenticação sobre um backend já pronto.
    pub fn assemble(config: AppConfig, backend: Arc<dyn ChurchBackend>, auth_service: AuthService) -> Self {
        let store = Arc::new(AggregateStore::new(backend));
        let session = SessionGate::start(Arc::new(auth_service.clone()), store.clone());
        Self {
            config: Arc::new(config),
            auth_service,
            store,
            session,
        }
    }

    /// Para testes: backend qualquer que também guarde as contas.
    pub fn with_backend<B>(config: AppConfig, backend: Arc<B>, hash_cost: u32) -> Self
    where
        B: ChurchBackend + AccountStore + 'static,
    {
        let accounts: Arc<dyn AccountStore> = backend.clone();
        let auth_service = AuthService::new(accounts, config.jwt_secret.clone(), config.token_ttl)
            .with_hash_cost(hash_cost);
        Self::assemble(config, backend, auth_service)
    }

    /// Perfil + coleções da sessão do usuário; carrega (ou espera a recarga em voo) se faltar.
    pub async fn loaded_view(&self, identity: &Identity) -> Result<(Member, StoreSnapshot), AppError> {
        self.store.ensure_loaded(identity).await?;
        match self.store.view().await {
            Some((profile, snapshot)) if profile.id == identity.user_id => Ok((profile, snapshot)),
            _ => Err(AppError::NotSignedIn),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/igreja"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.db_acquire_timeout, Duration::from_secs(3));
        assert_eq!(config.token_ttl, chrono::Duration::days(7));
    }

    #[test]
    fn missing_secret_fails() {
        let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/igreja")]))
            .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn bad_number_fails() {
        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/igreja"),
            ("JWT_SECRET", "segredo"),
            ("DB_MAX_CONNECTIONS", "muitas"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
    }

    #[tokio::test]
    async fn view_joins_the_gate_reload_instead_of_starting_another() {
        use crate::{
            db::memory::MemoryBackend,
            models::auth::{SignInPayload, SignUpPayload},
        };

        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/igreja"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();
        let backend = Arc::new(MemoryBackend::new());
        let state = AppState::with_backend(config, backend.clone(), 4);

        state
            .auth_service
            .sign_up(SignUpPayload {
                email: "lia@igreja.org".into(),
                password: "senha123".into(),
                full_name: "Lia Campos".into(),
                birth_date: None,
            })
            .await
            .unwrap();
        let identity = state.auth_service.current_identity().await.unwrap();
        tokio::time::timeout(Duration::from_secs(2), async {
            while !state.store.profile().await.is_some_and(|p| p.id == identity.user_id)
                || state.store.is_loading().await
            {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("primeira carga");

        state.auth_service.sign_out().await;
        backend.set_profile_delay(identity.user_id, Duration::from_millis(100)).await;
        let fetches = backend.profile_fetches();
        state
            .auth_service
            .sign_in(SignInPayload { email: "lia@igreja.org".into(), password: "senha123".into() })
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        let (profile, _) = state.loaded_view(&identity).await.unwrap();

        assert_eq!(profile.id, identity.user_id);
        assert_eq!(backend.profile_fetches(), fetches + 1);
    }
}
