// src/services/auth.rs

use std::sync::Arc;

use async_trait::async_trait;
use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tokio::sync::{broadcast, RwLock};
use validator::Validate;

use super::session::{AuthEvent, AuthProvider};
use crate::{
    common::error::AppError,
    db::AccountStore,
    models::{
        auth::{Account, ChangePasswordPayload, Claims, Identity, SignInPayload, SignUpPayload},
        member::NewMemberProfile,
    },
};

/// Provedor de autenticação local: contas com bcrypt, tokens JWT e uma única sessão ativa.
#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    jwt_secret: String,
    token_ttl: chrono::Duration,
    hash_cost: u32,
    session: Arc<RwLock<Option<Identity>>>,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthService {
    pub fn new(accounts: Arc<dyn AccountStore>, jwt_secret: String, token_ttl: chrono::Duration) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            accounts,
            jwt_secret,
            token_ttl,
            hash_cost: bcrypt::DEFAULT_COST,
            session: Arc::new(RwLock::new(None)),
            events,
        }
    }

    /// Custo do bcrypt. Os testes usam o mínimo para não demorar.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Cria conta + perfil e já entra com ela.
    pub async fn sign_up(&self, payload: SignUpPayload) -> Result<String, AppError> {
        payload.validate()?;

        let hashed_password = self.hash_password(payload.password).await?;
        let profile = NewMemberProfile {
            full_name: payload.full_name,
            birth_date: payload.birth_date,
            email: payload.email.clone(),
        };
        let account = self
            .accounts
            .create_account(&payload.email, &hashed_password, &profile)
            .await?;

        tracing::info!(user_id = %account.id, "✅ Conta criada");
        self.open_session(&account).await
    }

    pub async fn sign_in(&self, payload: SignInPayload) -> Result<String, AppError> {
        payload.validate()?;

        let account = self
            .accounts
            .find_by_email(&payload.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password = payload.password;
        let password_hash = account.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            tracing::warn!("Tentativa de login com senha inválida");
            return Err(AppError::InvalidCredentials);
        }

        self.open_session(&account).await
    }

    pub async fn sign_out(&self) {
        let previous = self.session.write().await.take();
        if previous.is_some() {
            let _ = self.events.send(AuthEvent::SignedOut);
        }
    }

    pub async fn change_password(&self, payload: ChangePasswordPayload) -> Result<(), AppError> {
        payload.validate()?;
        let identity = self.current_identity().await.ok_or(AppError::NotSignedIn)?;

        let hashed_password = self.hash_password(payload.new_password).await?;
        self.accounts.update_password(identity.user_id, &hashed_password).await?;

        tracing::info!(user_id = %identity.user_id, "🔑 Senha alterada");
        let _ = self.events.send(AuthEvent::UserUpdated(identity));
        Ok(())
    }

    /// Confere assinatura e validade e devolve a identidade do token.
    pub async fn validate_token(&self, token: &str) -> Result<Identity, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        let account = self
            .accounts
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;
        Ok(Identity::from(&account))
    }

    pub async fn current_identity(&self) -> Option<Identity> {
        self.session.read().await.clone()
    }

    async fn open_session(&self, account: &Account) -> Result<String, AppError> {
        let token = self.create_token(account)?;
        let identity = Identity::from(account);
        let previous = self.session.write().await.replace(identity.clone());

        // Trocar de conta encerra a sessão anterior primeiro
        // Sem inscritos o envio falha; a sessão vale do mesmo jeito
        if previous.is_some_and(|p| p.user_id != identity.user_id) {
            tracing::info!(user_id = %identity.user_id, "Troca de conta; sessão anterior encerrada");
            let _ = self.events.send(AuthEvent::SignedOut);
        }
        let _ = self.events.send(AuthEvent::SignedIn(identity));
        Ok(token)
    }

    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let cost = self.hash_cost;
        let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    fn create_token(&self, account: &Account) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: account.id,
            email: account.email.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[async_trait]
impl AuthProvider for AuthService {
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn current_session(&self) -> Result<Option<Identity>, AppError> {
        Ok(self.current_identity().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryBackend;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryBackend::new()),
            "segredo-de-teste".into(),
            chrono::Duration::days(7),
        )
        .with_hash_cost(4)
    }

    fn sign_up_payload(email: &str) -> SignUpPayload {
        SignUpPayload {
            email: email.into(),
            password: "senha123".into(),
            full_name: "Maria da Silva".into(),
            birth_date: None,
        }
    }

    #[tokio::test]
    async fn sign_up_opens_a_session_and_publishes() {
        let auth = service();
        let mut events = auth.subscribe();

        let token = auth.sign_up(sign_up_payload("maria@igreja.org")).await.unwrap();

        let identity = auth.validate_token(&token).await.unwrap();
        assert_eq!(identity.email, "maria@igreja.org");
        assert_eq!(auth.current_identity().await, Some(identity.clone()));
        assert_eq!(events.recv().await.unwrap(), AuthEvent::SignedIn(identity));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let auth = service();
        auth.sign_up(sign_up_payload("maria@igreja.org")).await.unwrap();

        let err = auth.sign_up(sign_up_payload("maria@igreja.org")).await.unwrap_err();
        assert!(matches!(err, AppError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let auth = service();
        auth.sign_up(sign_up_payload("maria@igreja.org")).await.unwrap();

        let err = auth
            .sign_in(SignInPayload { email: "maria@igreja.org".into(), password: "errada1".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));

        let err = auth
            .sign_in(SignInPayload { email: "ninguem@igreja.org".into(), password: "senha123".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn change_password_requires_session_and_length() {
        let auth = service();
        let err = auth
            .change_password(ChangePasswordPayload { new_password: "novasenha".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotSignedIn));

        auth.sign_up(sign_up_payload("maria@igreja.org")).await.unwrap();
        let err = auth
            .change_password(ChangePasswordPayload { new_password: "123".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn changed_password_is_the_one_that_works() {
        let auth = service();
        auth.sign_up(sign_up_payload("maria@igreja.org")).await.unwrap();
        let mut events = auth.subscribe();

        auth.change_password(ChangePasswordPayload { new_password: "novasenha".into() })
            .await
            .unwrap();
        assert!(matches!(events.recv().await.unwrap(), AuthEvent::UserUpdated(_)));

        auth.sign_out().await;
        assert!(
            auth.sign_in(SignInPayload { email: "maria@igreja.org".into(), password: "senha123".into() })
                .await
                .is_err()
        );
        assert!(
            auth.sign_in(SignInPayload { email: "maria@igreja.org".into(), password: "novasenha".into() })
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn sign_out_clears_session() {
        let auth = service();
        auth.sign_up(sign_up_payload("maria@igreja.org")).await.unwrap();
        let mut events = auth.subscribe();

        auth.sign_out().await;

        assert!(auth.current_identity().await.is_none());
        assert_eq!(events.recv().await.unwrap(), AuthEvent::SignedOut);
    }

    #[tokio::test]
    async fn switching_accounts_signs_out_first() {
        let auth = service();
        auth.sign_up(sign_up_payload("maria@igreja.org")).await.unwrap();
        let mut events = auth.subscribe();

        auth.sign_up(sign_up_payload("joao@igreja.org")).await.unwrap();

        assert_eq!(events.recv().await.unwrap(), AuthEvent::SignedOut);
        match events.recv().await.unwrap() {
            AuthEvent::SignedIn(identity) => assert_eq!(identity.email, "joao@igreja.org"),
            other => panic!("evento inesperado: {other:?}"),
        }
    }

    #[tokio::test]
    async fn signing_in_again_as_the_same_account_only_signs_in() {
        let auth = service();
        auth.sign_up(sign_up_payload("maria@igreja.org")).await.unwrap();
        let mut events = auth.subscribe();

        auth.sign_in(SignInPayload { email: "maria@igreja.org".into(), password: "senha123".into() })
            .await
            .unwrap();

        assert!(matches!(events.recv().await.unwrap(), AuthEvent::SignedIn(_)));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn garbage_token_is_invalid() {
        let auth = service();
        assert!(matches!(auth.validate_token("nao-e-um-jwt").await, Err(AppError::InvalidToken)));
    }
}
