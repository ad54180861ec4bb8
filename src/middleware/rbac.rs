// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    services::access::{Capability, CapabilitySet},
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn capability() -> Capability;

    fn slug() -> &'static str {
        Self::capability().slug()
    }
}

/// 2. O Extractor (Guardião). O cargo vem do perfil carregado no store.
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let AuthenticatedUser(identity) = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)?;

        let (profile, _) = app_state.loaded_view(&identity).await?;
        if let Err(e) = CapabilitySet::for_role(profile.role).require(T::capability()) {
            tracing::warn!(user_id = %identity.user_id, permission = T::slug(), "Acesso negado");
            return Err(e);
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermReviewRequests;
impl PermissionDef for PermReviewRequests {
    fn capability() -> Capability { Capability::ReviewRequests }
}

pub struct PermCreateRequests;
impl PermissionDef for PermCreateRequests {
    fn capability() -> Capability { Capability::CreateRequests }
}

pub struct PermTreasuryWrite;
impl PermissionDef for PermTreasuryWrite {
    fn capability() -> Capability { Capability::RecordTransactions }
}
