// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::sign_up,
        handlers::auth::sign_in,
        handlers::auth::sign_out,
        handlers::auth::change_password,

        // --- Session / Profile ---
        handlers::session::get_session,
        handlers::session::reload,
        handlers::profile::get_profile,
        handlers::profile::update_profile,

        // --- Requests ---
        handlers::requests::list_requests,
        handlers::requests::create_request,
        handlers::requests::approve_request,
        handlers::requests::reject_request,

        // --- Treasury ---
        handlers::treasury::get_treasury,
        handlers::treasury::create_transaction,
        handlers::treasury::list_categories,

        // --- Notifications ---
        handlers::notifications::list_notifications,
        handlers::notifications::mark_read,
        handlers::notifications::mark_all_read,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_admin_stats,

        // --- Directory ---
        handlers::directory::list_congregations,
        handlers::directory::list_ministries,
        handlers::directory::list_networks,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Identity,
            models::auth::SignUpPayload,
            models::auth::SignInPayload,
            models::auth::ChangePasswordPayload,
            models::auth::AuthResponse,

            // --- Members ---
            models::member::EcclesiasticalRole,
            models::member::Sex,
            models::member::MaritalStatus,
            models::member::Address,
            models::member::Member,
            models::member::MemberProfileUpdate,

            // --- Requests ---
            models::request::RequestKind,
            models::request::RequestStatus,
            models::request::Request,
            models::request::NewRequest,

            // --- Treasury ---
            models::finance::Direction,
            models::finance::Transaction,
            models::finance::NewTransaction,
            models::finance::CategoryTotal,
            models::finance::FinancialSummary,
            handlers::treasury::TreasuryView,
            handlers::treasury::TreasuryCategories,

            // --- Directory ---
            models::congregation::CongregationKind,
            models::congregation::Congregation,
            models::ministry::MinistryCategory,
            models::ministry::Ministry,
            models::network::NetworkKind,
            models::network::Network,

            // --- Notifications ---
            models::notification::Severity,
            models::notification::Notification,
            handlers::notifications::MarkAllReadResponse,

            // --- Views ---
            crate::services::access::Tier,
            models::dashboard::SessionView,
            models::dashboard::DashboardSummary,
            models::dashboard::AdminStats,
            models::dashboard::RequestsView,
            models::dashboard::RequestEntry,
            models::dashboard::CongregationStats,
            models::dashboard::CongregationEntry,
            models::dashboard::CongregationDirectory,
            models::dashboard::MinistryEntry,
            models::dashboard::NetworkEntry,
            models::dashboard::NotificationsView,
        )
    ),
    tags(
        (name = "Auth", description = "Cadastro, login e senha"),
        (name = "Session", description = "Estado da sessão e recarga das coleções"),
        (name = "Profile", description = "Perfil do membro logado"),
        (name = "Requests", description = "Secretaria: solicitações dos membros"),
        (name = "Treasury", description = "Tesouraria: entradas, saídas e saldo"),
        (name = "Notifications", description = "Notificações do usuário"),
        (name = "Dashboard", description = "Indicadores do painel e da administração"),
        (name = "Directory", description = "Congregações, ministérios e redes")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
