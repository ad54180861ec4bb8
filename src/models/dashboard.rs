// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    congregation::Congregation, ministry::Ministry, network::Network,
    notification::Notification, request::Request,
};
use crate::services::access::Tier;

// 1. Cards do topo do painel
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub active_members: usize,
    pub pending_requests: usize,
    pub total_inflow: Decimal,
    pub congregations: usize,
}

// 2. Contadores da administração
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub members: usize,
    pub congregations: usize,
    pub ministries: usize,
    pub networks: usize,
}

// 3. Secretaria: lista exibida + o que o usuário pode fazer com ela
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestsView {
    pub tier: Tier,
    pub can_create: bool,
    pub items: Vec<RequestEntry>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestEntry {
    #[serde(flatten)]
    pub request: Request,
    pub kind_label: String,
    // Só verdadeiro para quem revisa e quando o status ainda é pendente
    pub reviewable: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CongregationStats {
    pub total: usize,
    pub headquarters: usize,
    pub branches: usize,
    pub members: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CongregationEntry {
    #[serde(flatten)]
    pub congregation: Congregation,
    pub leader_name: Option<String>,
    pub member_count: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CongregationDirectory {
    pub stats: CongregationStats,
    pub items: Vec<CongregationEntry>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MinistryEntry {
    #[serde(flatten)]
    pub ministry: Ministry,
    pub leader_name: Option<String>,
    pub participant_count: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEntry {
    #[serde(flatten)]
    pub network: Network,
    pub leader_name: Option<String>,
    pub participant_count: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsView {
    pub unread: usize,
    pub items: Vec<Notification>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub signed_in: bool,
    pub initializing: bool,
    pub loading: bool,
    pub user_id: Option<Uuid>,
    pub tier: Option<Tier>,
    pub capabilities: Vec<String>,
}
