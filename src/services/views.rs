// src/services/views.rs
//
// Projeções puras sobre o snapshot do store. Nada aqui muta coleção.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{
    access::{Capability, CapabilitySet},
    store::StoreSnapshot,
};
use crate::models::{
    congregation::CongregationKind,
    dashboard::{
        AdminStats, CongregationDirectory, CongregationEntry, CongregationStats, DashboardSummary,
        MinistryEntry, NetworkEntry, NotificationsView, RequestEntry, RequestsView,
    },
    finance::{CategoryTotal, Direction, FinancialSummary, Transaction},
    member::Member,
    ministry::MinistryCategory,
    network::NetworkKind,
    notification::Notification,
    request::{Request, RequestStatus},
};

/// Intervalo semiaberto `[start, end)` em UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Mês civil inteiro. `None` para mês fora de 1..=12.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()?;
        let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        let end = Utc.with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0).single()?;
        Some(Self { start, end })
    }

    pub fn current_month() -> Option<Self> {
        let now = Utc::now();
        Self::month(now.year(), now.month())
    }

    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        self.start <= *at && *at < self.end
    }
}

pub fn transactions_in<'a>(transactions: &'a [Transaction], window: &TimeWindow) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|t| window.contains(&t.occurred_at))
        .collect()
}

fn direction_rank(direction: Direction) -> u8 {
    match direction {
        Direction::Inflow => 0,
        Direction::Outflow => 1,
    }
}

/// Entradas, saídas, saldo e totais por categoria dentro da janela.
pub fn summarize(transactions: &[Transaction], window: &TimeWindow) -> FinancialSummary {
    let selected = transactions_in(transactions, window);

    let mut inflow = Decimal::ZERO;
    let mut outflow = Decimal::ZERO;
    let mut by_category: BTreeMap<(u8, &str), (Direction, Decimal)> = BTreeMap::new();

    for transaction in &selected {
        match transaction.direction {
            Direction::Inflow => inflow += transaction.amount,
            Direction::Outflow => outflow += transaction.amount,
        }
        let entry = by_category
            .entry((direction_rank(transaction.direction), transaction.category.as_str()))
            .or_insert((transaction.direction, Decimal::ZERO));
        entry.1 += transaction.amount;
    }

    FinancialSummary {
        inflow,
        outflow,
        balance: inflow - outflow,
        by_category: by_category
            .into_iter()
            .map(|((_, category), (direction, total))| CategoryTotal {
                direction,
                category: category.to_string(),
                total,
            })
            .collect(),
        transaction_count: selected.len(),
    }
}

/// Elevados veem todas as solicitações; os demais, só as próprias.
pub fn requests_view(requests: &[Request], profile: &Member) -> RequestsView {
    let caps = CapabilitySet::for_role(profile.role);
    let sees_all = caps.allows(Capability::ViewAllRequests);
    let reviews = caps.allows(Capability::ReviewRequests);

    let items = requests
        .iter()
        .filter(|r| sees_all || r.requester_id == profile.id)
        .map(|r| RequestEntry {
            request: r.clone(),
            kind_label: r.kind.label().to_string(),
            reviewable: reviews && r.status == RequestStatus::Pending,
        })
        .collect();

    RequestsView {
        tier: caps.tier(),
        can_create: caps.allows(Capability::CreateRequests),
        items,
    }
}

pub fn dashboard_summary(snapshot: &StoreSnapshot) -> DashboardSummary {
    DashboardSummary {
        active_members: snapshot.members.len(),
        pending_requests: snapshot
            .requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .count(),
        total_inflow: snapshot
            .transactions
            .iter()
            .filter(|t| t.direction == Direction::Inflow)
            .map(|t| t.amount)
            .sum(),
        congregations: snapshot.congregations.len(),
    }
}

pub fn admin_stats(snapshot: &StoreSnapshot) -> AdminStats {
    AdminStats {
        members: snapshot.members.len(),
        congregations: snapshot.congregations.len(),
        ministries: snapshot.ministries.len(),
        networks: snapshot.networks.len(),
    }
}

fn name_matches(name: &str, search: Option<&str>) -> bool {
    match search.map(str::trim) {
        None | Some("") => true,
        Some(term) => name.to_lowercase().contains(&term.to_lowercase()),
    }
}

fn leader_names(members: &[Member]) -> HashMap<Uuid, &str> {
    members.iter().map(|m| (m.id, m.full_name.as_str())).collect()
}

/// Estatísticas sempre sobre todas as congregações; a busca só filtra a lista.
pub fn congregation_directory(snapshot: &StoreSnapshot, search: Option<&str>) -> CongregationDirectory {
    let names = leader_names(&snapshot.members);
    let mut per_congregation: HashMap<Uuid, usize> = HashMap::new();
    for congregation_id in snapshot.members.iter().filter_map(|m| m.congregation_id) {
        *per_congregation.entry(congregation_id).or_default() += 1;
    }

    let stats = CongregationStats {
        total: snapshot.congregations.len(),
        headquarters: snapshot
            .congregations
            .iter()
            .filter(|c| c.kind == CongregationKind::Headquarters)
            .count(),
        branches: snapshot
            .congregations
            .iter()
            .filter(|c| c.kind == CongregationKind::Branch)
            .count(),
        members: snapshot
            .congregations
            .iter()
            .map(|c| per_congregation.get(&c.id).copied().unwrap_or(0))
            .sum(),
    };

    let items = snapshot
        .congregations
        .iter()
        .filter(|c| name_matches(&c.name, search))
        .map(|c| CongregationEntry {
            congregation: c.clone(),
            leader_name: c.leader_id.and_then(|id| names.get(&id)).map(|n| n.to_string()),
            member_count: per_congregation.get(&c.id).copied().unwrap_or(0),
        })
        .collect();

    CongregationDirectory { stats, items }
}

pub fn ministry_directory(
    snapshot: &StoreSnapshot,
    search: Option<&str>,
    category: Option<MinistryCategory>,
) -> Vec<MinistryEntry> {
    let names = leader_names(&snapshot.members);
    snapshot
        .ministries
        .iter()
        .filter(|m| name_matches(&m.name, search))
        .filter(|m| category.is_none_or(|c| m.category == c))
        .map(|m| MinistryEntry {
            ministry: m.clone(),
            leader_name: m.leader_id.and_then(|id| names.get(&id)).map(|n| n.to_string()),
            participant_count: m.member_ids.len(),
        })
        .collect()
}

pub fn network_directory(
    snapshot: &StoreSnapshot,
    search: Option<&str>,
    kind: Option<NetworkKind>,
) -> Vec<NetworkEntry> {
    let names = leader_names(&snapshot.members);
    snapshot
        .networks
        .iter()
        .filter(|n| name_matches(&n.name, search))
        .filter(|n| kind.is_none_or(|k| n.kind == k))
        .map(|n| NetworkEntry {
            network: n.clone(),
            leader_name: n.leader_id.and_then(|id| names.get(&id)).map(|name| name.to_string()),
            participant_count: n.member_ids.len(),
        })
        .collect()
}

pub fn notifications_view(notifications: &[Notification]) -> NotificationsView {
    NotificationsView {
        unread: notifications.iter().filter(|n| !n.read).count(),
        items: notifications.to_vec(),
    }
}
