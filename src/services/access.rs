// src/services/access.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::{common::error::AppError, models::member::EcclesiasticalRole};

/// Nível de acesso derivado do cargo eclesiástico.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Presbítero(a), Pastor(a), Bispo(a): gerenciam solicitações e tesouraria.
    Elevated,
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ViewAllRequests,
    ReviewRequests,
    RecordTransactions,
    CreateRequests,
}

impl Capability {
    pub fn slug(&self) -> &'static str {
        match self {
            Capability::ViewAllRequests => "requests:view_all",
            Capability::ReviewRequests => "requests:review",
            Capability::RecordTransactions => "treasury:write",
            Capability::CreateRequests => "requests:create",
        }
    }
}

const ELEVATED: &[Capability] = &[
    Capability::ViewAllRequests,
    Capability::ReviewRequests,
    Capability::RecordTransactions,
];

const STANDARD: &[Capability] = &[Capability::CreateRequests];

/// O único predicado de autorização. Views e handlers perguntam aqui, nunca comparam cargos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySet {
    tier: Tier,
}

impl CapabilitySet {
    pub fn for_role(role: EcclesiasticalRole) -> Self {
        let tier = match role {
            EcclesiasticalRole::Presbyter | EcclesiasticalRole::Pastor | EcclesiasticalRole::Bishop => {
                Tier::Elevated
            }
            _ => Tier::Standard,
        };
        Self { tier }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn capabilities(&self) -> &'static [Capability] {
        match self.tier {
            Tier::Elevated => ELEVATED,
            Tier::Standard => STANDARD,
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        if self.allows(capability) {
            Ok(())
        } else {
            Err(AppError::Forbidden(capability.slug()))
        }
    }

    pub fn slugs(&self) -> Vec<String> {
        self.capabilities().iter().map(|c| c.slug().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(EcclesiasticalRole::Presbyter, Tier::Elevated)]
    #[case(EcclesiasticalRole::Pastor, Tier::Elevated)]
    #[case(EcclesiasticalRole::Bishop, Tier::Elevated)]
    #[case(EcclesiasticalRole::None, Tier::Standard)]
    #[case(EcclesiasticalRole::DeaconAssistant, Tier::Standard)]
    #[case(EcclesiasticalRole::Evangelist, Tier::Standard)]
    #[case(EcclesiasticalRole::Apostle, Tier::Standard)]
    fn tier_follows_role(#[case] role: EcclesiasticalRole, #[case] expected: Tier) {
        assert_eq!(CapabilitySet::for_role(role).tier(), expected);
    }

    #[test]
    fn elevated_reviews_but_does_not_file_requests() {
        let caps = CapabilitySet::for_role(EcclesiasticalRole::Pastor);
        assert!(caps.allows(Capability::ReviewRequests));
        assert!(caps.allows(Capability::RecordTransactions));
        assert!(!caps.allows(Capability::CreateRequests));
    }

    #[test]
    fn standard_is_read_only_on_treasury() {
        let caps = CapabilitySet::for_role(EcclesiasticalRole::None);
        assert!(caps.allows(Capability::CreateRequests));
        let err = caps.require(Capability::RecordTransactions).unwrap_err();
        assert!(matches!(err, AppError::Forbidden("treasury:write")));
    }
}
