pub mod backend;
pub use backend::{AccountStore, ChurchBackend};
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod member_repo;
pub use member_repo::MemberRepository;
pub mod congregation_repo;
pub use congregation_repo::CongregationRepository;
pub mod request_repo;
pub use request_repo::RequestRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
pub mod ministry_repo;
pub use ministry_repo::MinistryRepository;
pub mod network_repo;
pub use network_repo::NetworkRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;

pub mod pg;
pub use pg::PgBackend;

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
