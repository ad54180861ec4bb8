pub mod auth;
pub mod congregation;
pub mod dashboard;
pub mod finance;
pub mod member;
pub mod ministry;
pub mod network;
pub mod notification;
pub mod request;

use uuid::Uuid;

/// Linha de uma coleção identificada pelo id gerado no servidor.
pub trait Record {
    fn id(&self) -> Uuid;
}
