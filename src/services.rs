pub mod access;
pub mod auth;
pub mod reconcile;
pub mod session;
pub mod store;
pub mod views;
