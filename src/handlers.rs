pub mod auth;
pub mod dashboard;
pub mod directory;
pub mod notifications;
pub mod profile;
pub mod requests;
pub mod session;
pub mod treasury;
