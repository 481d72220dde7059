pub mod chat;
pub mod domain;
pub mod email;
pub mod identity;
pub mod infra;
pub mod observability;
