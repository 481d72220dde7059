pub mod admin_groups;
pub mod groups;
pub mod subscriptions;
pub mod users;
