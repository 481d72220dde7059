pub mod group_statuses;
pub mod subscription_statuses;
pub mod user_roles;
