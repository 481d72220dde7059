pub mod channel_provisioning;
pub mod group_approval;
pub mod groups;
pub mod invitations;
pub mod notifications;
pub mod subscriptions;
pub mod users;
