pub mod channel_names;
pub mod enums;
pub mod groups;
pub mod plans;
pub mod subscriptions;
pub mod users;
