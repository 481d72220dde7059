use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Subscriber,
    Creator,
    Admin,
}

impl Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let role = match self {
            UserRole::Subscriber => "subscriber",
            UserRole::Creator => "creator",
            UserRole::Admin => "admin",
        };
        write!(f, "{}", role)
    }
}

impl UserRole {
    pub fn from_str(value: &str) -> Self {
        match value {
            "subscriber" => UserRole::Subscriber,
            "creator" => UserRole::Creator,
            "admin" => UserRole::Admin,
            _ => UserRole::Subscriber,
        }
    }
}
