use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum GroupStatus {
    #[default]
    Pending,
    Active,
    Suspended,
}

impl Display for GroupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            GroupStatus::Pending => "pending",
            GroupStatus::Active => "active",
            GroupStatus::Suspended => "suspended",
        };
        write!(f, "{}", status)
    }
}

impl GroupStatus {
    pub fn from_str(value: &str) -> Self {
        match value {
            "pending" => GroupStatus::Pending,
            "active" => GroupStatus::Active,
            // "inactive" is the legacy spelling still present in old rows.
            "suspended" | "inactive" => GroupStatus::Suspended,
            _ => GroupStatus::Suspended,
        }
    }
}
