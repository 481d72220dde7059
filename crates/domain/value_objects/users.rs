use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::profiles::ProfileEntity, value_objects::enums::user_roles::UserRole,
};

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoleModel {
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileDto {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileEntity> for ProfileDto {
    fn from(entity: ProfileEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            full_name: entity.full_name,
            role: UserRole::from_str(&entity.role),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
