use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::plans::PlanEntity;

#[derive(Debug, Clone, Serialize)]
pub struct PlanDto {
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_minor: i32,
    pub features: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlanEntity> for PlanDto {
    fn from(entity: PlanEntity) -> Self {
        // Feature lists predate strict validation; anything unreadable renders empty.
        let features = serde_json::from_value(entity.features).unwrap_or_default();
        Self {
            id: entity.id,
            group_id: entity.group_id,
            name: entity.name,
            description: entity.description,
            price_minor: entity.price_minor,
            features,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
