use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::{groups::GroupEntity, plans::PlanEntity, subscriptions::SubscriptionEntity},
    value_objects::{
        enums::subscription_statuses::SubscriptionStatus, groups::GroupDto, plans::PlanDto,
    },
};

/// Subscription row joined with its plan and the plan's group.
#[derive(Debug, Clone)]
pub struct SubscriptionDetail {
    pub subscription: SubscriptionEntity,
    pub plan: PlanEntity,
    pub group: GroupEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeModel {
    pub plan_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubscriptionEntity> for SubscriptionDto {
    fn from(entity: SubscriptionEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            plan_id: entity.plan_id,
            status: SubscriptionStatus::from_str(&entity.status),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionDetailDto {
    #[serde(flatten)]
    pub subscription: SubscriptionDto,
    pub plan: PlanDto,
    pub group: GroupDto,
}

impl From<SubscriptionDetail> for SubscriptionDetailDto {
    fn from(detail: SubscriptionDetail) -> Self {
        Self {
            subscription: SubscriptionDto::from(detail.subscription),
            plan: PlanDto::from(detail.plan),
            group: GroupDto::from(detail.group),
        }
    }
}
