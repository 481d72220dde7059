use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::{groups::GroupEntity, plans::PlanEntity},
    value_objects::{enums::group_statuses::GroupStatus, plans::PlanDto},
};

/// Persisted link between a group and its external chat channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelBinding {
    pub channel_id: String,
    pub channel_name: String,
    pub channel_url: String,
}

impl ChannelBinding {
    /// Extracts the binding from a group row when all three columns are set.
    pub fn from_entity(group: &GroupEntity) -> Option<Self> {
        match (
            &group.slack_channel_id,
            &group.slack_channel_name,
            &group.slack_channel_url,
        ) {
            (Some(id), Some(name), Some(url)) => Some(Self {
                channel_id: id.clone(),
                channel_name: name.clone(),
                channel_url: url.clone(),
            }),
            _ => None,
        }
    }
}

/// Group row joined with the creator's mirrored profile email.
#[derive(Debug, Clone)]
pub struct GroupWithCreator {
    pub group: GroupEntity,
    pub creator_email: Option<String>,
}

/// Group row joined with creator email and its plans.
#[derive(Debug, Clone)]
pub struct GroupDetail {
    pub group: GroupEntity,
    pub creator_email: Option<String>,
    pub plans: Vec<PlanEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InsertGroupModel {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateGroupModel {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InviteModel {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RejectModel {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub creator_id: Uuid,
    pub status: GroupStatus,
    pub slack_channel_id: Option<String>,
    pub slack_channel_name: Option<String>,
    pub slack_channel_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupEntity> for GroupDto {
    fn from(entity: GroupEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            creator_id: entity.creator_id,
            status: GroupStatus::from_str(&entity.status),
            slack_channel_id: entity.slack_channel_id,
            slack_channel_name: entity.slack_channel_name,
            slack_channel_url: entity.slack_channel_url,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupDetailDto {
    #[serde(flatten)]
    pub group: GroupDto,
    pub creator_email: Option<String>,
    pub plans: Vec<PlanDto>,
}

impl From<GroupDetail> for GroupDetailDto {
    fn from(detail: GroupDetail) -> Self {
        Self {
            group: GroupDto::from(detail.group),
            creator_email: detail.creator_email,
            plans: detail.plans.into_iter().map(PlanDto::from).collect(),
        }
    }
}
