use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::groups::{GroupEntity, InsertGroupEntity};
use crate::domain::value_objects::{
    enums::group_statuses::GroupStatus,
    groups::{ChannelBinding, GroupDetail, GroupWithCreator},
};

#[async_trait]
#[automock]
pub trait GroupRepository {
    async fn find_by_id(&self, group_id: Uuid) -> Result<Option<GroupEntity>>;

    async fn find_with_creator(&self, group_id: Uuid) -> Result<Option<GroupWithCreator>>;

    async fn find_detail(&self, group_id: Uuid) -> Result<Option<GroupDetail>>;

    async fn list_details_by_status(&self, status: GroupStatus) -> Result<Vec<GroupDetail>>;

    async fn create(&self, insert_group_entity: InsertGroupEntity) -> Result<GroupEntity>;

    async fn update_details(
        &self,
        group_id: Uuid,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<GroupEntity>;

    /// Returns the number of rows affected so callers can detect a missing group.
    async fn update_status(&self, group_id: Uuid, status: GroupStatus) -> Result<usize>;

    async fn bind_channel(&self, group_id: Uuid, binding: &ChannelBinding) -> Result<()>;
}
