use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::{groups::GroupEntity, plans::PlanEntity};

#[async_trait]
#[automock]
pub trait PlanRepository {
    async fn find_by_id(&self, plan_id: Uuid) -> Result<Option<PlanEntity>>;

    async fn find_with_group(&self, plan_id: Uuid) -> Result<Option<(PlanEntity, GroupEntity)>>;

    async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<PlanEntity>>;
}
