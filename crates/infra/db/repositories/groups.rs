use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            groups::{GroupEntity, InsertGroupEntity},
            plans::PlanEntity,
        },
        repositories::groups::GroupRepository,
        value_objects::{
            enums::group_statuses::GroupStatus,
            groups::{ChannelBinding, GroupDetail, GroupWithCreator},
        },
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{groups, plans, profiles},
    },
};

pub struct GroupPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl GroupPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl GroupRepository for GroupPostgres {
    async fn find_by_id(&self, group_id: Uuid) -> Result<Option<GroupEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = groups::table
            .find(group_id)
            .select(GroupEntity::as_select())
            .first::<GroupEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_with_creator(&self, group_id: Uuid) -> Result<Option<GroupWithCreator>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = groups::table
            .left_join(profiles::table)
            .filter(groups::id.eq(group_id))
            .select((GroupEntity::as_select(), profiles::email.nullable()))
            .first::<(GroupEntity, Option<String>)>(&mut conn)
            .optional()?;

        Ok(result.map(|(group, creator_email)| GroupWithCreator {
            group,
            creator_email,
        }))
    }

    async fn find_detail(&self, group_id: Uuid) -> Result<Option<GroupDetail>> {
        let with_creator = match self.find_with_creator(group_id).await? {
            Some(found) => found,
            None => return Ok(None),
        };

        let mut conn = Arc::clone(&self.db_pool).get()?;
        let group_plans = plans::table
            .filter(plans::group_id.eq(group_id))
            .order(plans::price_minor.asc())
            .select(PlanEntity::as_select())
            .load::<PlanEntity>(&mut conn)?;

        Ok(Some(GroupDetail {
            group: with_creator.group,
            creator_email: with_creator.creator_email,
            plans: group_plans,
        }))
    }

    async fn list_details_by_status(&self, status: GroupStatus) -> Result<Vec<GroupDetail>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = groups::table
            .left_join(profiles::table)
            .filter(groups::status.eq(status.to_string()))
            .order(groups::created_at.desc())
            .select((GroupEntity::as_select(), profiles::email.nullable()))
            .load::<(GroupEntity, Option<String>)>(&mut conn)?;

        let group_ids: Vec<Uuid> = rows.iter().map(|(group, _)| group.id).collect();
        let mut plans_by_group: HashMap<Uuid, Vec<PlanEntity>> = HashMap::new();
        for plan in plans::table
            .filter(plans::group_id.eq_any(&group_ids))
            .order(plans::price_minor.asc())
            .select(PlanEntity::as_select())
            .load::<PlanEntity>(&mut conn)?
        {
            plans_by_group.entry(plan.group_id).or_default().push(plan);
        }

        Ok(rows
            .into_iter()
            .map(|(group, creator_email)| {
                let group_plans = plans_by_group.remove(&group.id).unwrap_or_default();
                GroupDetail {
                    group,
                    creator_email,
                    plans: group_plans,
                }
            })
            .collect())
    }

    async fn create(&self, insert_group_entity: InsertGroupEntity) -> Result<GroupEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(groups::table)
            .values(&insert_group_entity)
            .returning(GroupEntity::as_returning())
            .get_result::<GroupEntity>(&mut conn)?;

        Ok(result)
    }

    async fn update_details(
        &self,
        group_id: Uuid,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<GroupEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let changes = UpdateGroupChangeset {
            name,
            description,
            updated_at: Utc::now(),
        };

        let result = update(groups::table)
            .filter(groups::id.eq(group_id))
            .set(&changes)
            .returning(GroupEntity::as_returning())
            .get_result::<GroupEntity>(&mut conn)?;

        Ok(result)
    }

    async fn update_status(&self, group_id: Uuid, status: GroupStatus) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(groups::table)
            .filter(groups::id.eq(group_id))
            .set((
                groups::status.eq(status.to_string()),
                groups::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }

    async fn bind_channel(&self, group_id: Uuid, binding: &ChannelBinding) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(groups::table)
            .filter(groups::id.eq(group_id))
            .set((
                groups::slack_channel_id.eq(&binding.channel_id),
                groups::slack_channel_name.eq(&binding.channel_name),
                groups::slack_channel_url.eq(&binding.channel_url),
                groups::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = groups)]
struct UpdateGroupChangeset {
    name: Option<String>,
    description: Option<String>,
    updated_at: chrono::DateTime<Utc>,
}
