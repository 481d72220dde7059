use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            groups::GroupEntity,
            plans::PlanEntity,
            subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
        },
        repositories::subscriptions::SubscriptionRepository,
        value_objects::{
            enums::subscription_statuses::SubscriptionStatus, subscriptions::SubscriptionDetail,
        },
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{groups, plans, subscriptions},
    },
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn find_by_id(&self, subscription_id: Uuid) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = subscriptions::table
            .find(subscription_id)
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_detail(&self, subscription_id: Uuid) -> Result<Option<SubscriptionDetail>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = subscriptions::table
            .inner_join(plans::table.inner_join(groups::table))
            .filter(subscriptions::id.eq(subscription_id))
            .select((
                SubscriptionEntity::as_select(),
                PlanEntity::as_select(),
                GroupEntity::as_select(),
            ))
            .first::<(SubscriptionEntity, PlanEntity, GroupEntity)>(&mut conn)
            .optional()?;

        Ok(result.map(|(subscription, plan, group)| SubscriptionDetail {
            subscription,
            plan,
            group,
        }))
    }

    async fn find_active_by_user_and_plan(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
    ) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .filter(subscriptions::plan_id.eq(plan_id))
            .filter(subscriptions::status.eq(SubscriptionStatus::Active.to_string()))
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn create(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> Result<SubscriptionEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(subscriptions::table)
            .values(&insert_subscription_entity)
            .returning(SubscriptionEntity::as_returning())
            .get_result::<SubscriptionEntity>(&mut conn)?;

        Ok(result)
    }

    async fn update_status(
        &self,
        subscription_id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(subscriptions::table)
            .filter(subscriptions::id.eq(subscription_id))
            .set((
                subscriptions::status.eq(status.to_string()),
                subscriptions::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }

    async fn list_details_by_user(&self, user_id: Uuid) -> Result<Vec<SubscriptionDetail>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = subscriptions::table
            .inner_join(plans::table.inner_join(groups::table))
            .filter(subscriptions::user_id.eq(user_id))
            .order(subscriptions::created_at.desc())
            .select((
                SubscriptionEntity::as_select(),
                PlanEntity::as_select(),
                GroupEntity::as_select(),
            ))
            .load::<(SubscriptionEntity, PlanEntity, GroupEntity)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(subscription, plan, group)| SubscriptionDetail {
                subscription,
                plan,
                group,
            })
            .collect())
    }
}
