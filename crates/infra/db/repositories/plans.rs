use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, prelude::*};
use uuid::Uuid;

use crate::{
    domain::{
        entities::{groups::GroupEntity, plans::PlanEntity},
        repositories::plans::PlanRepository,
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{groups, plans},
    },
};

pub struct PlanPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PlanPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PlanRepository for PlanPostgres {
    async fn find_by_id(&self, plan_id: Uuid) -> Result<Option<PlanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = plans::table
            .find(plan_id)
            .select(PlanEntity::as_select())
            .first::<PlanEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_with_group(&self, plan_id: Uuid) -> Result<Option<(PlanEntity, GroupEntity)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = plans::table
            .inner_join(groups::table)
            .filter(plans::id.eq(plan_id))
            .select((PlanEntity::as_select(), GroupEntity::as_select()))
            .first::<(PlanEntity, GroupEntity)>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<PlanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = plans::table
            .filter(plans::group_id.eq(group_id))
            .order(plans::price_minor.asc())
            .select(PlanEntity::as_select())
            .load::<PlanEntity>(&mut conn)?;

        Ok(results)
    }
}
