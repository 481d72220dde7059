use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use uuid::Uuid;

use crate::{
    domain::{
        entities::profiles::{InsertProfileEntity, ProfileEntity},
        repositories::profiles::ProfileRepository,
        value_objects::enums::user_roles::UserRole,
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::profiles},
};

pub struct ProfilePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ProfilePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ProfileRepository for ProfilePostgres {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<ProfileEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = profiles::table
            .find(user_id)
            .select(ProfileEntity::as_select())
            .first::<ProfileEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn create(&self, insert_profile_entity: InsertProfileEntity) -> Result<ProfileEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(profiles::table)
            .values(&insert_profile_entity)
            .returning(ProfileEntity::as_returning())
            .get_result::<ProfileEntity>(&mut conn)?;

        Ok(result)
    }

    async fn update_role(&self, user_id: Uuid, role: UserRole) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(profiles::table)
            .filter(profiles::id.eq(user_id))
            .set((
                profiles::role.eq(role.to_string()),
                profiles::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }
}
