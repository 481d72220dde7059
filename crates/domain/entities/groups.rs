use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::groups;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = groups)]
pub struct GroupEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub creator_id: Uuid,
    pub status: String,
    pub slack_channel_id: Option<String>,
    pub slack_channel_name: Option<String>,
    pub slack_channel_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = groups)]
pub struct InsertGroupEntity {
    pub name: String,
    pub description: Option<String>,
    pub creator_id: Uuid,
    pub status: String,
}
