use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::profiles::{InsertProfileEntity, ProfileEntity};
use crate::domain::value_objects::enums::user_roles::UserRole;

#[async_trait]
#[automock]
pub trait ProfileRepository {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<ProfileEntity>>;

    async fn create(&self, insert_profile_entity: InsertProfileEntity) -> Result<ProfileEntity>;

    /// Returns the number of rows affected.
    async fn update_role(&self, user_id: Uuid, role: UserRole) -> Result<usize>;
}
