use std::sync::Arc;

use crates::domain::{
    entities::groups::{GroupEntity, InsertGroupEntity},
    repositories::{groups::GroupRepository, profiles::ProfileRepository},
    value_objects::{
        channel_names::normalize_channel_name,
        enums::{group_statuses::GroupStatus, user_roles::UserRole},
        groups::{GroupDetail, InsertGroupModel, UpdateGroupModel},
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::usecases::{
    channel_provisioning::ChatGateway,
    invitations::{InvitationDispatcher, InvitationError},
    notifications::{EmailGateway, NotificationSender},
};

#[derive(Debug, Error)]
pub enum GroupError {
    #[error("Name is required")]
    MissingName,
    #[error("Email is required")]
    MissingEmail,
    #[error("Group not found")]
    NotFound,
    #[error("Group has no Slack channel")]
    NoChannel,
    #[error("Forbidden")]
    Forbidden,
    #[error("Failed to send invite email")]
    EmailDeliveryFailed(anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl GroupError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            GroupError::MissingName | GroupError::MissingEmail | GroupError::NoChannel => {
                StatusCode::BAD_REQUEST
            }
            GroupError::NotFound => StatusCode::NOT_FOUND,
            GroupError::Forbidden => StatusCode::FORBIDDEN,
            GroupError::EmailDeliveryFailed(_) | GroupError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub type GroupResult<T> = std::result::Result<T, GroupError>;

/// Result of a member invite: the email always went out; the direct channel
/// invite is best-effort.
#[derive(Debug, Clone)]
pub struct InviteOutcome {
    pub channel_invited: bool,
    pub warnings: Vec<String>,
}

pub struct GroupUseCase<G, P, C, E>
where
    G: GroupRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    C: ChatGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    group_repo: Arc<G>,
    profile_repo: Arc<P>,
    dispatcher: InvitationDispatcher<C>,
    notifier: NotificationSender<E>,
}

impl<G, P, C, E> GroupUseCase<G, P, C, E>
where
    G: GroupRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    C: ChatGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    pub fn new(
        group_repo: Arc<G>,
        profile_repo: Arc<P>,
        dispatcher: InvitationDispatcher<C>,
        notifier: NotificationSender<E>,
    ) -> Self {
        Self {
            group_repo,
            profile_repo,
            dispatcher,
            notifier,
        }
    }

    pub async fn list_active(&self) -> GroupResult<Vec<GroupDetail>> {
        self.group_repo
            .list_details_by_status(GroupStatus::Active)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "groups: failed to list active groups");
                GroupError::Internal(err)
            })
    }

    pub async fn get(&self, group_id: Uuid) -> GroupResult<GroupDetail> {
        self.group_repo
            .find_detail(group_id)
            .await
            .map_err(|err| {
                error!(%group_id, db_error = ?err, "groups: failed to load group");
                GroupError::Internal(err)
            })?
            .ok_or(GroupError::NotFound)
    }

    pub async fn create(
        &self,
        auth: &AuthUser,
        insert_group_model: InsertGroupModel,
    ) -> GroupResult<GroupEntity> {
        let name = insert_group_model
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(GroupError::MissingName)?
            .to_string();

        info!(creator_id = %auth.user_id, name = %name, "groups: creating group");

        let created = self
            .group_repo
            .create(InsertGroupEntity {
                name,
                description: insert_group_model.description,
                creator_id: auth.user_id,
                status: GroupStatus::Pending.to_string(),
            })
            .await
            .map_err(|err| {
                error!(creator_id = %auth.user_id, db_error = ?err, "groups: create failed");
                GroupError::Internal(err)
            })?;

        info!(group_id = %created.id, "groups: group created as pending");

        Ok(created)
    }

    /// Name/description edits only. Status changes go through the admin
    /// approval workflow.
    pub async fn update(
        &self,
        auth: &AuthUser,
        group_id: Uuid,
        update_group_model: UpdateGroupModel,
    ) -> GroupResult<GroupEntity> {
        let group = self
            .group_repo
            .find_by_id(group_id)
            .await
            .map_err(GroupError::Internal)?
            .ok_or(GroupError::NotFound)?;

        if group.creator_id != auth.user_id {
            self.require_admin(auth).await?;
        }

        self.group_repo
            .update_details(
                group_id,
                update_group_model.name,
                update_group_model.description,
            )
            .await
            .map_err(|err| {
                error!(%group_id, db_error = ?err, "groups: update failed");
                GroupError::Internal(err)
            })
    }

    pub async fn invite(&self, group_id: Uuid, email: &str) -> GroupResult<InviteOutcome> {
        let email = email.trim();
        if email.is_empty() {
            return Err(GroupError::MissingEmail);
        }

        let group = self
            .group_repo
            .find_by_id(group_id)
            .await
            .map_err(GroupError::Internal)?
            .ok_or(GroupError::NotFound)?;

        let channel_id = group
            .slack_channel_id
            .as_deref()
            .ok_or(GroupError::NoChannel)?;
        let channel_name = group
            .slack_channel_name
            .clone()
            .unwrap_or_else(|| normalize_channel_name(&group.name));

        // The invite email is the one step that must succeed; the direct
        // channel invite only works once the member joined the workspace.
        self.notifier
            .send_slack_invite(email, &group.name, &channel_name)
            .await
            .map_err(|err| {
                error!(%group_id, email, error = ?err, "groups: invite email failed");
                GroupError::EmailDeliveryFailed(err.into())
            })?;

        let mut warnings = Vec::new();
        let channel_invited = match self.dispatcher.invite_by_email(channel_id, email).await {
            Ok(()) => true,
            Err(InvitationError::UserNotInWorkspace) => {
                info!(
                    %group_id,
                    email,
                    "groups: member not in workspace yet, invite email covers onboarding"
                );
                warnings.push("user has not joined the chat workspace yet".to_string());
                false
            }
            Err(err) => {
                warn!(%group_id, email, error = ?err, "groups: channel invite failed");
                warnings.push(format!("channel invite failed: {err}"));
                false
            }
        };

        Ok(InviteOutcome {
            channel_invited,
            warnings,
        })
    }

    async fn require_admin(&self, auth: &AuthUser) -> GroupResult<()> {
        let profile = self
            .profile_repo
            .find_by_id(auth.user_id)
            .await
            .map_err(GroupError::Internal)?;

        let role = profile.map(|p| UserRole::from_str(&p.role));
        if role != Some(UserRole::Admin) {
            warn!(user_id = %auth.user_id, ?role, "groups: admin access denied");
            return Err(GroupError::Forbidden);
        }

        Ok(())
    }
}
