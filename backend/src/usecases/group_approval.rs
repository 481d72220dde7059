use std::sync::Arc;

use crates::domain::{
    repositories::{groups::GroupRepository, profiles::ProfileRepository},
    value_objects::{
        enums::{group_statuses::GroupStatus, user_roles::UserRole},
        groups::{ChannelBinding, GroupDetail, GroupWithCreator},
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::usecases::{
    channel_provisioning::{ChannelProvisioner, ChatGateway},
    notifications::{EmailGateway, NotificationSender},
};

#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("Forbidden - Admin access required")]
    Forbidden,
    #[error("Group not found")]
    NotFound,
    #[error("Failed to persist group status")]
    UpdateFailed(anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApprovalError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ApprovalError::Forbidden => StatusCode::FORBIDDEN,
            ApprovalError::NotFound => StatusCode::NOT_FOUND,
            ApprovalError::UpdateFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApprovalError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type WorkflowResult<T> = std::result::Result<T, ApprovalError>;

/// Outcome of an approval. `warnings` is the side-effect log: enrichment
/// failures land here instead of failing the request, so the status
/// transition stays the only fatal step.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub group_id: Uuid,
    pub status: GroupStatus,
    pub channel: Option<ChannelBinding>,
    pub warnings: Vec<String>,
}

pub struct GroupApprovalWorkflow<G, P, C, E>
where
    G: GroupRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    C: ChatGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    group_repo: Arc<G>,
    profile_repo: Arc<P>,
    provisioner: ChannelProvisioner<C>,
    notifier: NotificationSender<E>,
}

impl<G, P, C, E> GroupApprovalWorkflow<G, P, C, E>
where
    G: GroupRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    C: ChatGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    pub fn new(
        group_repo: Arc<G>,
        profile_repo: Arc<P>,
        provisioner: ChannelProvisioner<C>,
        notifier: NotificationSender<E>,
    ) -> Self {
        Self {
            group_repo,
            profile_repo,
            provisioner,
            notifier,
        }
    }

    pub async fn list_pending(&self, auth: &AuthUser) -> WorkflowResult<Vec<GroupDetail>> {
        self.require_admin(auth).await?;

        self.group_repo
            .list_details_by_status(GroupStatus::Pending)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "approval: failed to list pending groups");
                ApprovalError::Internal(err)
            })
    }

    pub async fn approve(
        &self,
        auth: &AuthUser,
        group_id: Uuid,
    ) -> WorkflowResult<ApprovalOutcome> {
        self.require_admin(auth).await?;

        info!(%group_id, admin_id = %auth.user_id, "approval: approve requested");

        let GroupWithCreator {
            group,
            creator_email,
        } = self
            .group_repo
            .find_with_creator(group_id)
            .await
            .map_err(|err| {
                error!(%group_id, db_error = ?err, "approval: failed to load group");
                ApprovalError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%group_id, "approval: group not found");
                ApprovalError::NotFound
            })?;

        if GroupStatus::from_str(&group.status) == GroupStatus::Active {
            info!(%group_id, "approval: group already active, skipping re-provisioning");
            return Ok(ApprovalOutcome {
                group_id,
                status: GroupStatus::Active,
                channel: ChannelBinding::from_entity(&group),
                warnings: Vec::new(),
            });
        }

        // The status write is the one step that must commit; everything after
        // it degrades into the warnings list.
        let affected = self
            .group_repo
            .update_status(group_id, GroupStatus::Active)
            .await
            .map_err(|err| {
                error!(%group_id, db_error = ?err, "approval: status write failed");
                ApprovalError::UpdateFailed(err)
            })?;
        if affected == 0 {
            warn!(%group_id, "approval: group vanished before status write");
            return Err(ApprovalError::NotFound);
        }

        info!(%group_id, "approval: group status persisted as active");

        let mut warnings = Vec::new();
        let mut channel = ChannelBinding::from_entity(&group);

        if group.slack_channel_id.is_none() {
            match self.provisioner.ensure_channel(&group.name).await {
                Ok(provisioned) => {
                    let binding = ChannelBinding {
                        channel_id: provisioned.channel_id,
                        channel_name: provisioned.channel_name,
                        channel_url: provisioned.channel_url,
                    };
                    if let Err(err) = self.group_repo.bind_channel(group_id, &binding).await {
                        warn!(
                            %group_id,
                            channel_id = %binding.channel_id,
                            db_error = ?err,
                            "approval: could not persist channel binding, group stays approved"
                        );
                        warnings.push(format!("channel binding was not persisted: {err}"));
                    }
                    channel = Some(binding);
                }
                Err(err) => {
                    warn!(
                        %group_id,
                        error = ?err,
                        "approval: channel provisioning failed, group stays approved"
                    );
                    warnings.push(format!("channel provisioning failed: {err}"));
                }
            }
        }

        match creator_email.as_deref() {
            Some(creator_email) => {
                let channel_name = channel.as_ref().map(|c| c.channel_name.as_str());
                if let Err(err) = self
                    .notifier
                    .send_group_approval(creator_email, &group.name, channel_name)
                    .await
                {
                    warn!(
                        %group_id,
                        error = ?err,
                        "approval: approval notice not delivered"
                    );
                    warnings.push(format!("approval email was not delivered: {err}"));
                }
            }
            None => {
                warn!(%group_id, "approval: creator has no profile email, skipping notice");
                warnings.push("approval email skipped: creator email unknown".to_string());
            }
        }

        info!(
            %group_id,
            warning_count = warnings.len(),
            "approval: approve completed"
        );

        Ok(ApprovalOutcome {
            group_id,
            status: GroupStatus::Active,
            channel,
            warnings,
        })
    }

    pub async fn reject(
        &self,
        auth: &AuthUser,
        group_id: Uuid,
        reason: Option<&str>,
    ) -> WorkflowResult<()> {
        self.require_admin(auth).await?;

        let affected = self
            .group_repo
            .update_status(group_id, GroupStatus::Suspended)
            .await
            .map_err(|err| {
                error!(%group_id, db_error = ?err, "approval: reject write failed");
                ApprovalError::UpdateFailed(err)
            })?;
        if affected == 0 {
            return Err(ApprovalError::NotFound);
        }

        // The reason is operator context only; it is not persisted.
        info!(%group_id, admin_id = %auth.user_id, reason = ?reason, "approval: group rejected");

        Ok(())
    }

    /// Admin override back to active. Channel enrichment only runs during
    /// first approval, so this is a plain status flip.
    pub async fn reactivate(&self, auth: &AuthUser, group_id: Uuid) -> WorkflowResult<()> {
        self.require_admin(auth).await?;

        let group = self
            .group_repo
            .find_by_id(group_id)
            .await
            .map_err(ApprovalError::Internal)?
            .ok_or(ApprovalError::NotFound)?;

        if GroupStatus::from_str(&group.status) == GroupStatus::Active {
            info!(%group_id, "approval: group already active, nothing to reactivate");
            return Ok(());
        }

        let affected = self
            .group_repo
            .update_status(group_id, GroupStatus::Active)
            .await
            .map_err(|err| {
                error!(%group_id, db_error = ?err, "approval: reactivate write failed");
                ApprovalError::UpdateFailed(err)
            })?;
        if affected == 0 {
            return Err(ApprovalError::NotFound);
        }

        info!(%group_id, admin_id = %auth.user_id, "approval: group reactivated");

        Ok(())
    }

    async fn require_admin(&self, auth: &AuthUser) -> WorkflowResult<()> {
        let profile = self
            .profile_repo
            .find_by_id(auth.user_id)
            .await
            .map_err(|err| {
                error!(user_id = %auth.user_id, db_error = ?err, "approval: failed to load caller profile");
                ApprovalError::Internal(err)
            })?;

        let role = profile.map(|p| UserRole::from_str(&p.role));
        if role != Some(UserRole::Admin) {
            warn!(user_id = %auth.user_id, ?role, "approval: admin access denied");
            return Err(ApprovalError::Forbidden);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::Utc;
    use crates::domain::{
        entities::{groups::GroupEntity, profiles::ProfileEntity},
        repositories::{groups::MockGroupRepository, profiles::MockProfileRepository},
    };
    use mockall::predicate::eq;

    use crate::usecases::{
        channel_provisioning::MockChatGateway, notifications::MockEmailGateway,
    };

    const INVITE_URL: &str = "https://join.slack.com/t/groopie-workspace/shared_invite/zt-test";

    fn auth_user() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: Some("admin@example.com".to_string()),
            role: "authenticated".to_string(),
        }
    }

    fn profile(user_id: Uuid, role: &str) -> ProfileEntity {
        let now = Utc::now();
        ProfileEntity {
            id: user_id,
            email: Some("admin@example.com".to_string()),
            full_name: None,
            role: role.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn pending_group(name: &str) -> GroupEntity {
        let now = Utc::now();
        GroupEntity {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            creator_id: Uuid::new_v4(),
            status: GroupStatus::Pending.to_string(),
            slack_channel_id: None,
            slack_channel_name: None,
            slack_channel_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn expect_admin(profile_repo: &mut MockProfileRepository, auth: &AuthUser) {
        let admin = profile(auth.user_id, "admin");
        profile_repo
            .expect_find_by_id()
            .with(eq(auth.user_id))
            .returning(move |_| {
                let admin = admin.clone();
                Box::pin(async move { Ok(Some(admin)) })
            });
    }

    fn workflow(
        group_repo: MockGroupRepository,
        profile_repo: MockProfileRepository,
        chat: MockChatGateway,
        email: MockEmailGateway,
    ) -> GroupApprovalWorkflow<
        MockGroupRepository,
        MockProfileRepository,
        MockChatGateway,
        MockEmailGateway,
    > {
        GroupApprovalWorkflow::new(
            Arc::new(group_repo),
            Arc::new(profile_repo),
            ChannelProvisioner::new(Arc::new(chat), "tech@joingroopie.com".to_string()),
            NotificationSender::new(Arc::new(email), INVITE_URL.to_string()),
        )
    }

    #[tokio::test]
    async fn non_admin_is_forbidden_and_nothing_is_written() {
        let auth = auth_user();
        let group_repo = MockGroupRepository::new();
        let mut profile_repo = MockProfileRepository::new();

        let creator = profile(auth.user_id, "creator");
        profile_repo.expect_find_by_id().returning(move |_| {
            let creator = creator.clone();
            Box::pin(async move { Ok(Some(creator)) })
        });

        // group_repo has no expectations: any touch fails the test.
        let workflow = workflow(
            group_repo,
            profile_repo,
            MockChatGateway::new(),
            MockEmailGateway::new(),
        );

        let result = workflow.approve(&auth, Uuid::new_v4()).await;
        assert!(matches!(result, Err(ApprovalError::Forbidden)));
    }

    #[tokio::test]
    async fn missing_profile_is_forbidden() {
        let auth = auth_user();
        let mut profile_repo = MockProfileRepository::new();
        profile_repo
            .expect_find_by_id()
            .returning(|_| Box::pin(async { Ok(None) }));

        let workflow = workflow(
            MockGroupRepository::new(),
            profile_repo,
            MockChatGateway::new(),
            MockEmailGateway::new(),
        );

        let result = workflow.approve(&auth, Uuid::new_v4()).await;
        assert!(matches!(result, Err(ApprovalError::Forbidden)));
    }

    #[tokio::test]
    async fn unknown_group_is_not_found_without_status_write() {
        let auth = auth_user();
        let mut group_repo = MockGroupRepository::new();
        let mut profile_repo = MockProfileRepository::new();
        expect_admin(&mut profile_repo, &auth);

        group_repo
            .expect_find_with_creator()
            .returning(|_| Box::pin(async { Ok(None) }));
        // No update_status expectation: a write would fail the test.

        let workflow = workflow(
            group_repo,
            profile_repo,
            MockChatGateway::new(),
            MockEmailGateway::new(),
        );

        let result = workflow.approve(&auth, Uuid::new_v4()).await;
        assert!(matches!(result, Err(ApprovalError::NotFound)));
    }

    #[tokio::test]
    async fn already_active_group_short_circuits_without_side_effects() {
        let auth = auth_user();
        let mut group_repo = MockGroupRepository::new();
        let mut profile_repo = MockProfileRepository::new();
        expect_admin(&mut profile_repo, &auth);

        let mut group = pending_group("TXKL Users");
        group.status = GroupStatus::Active.to_string();
        group.slack_channel_id = Some("C042".to_string());
        group.slack_channel_name = Some("txkl-users".to_string());
        group.slack_channel_url = Some("https://app.slack.com/client/T0TEST/C042".to_string());
        let group_id = group.id;

        group_repo
            .expect_find_with_creator()
            .with(eq(group_id))
            .returning(move |_| {
                let group = group.clone();
                Box::pin(async move {
                    Ok(Some(GroupWithCreator {
                        group,
                        creator_email: Some("creator@example.com".to_string()),
                    }))
                })
            });
        // No update_status / chat / email expectations: the second approve
        // must not provision or notify again.

        let workflow = workflow(
            group_repo,
            profile_repo,
            MockChatGateway::new(),
            MockEmailGateway::new(),
        );

        let outcome = workflow.approve(&auth, group_id).await.unwrap();
        assert_eq!(outcome.status, GroupStatus::Active);
        assert_eq!(
            outcome.channel.map(|c| c.channel_id),
            Some("C042".to_string())
        );
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn approves_pending_group_and_binds_normalized_channel() {
        let auth = auth_user();
        let mut group_repo = MockGroupRepository::new();
        let mut profile_repo = MockProfileRepository::new();
        let mut chat = MockChatGateway::new();
        let mut email = MockEmailGateway::new();
        expect_admin(&mut profile_repo, &auth);

        let group = pending_group("TXKL Users");
        let group_id = group.id;

        group_repo
            .expect_find_with_creator()
            .with(eq(group_id))
            .returning(move |_| {
                let group = group.clone();
                Box::pin(async move {
                    Ok(Some(GroupWithCreator {
                        group,
                        creator_email: Some("creator@example.com".to_string()),
                    }))
                })
            });
        group_repo
            .expect_update_status()
            .with(eq(group_id), eq(GroupStatus::Active))
            .returning(|_, _| Box::pin(async { Ok(1) }));
        group_repo
            .expect_bind_channel()
            .withf(move |id, binding| {
                *id == group_id
                    && binding.channel_id == "C777"
                    && binding.channel_name == "txkl-users"
            })
            .returning(|_, _| Box::pin(async { Ok(()) }));

        chat.expect_find_channel_id_by_name()
            .with(eq("txkl-users"))
            .returning(|_| Box::pin(async { Ok(None) }));
        chat.expect_create_channel()
            .with(eq("txkl-users"))
            .returning(|_| Box::pin(async { Ok("C777".to_string()) }));
        chat.expect_set_channel_topic()
            .returning(|_, _| Box::pin(async { Ok(()) }));
        chat.expect_lookup_user_id_by_email()
            .returning(|_| Box::pin(async { Ok(Some("U001".to_string())) }));
        chat.expect_invite_to_channel()
            .returning(|_, _| Box::pin(async { Ok(()) }));
        chat.expect_channel_url()
            .returning(|id| format!("https://app.slack.com/client/T0TEST/{}", id));

        email
            .expect_send_email()
            .withf(|to, subject, html| {
                to == "creator@example.com"
                    && subject.contains("Approved")
                    && html.contains("#txkl-users")
            })
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let workflow = workflow(group_repo, profile_repo, chat, email);

        let outcome = workflow.approve(&auth, group_id).await.unwrap();
        assert_eq!(outcome.status, GroupStatus::Active);
        let channel = outcome.channel.unwrap();
        assert_eq!(channel.channel_id, "C777");
        assert_eq!(channel.channel_name, "txkl-users");
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn status_write_failure_is_fatal() {
        let auth = auth_user();
        let mut group_repo = MockGroupRepository::new();
        let mut profile_repo = MockProfileRepository::new();
        expect_admin(&mut profile_repo, &auth);

        let group = pending_group("TXKL Users");
        let group_id = group.id;

        group_repo.expect_find_with_creator().returning(move |_| {
            let group = group.clone();
            Box::pin(async move {
                Ok(Some(GroupWithCreator {
                    group,
                    creator_email: Some("creator@example.com".to_string()),
                }))
            })
        });
        group_repo
            .expect_update_status()
            .returning(|_, _| Box::pin(async { Err(anyhow!("connection reset")) }));
        // No chat/email expectations: nothing may run past the failed write.

        let workflow = workflow(
            group_repo,
            profile_repo,
            MockChatGateway::new(),
            MockEmailGateway::new(),
        );

        let result = workflow.approve(&auth, group_id).await;
        assert!(matches!(result, Err(ApprovalError::UpdateFailed(_))));
    }

    #[tokio::test]
    async fn channel_creation_failure_still_approves() {
        let auth = auth_user();
        let mut group_repo = MockGroupRepository::new();
        let mut profile_repo = MockProfileRepository::new();
        let mut chat = MockChatGateway::new();
        let mut email = MockEmailGateway::new();
        expect_admin(&mut profile_repo, &auth);

        let group = pending_group("TXKL Users");
        let group_id = group.id;

        group_repo.expect_find_with_creator().returning(move |_| {
            let group = group.clone();
            Box::pin(async move {
                Ok(Some(GroupWithCreator {
                    group,
                    creator_email: Some("creator@example.com".to_string()),
                }))
            })
        });
        group_repo
            .expect_update_status()
            .returning(|_, _| Box::pin(async { Ok(1) }));
        // No bind_channel expectation: provisioning failed, nothing to persist.

        chat.expect_find_channel_id_by_name()
            .returning(|_| Box::pin(async { Ok(None) }));
        chat.expect_create_channel()
            .returning(|_| Box::pin(async { Err(anyhow!("restricted_action")) }));

        // The approval notice still goes out, without a channel name.
        email
            .expect_send_email()
            .withf(|to, _, html| to == "creator@example.com" && !html.contains('#'))
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let workflow = workflow(group_repo, profile_repo, chat, email);

        let outcome = workflow.approve(&auth, group_id).await.unwrap();
        assert_eq!(outcome.status, GroupStatus::Active);
        assert!(outcome.channel.is_none());
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[tokio::test]
    async fn binding_persist_failure_is_a_warning_only() {
        let auth = auth_user();
        let mut group_repo = MockGroupRepository::new();
        let mut profile_repo = MockProfileRepository::new();
        let mut chat = MockChatGateway::new();
        let mut email = MockEmailGateway::new();
        expect_admin(&mut profile_repo, &auth);

        let group = pending_group("TXKL Users");
        let group_id = group.id;

        group_repo.expect_find_with_creator().returning(move |_| {
            let group = group.clone();
            Box::pin(async move {
                Ok(Some(GroupWithCreator {
                    group,
                    creator_email: Some("creator@example.com".to_string()),
                }))
            })
        });
        group_repo
            .expect_update_status()
            .returning(|_, _| Box::pin(async { Ok(1) }));
        group_repo
            .expect_bind_channel()
            .returning(|_, _| Box::pin(async { Err(anyhow!("connection reset")) }));

        chat.expect_find_channel_id_by_name()
            .returning(|_| Box::pin(async { Ok(Some("C042".to_string())) }));
        chat.expect_channel_url()
            .returning(|id| format!("https://app.slack.com/client/T0TEST/{}", id));

        email
            .expect_send_email()
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let workflow = workflow(group_repo, profile_repo, chat, email);

        let outcome = workflow.approve(&auth, group_id).await.unwrap();
        assert_eq!(outcome.status, GroupStatus::Active);
        assert!(outcome.channel.is_some());
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[tokio::test]
    async fn email_failure_is_a_warning_only() {
        let auth = auth_user();
        let mut group_repo = MockGroupRepository::new();
        let mut profile_repo = MockProfileRepository::new();
        let mut chat = MockChatGateway::new();
        let mut email = MockEmailGateway::new();
        expect_admin(&mut profile_repo, &auth);

        let group = pending_group("TXKL Users");
        let group_id = group.id;

        group_repo.expect_find_with_creator().returning(move |_| {
            let group = group.clone();
            Box::pin(async move {
                Ok(Some(GroupWithCreator {
                    group,
                    creator_email: Some("creator@example.com".to_string()),
                }))
            })
        });
        group_repo
            .expect_update_status()
            .returning(|_, _| Box::pin(async { Ok(1) }));
        group_repo
            .expect_bind_channel()
            .returning(|_, _| Box::pin(async { Ok(()) }));

        chat.expect_find_channel_id_by_name()
            .returning(|_| Box::pin(async { Ok(Some("C042".to_string())) }));
        chat.expect_channel_url()
            .returning(|id| format!("https://app.slack.com/client/T0TEST/{}", id));

        email
            .expect_send_email()
            .returning(|_, _, _| Box::pin(async { Err(anyhow!("sendgrid down")) }));

        let workflow = workflow(group_repo, profile_repo, chat, email);

        let outcome = workflow.approve(&auth, group_id).await.unwrap();
        assert_eq!(outcome.status, GroupStatus::Active);
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[tokio::test]
    async fn reject_persists_suspended() {
        let auth = auth_user();
        let mut group_repo = MockGroupRepository::new();
        let mut profile_repo = MockProfileRepository::new();
        expect_admin(&mut profile_repo, &auth);

        let group_id = Uuid::new_v4();
        group_repo
            .expect_update_status()
            .with(eq(group_id), eq(GroupStatus::Suspended))
            .returning(|_, _| Box::pin(async { Ok(1) }));

        let workflow = workflow(
            group_repo,
            profile_repo,
            MockChatGateway::new(),
            MockEmailGateway::new(),
        );

        workflow
            .reject(&auth, group_id, Some("spam"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reactivate_flips_suspended_back_to_active() {
        let auth = auth_user();
        let mut group_repo = MockGroupRepository::new();
        let mut profile_repo = MockProfileRepository::new();
        expect_admin(&mut profile_repo, &auth);

        let mut group = pending_group("TXKL Users");
        group.status = GroupStatus::Suspended.to_string();
        let group_id = group.id;

        group_repo
            .expect_find_by_id()
            .with(eq(group_id))
            .returning(move |_| {
                let group = group.clone();
                Box::pin(async move { Ok(Some(group)) })
            });
        group_repo
            .expect_update_status()
            .with(eq(group_id), eq(GroupStatus::Active))
            .returning(|_, _| Box::pin(async { Ok(1) }));

        let workflow = workflow(
            group_repo,
            profile_repo,
            MockChatGateway::new(),
            MockEmailGateway::new(),
        );

        workflow.reactivate(&auth, group_id).await.unwrap();
    }
}
