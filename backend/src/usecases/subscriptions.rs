use std::sync::Arc;

use crates::domain::{
    entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
    repositories::{
        plans::PlanRepository, profiles::ProfileRepository,
        subscriptions::SubscriptionRepository,
    },
    value_objects::{
        channel_names::normalize_channel_name,
        enums::{
            group_statuses::GroupStatus, subscription_statuses::SubscriptionStatus,
            user_roles::UserRole,
        },
        subscriptions::SubscriptionDetail,
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
pub enum SubscriptionError {
    #[error("Plan not found")]
    PlanNotFound,
    #[error("Group is not active")]
    GroupNotActive,
    #[error("Active subscription already exists")]
    AlreadySubscribed,
    #[error("Subscription not found")]
    NotFound,
    #[error("Subscription is already canceled")]
    AlreadyCanceled,
    #[error("Forbidden")]
    Forbidden,
    #[error("Mock checkout is disabled")]
    CheckoutDisabled,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionError::PlanNotFound | SubscriptionError::NotFound => StatusCode::NOT_FOUND,
            SubscriptionError::GroupNotActive
            | SubscriptionError::AlreadySubscribed
            | SubscriptionError::AlreadyCanceled
            | SubscriptionError::CheckoutDisabled => StatusCode::BAD_REQUEST,
            SubscriptionError::Forbidden => StatusCode::FORBIDDEN,
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

/// Outcome of the mock-checkout activation; member onboarding side effects
/// are reported, never fatal.
#[derive(Debug, Clone)]
pub struct ActivationOutcome {
    pub subscription_id: Uuid,
    pub status: SubscriptionStatus,
    pub warnings: Vec<String>,
}

pub struct SubscriptionUseCase<S, P, Pr, C, E>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    Pr: ProfileRepository + Send + Sync + 'static,
    C: ChatGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
    plan_repo: Arc<P>,
    profile_repo: Arc<Pr>,
    dispatcher: InvitationDispatcher<C>,
    notifier: NotificationSender<E>,
    mock_checkout_enabled: bool,
}

impl<S, P, Pr, C, E> SubscriptionUseCase<S, P, Pr, C, E>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    Pr: ProfileRepository + Send + Sync + 'static,
    C: ChatGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    pub fn new(
        subscription_repo: Arc<S>,
        plan_repo: Arc<P>,
        profile_repo: Arc<Pr>,
        dispatcher: InvitationDispatcher<C>,
        notifier: NotificationSender<E>,
        mock_checkout_enabled: bool,
    ) -> Self {
        Self {
            subscription_repo,
            plan_repo,
            profile_repo,
            dispatcher,
            notifier,
            mock_checkout_enabled,
        }
    }

    pub async fn subscribe(
        &self,
        auth: &AuthUser,
        plan_id: Uuid,
    ) -> UseCaseResult<SubscriptionEntity> {
        info!(user_id = %auth.user_id, %plan_id, "subscriptions: subscribe requested");

        let (_plan, group) = self
            .plan_repo
            .find_with_group(plan_id)
            .await
            .map_err(|err| {
                error!(%plan_id, db_error = ?err, "subscriptions: failed to load plan");
                SubscriptionError::Internal(err)
            })?
            .ok_or(SubscriptionError::PlanNotFound)?;

        if GroupStatus::from_str(&group.status) != GroupStatus::Active {
            warn!(
                user_id = %auth.user_id,
                %plan_id,
                group_id = %group.id,
                "subscriptions: group is not active"
            );
            return Err(SubscriptionError::GroupNotActive);
        }

        // At most one active subscription per (user, plan).
        let existing = self
            .subscription_repo
            .find_active_by_user_and_plan(auth.user_id, plan_id)
            .await
            .map_err(SubscriptionError::Internal)?;
        if existing.is_some() {
            warn!(
                user_id = %auth.user_id,
                %plan_id,
                "subscriptions: active subscription already exists"
            );
            return Err(SubscriptionError::AlreadySubscribed);
        }

        let created = self
            .subscription_repo
            .create(InsertSubscriptionEntity {
                user_id: auth.user_id,
                plan_id,
                status: SubscriptionStatus::Incomplete.to_string(),
            })
            .await
            .map_err(|err| {
                error!(
                    user_id = %auth.user_id,
                    %plan_id,
                    db_error = ?err,
                    "subscriptions: create failed"
                );
                SubscriptionError::Internal(err)
            })?;

        info!(
            subscription_id = %created.id,
            user_id = %auth.user_id,
            %plan_id,
            "subscriptions: subscription created as incomplete"
        );

        Ok(created)
    }

    pub async fn get(
        &self,
        auth: &AuthUser,
        subscription_id: Uuid,
    ) -> UseCaseResult<SubscriptionDetail> {
        let detail = self
            .subscription_repo
            .find_detail(subscription_id)
            .await
            .map_err(SubscriptionError::Internal)?
            .ok_or(SubscriptionError::NotFound)?;

        // Visible to the subscriber and to the group's creator only.
        if detail.subscription.user_id != auth.user_id
            && detail.group.creator_id != auth.user_id
        {
            return Err(SubscriptionError::Forbidden);
        }

        Ok(detail)
    }

    pub async fn cancel(&self, auth: &AuthUser, subscription_id: Uuid) -> UseCaseResult<()> {
        let subscription = self
            .subscription_repo
            .find_by_id(subscription_id)
            .await
            .map_err(SubscriptionError::Internal)?
            .filter(|subscription| subscription.user_id == auth.user_id)
            .ok_or(SubscriptionError::NotFound)?;

        if SubscriptionStatus::from_str(&subscription.status) == SubscriptionStatus::Canceled {
            return Err(SubscriptionError::AlreadyCanceled);
        }

        let affected = self
            .subscription_repo
            .update_status(subscription_id, SubscriptionStatus::Canceled)
            .await
            .map_err(SubscriptionError::Internal)?;
        if affected == 0 {
            return Err(SubscriptionError::NotFound);
        }

        info!(%subscription_id, user_id = %auth.user_id, "subscriptions: canceled");

        Ok(())
    }

    /// Mock-checkout activation: flips the subscription active without any
    /// payment verification, then onboards the member into the group channel.
    /// Demo environments only; gated by `MOCK_CHECKOUT_ENABLED`.
    pub async fn activate(
        &self,
        auth: &AuthUser,
        subscription_id: Uuid,
    ) -> UseCaseResult<ActivationOutcome> {
        if !self.mock_checkout_enabled {
            warn!(
                %subscription_id,
                "subscriptions: mock checkout activation requested but disabled"
            );
            return Err(SubscriptionError::CheckoutDisabled);
        }

        let detail = self
            .subscription_repo
            .find_detail(subscription_id)
            .await
            .map_err(SubscriptionError::Internal)?
            .ok_or(SubscriptionError::NotFound)?;

        if detail.group.creator_id != auth.user_id {
            self.require_admin(auth).await?;
        }

        if SubscriptionStatus::from_str(&detail.subscription.status)
            == SubscriptionStatus::Active
        {
            info!(%subscription_id, "subscriptions: already active, nothing to do");
            return Ok(ActivationOutcome {
                subscription_id,
                status: SubscriptionStatus::Active,
                warnings: Vec::new(),
            });
        }

        warn!(
            %subscription_id,
            "subscriptions: mock checkout activation, payment verification is bypassed (non-production path)"
        );

        let affected = self
            .subscription_repo
            .update_status(subscription_id, SubscriptionStatus::Active)
            .await
            .map_err(SubscriptionError::Internal)?;
        if affected == 0 {
            return Err(SubscriptionError::NotFound);
        }

        let mut warnings = Vec::new();

        let member_email = self
            .profile_repo
            .find_by_id(detail.subscription.user_id)
            .await
            .map_err(SubscriptionError::Internal)?
            .and_then(|profile| profile.email);

        match member_email {
            Some(member_email) => {
                let channel_name = detail
                    .group
                    .slack_channel_name
                    .clone()
                    .unwrap_or_else(|| normalize_channel_name(&detail.group.name));

                // Email first: it carries the workspace join link the member
                // needs when the direct channel invite cannot land yet.
                if let Err(err) = self
                    .notifier
                    .send_slack_invite(&member_email, &detail.group.name, &channel_name)
                    .await
                {
                    warn!(
                        %subscription_id,
                        error = ?err,
                        "subscriptions: invite email not delivered"
                    );
                    warnings.push(format!("invite email was not delivered: {err}"));
                }

                match detail.group.slack_channel_id.as_deref() {
                    Some(channel_id) => {
                        match self.dispatcher.invite_by_email(channel_id, &member_email).await {
                            Ok(()) => {}
                            Err(InvitationError::UserNotInWorkspace) => {
                                info!(
                                    %subscription_id,
                                    "subscriptions: member not in workspace yet"
                                );
                                warnings.push(
                                    "member has not joined the chat workspace yet".to_string(),
                                );
                            }
                            Err(err) => {
                                warn!(
                                    %subscription_id,
                                    error = ?err,
                                    "subscriptions: channel invite failed"
                                );
                                warnings.push(format!("channel invite failed: {err}"));
                            }
                        }
                    }
                    None => {
                        warnings.push("group has no chat channel yet".to_string());
                    }
                }
            }
            None => {
                warn!(
                    %subscription_id,
                    "subscriptions: member has no profile email, skipping onboarding"
                );
                warnings.push("member onboarding skipped: email unknown".to_string());
            }
        }

        info!(
            %subscription_id,
            warning_count = warnings.len(),
            "subscriptions: activation completed"
        );

        Ok(ActivationOutcome {
            subscription_id,
            status: SubscriptionStatus::Active,
            warnings,
        })
    }

    async fn require_admin(&self, auth: &AuthUser) -> UseCaseResult<()> {
        let profile = self
            .profile_repo
            .find_by_id(auth.user_id)
            .await
            .map_err(SubscriptionError::Internal)?;

        let role = profile.map(|p| UserRole::from_str(&p.role));
        if role != Some(UserRole::Admin) {
            warn!(user_id = %auth.user_id, ?role, "subscriptions: admin access denied");
            return Err(SubscriptionError::Forbidden);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crates::domain::{
        entities::{groups::GroupEntity, plans::PlanEntity},
        repositories::{
            plans::MockPlanRepository, profiles::MockProfileRepository,
            subscriptions::MockSubscriptionRepository,
        },
    };
    use mockall::predicate::eq;
    use serde_json::json;

    use crate::usecases::{
        channel_provisioning::MockChatGateway, notifications::MockEmailGateway,
    };

    const INVITE_URL: &str = "https://join.slack.com/t/groopie-workspace/shared_invite/zt-test";

    fn auth_user() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: Some("subscriber@example.com".to_string()),
            role: "authenticated".to_string(),
        }
    }

    fn group(status: GroupStatus) -> GroupEntity {
        let now = Utc::now();
        GroupEntity {
            id: Uuid::new_v4(),
            name: "TXKL Users".to_string(),
            description: None,
            creator_id: Uuid::new_v4(),
            status: status.to_string(),
            slack_channel_id: Some("C042".to_string()),
            slack_channel_name: Some("txkl-users".to_string()),
            slack_channel_url: Some("https://app.slack.com/client/T0TEST/C042".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    fn plan(group_id: Uuid) -> PlanEntity {
        let now = Utc::now();
        PlanEntity {
            id: Uuid::new_v4(),
            group_id,
            name: "Premium".to_string(),
            description: None,
            price_minor: 999,
            features: json!(["channel access", "monthly AMA"]),
            created_at: now,
            updated_at: now,
        }
    }

    fn subscription(user_id: Uuid, plan_id: Uuid, status: SubscriptionStatus) -> SubscriptionEntity {
        let now = Utc::now();
        SubscriptionEntity {
            id: Uuid::new_v4(),
            user_id,
            plan_id,
            status: status.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn usecase(
        subscription_repo: MockSubscriptionRepository,
        plan_repo: MockPlanRepository,
        profile_repo: MockProfileRepository,
        chat: MockChatGateway,
        email: MockEmailGateway,
        mock_checkout_enabled: bool,
    ) -> SubscriptionUseCase<
        MockSubscriptionRepository,
        MockPlanRepository,
        MockProfileRepository,
        MockChatGateway,
        MockEmailGateway,
    > {
        SubscriptionUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(plan_repo),
            Arc::new(profile_repo),
            InvitationDispatcher::new(Arc::new(chat)),
            NotificationSender::new(Arc::new(email), INVITE_URL.to_string()),
            mock_checkout_enabled,
        )
    }

    #[tokio::test]
    async fn subscribe_rejects_inactive_group() {
        let auth = auth_user();
        let mut plan_repo = MockPlanRepository::new();

        let group = group(GroupStatus::Pending);
        let plan = plan(group.id);
        let plan_id = plan.id;
        plan_repo.expect_find_with_group().returning(move |_| {
            let pair = (plan.clone(), group.clone());
            Box::pin(async move { Ok(Some(pair)) })
        });

        let usecase = usecase(
            MockSubscriptionRepository::new(),
            plan_repo,
            MockProfileRepository::new(),
            MockChatGateway::new(),
            MockEmailGateway::new(),
            false,
        );

        let result = usecase.subscribe(&auth, plan_id).await;
        assert!(matches!(result, Err(SubscriptionError::GroupNotActive)));
    }

    #[tokio::test]
    async fn subscribe_rejects_duplicate_active_subscription() {
        let auth = auth_user();
        let mut plan_repo = MockPlanRepository::new();
        let mut subscription_repo = MockSubscriptionRepository::new();

        let group = group(GroupStatus::Active);
        let plan = plan(group.id);
        let plan_id = plan.id;
        plan_repo.expect_find_with_group().returning(move |_| {
            let pair = (plan.clone(), group.clone());
            Box::pin(async move { Ok(Some(pair)) })
        });

        let existing = subscription(auth.user_id, plan_id, SubscriptionStatus::Active);
        subscription_repo
            .expect_find_active_by_user_and_plan()
            .with(eq(auth.user_id), eq(plan_id))
            .returning(move |_, _| {
                let existing = existing.clone();
                Box::pin(async move { Ok(Some(existing)) })
            });
        // No create expectation: a second active subscription must not be made.

        let usecase = usecase(
            subscription_repo,
            plan_repo,
            MockProfileRepository::new(),
            MockChatGateway::new(),
            MockEmailGateway::new(),
            false,
        );

        let result = usecase.subscribe(&auth, plan_id).await;
        assert!(matches!(result, Err(SubscriptionError::AlreadySubscribed)));
    }

    #[tokio::test]
    async fn subscribe_creates_incomplete_subscription() {
        let auth = auth_user();
        let mut plan_repo = MockPlanRepository::new();
        let mut subscription_repo = MockSubscriptionRepository::new();

        let group = group(GroupStatus::Active);
        let plan = plan(group.id);
        let plan_id = plan.id;
        plan_repo.expect_find_with_group().returning(move |_| {
            let pair = (plan.clone(), group.clone());
            Box::pin(async move { Ok(Some(pair)) })
        });
        subscription_repo
            .expect_find_active_by_user_and_plan()
            .returning(|_, _| Box::pin(async { Ok(None) }));

        let user_id = auth.user_id;
        subscription_repo
            .expect_create()
            .withf(move |insert| {
                insert.user_id == user_id
                    && insert.status == SubscriptionStatus::Incomplete.to_string()
            })
            .returning(move |insert| {
                let created =
                    subscription(insert.user_id, insert.plan_id, SubscriptionStatus::Incomplete);
                Box::pin(async move { Ok(created) })
            });

        let usecase = usecase(
            subscription_repo,
            plan_repo,
            MockProfileRepository::new(),
            MockChatGateway::new(),
            MockEmailGateway::new(),
            false,
        );

        let created = usecase.subscribe(&auth, plan_id).await.unwrap();
        assert_eq!(created.status, SubscriptionStatus::Incomplete.to_string());
    }

    #[tokio::test]
    async fn cancel_rejects_already_canceled() {
        let auth = auth_user();
        let mut subscription_repo = MockSubscriptionRepository::new();

        let existing = subscription(auth.user_id, Uuid::new_v4(), SubscriptionStatus::Canceled);
        let subscription_id = existing.id;
        subscription_repo.expect_find_by_id().returning(move |_| {
            let existing = existing.clone();
            Box::pin(async move { Ok(Some(existing)) })
        });

        let usecase = usecase(
            subscription_repo,
            MockPlanRepository::new(),
            MockProfileRepository::new(),
            MockChatGateway::new(),
            MockEmailGateway::new(),
            false,
        );

        let result = usecase.cancel(&auth, subscription_id).await;
        assert!(matches!(result, Err(SubscriptionError::AlreadyCanceled)));
    }

    #[tokio::test]
    async fn activation_is_gated_by_the_mock_checkout_flag() {
        let auth = auth_user();
        let usecase = usecase(
            MockSubscriptionRepository::new(),
            MockPlanRepository::new(),
            MockProfileRepository::new(),
            MockChatGateway::new(),
            MockEmailGateway::new(),
            false,
        );

        let result = usecase.activate(&auth, Uuid::new_v4()).await;
        assert!(matches!(result, Err(SubscriptionError::CheckoutDisabled)));
    }

    #[tokio::test]
    async fn activation_reports_success_with_member_not_in_workspace() {
        let auth = auth_user();
        let mut subscription_repo = MockSubscriptionRepository::new();
        let mut profile_repo = MockProfileRepository::new();
        let mut chat = MockChatGateway::new();
        let mut email = MockEmailGateway::new();

        let mut group = group(GroupStatus::Active);
        group.creator_id = auth.user_id;
        let plan = plan(group.id);
        let member_id = Uuid::new_v4();
        let pending = subscription(member_id, plan.id, SubscriptionStatus::Pending);
        let subscription_id = pending.id;

        subscription_repo.expect_find_detail().returning(move |_| {
            let detail = SubscriptionDetail {
                subscription: pending.clone(),
                plan: plan.clone(),
                group: group.clone(),
            };
            Box::pin(async move { Ok(Some(detail)) })
        });
        subscription_repo
            .expect_update_status()
            .with(eq(subscription_id), eq(SubscriptionStatus::Active))
            .returning(|_, _| Box::pin(async { Ok(1) }));

        let member_profile = crates::domain::entities::profiles::ProfileEntity {
            id: member_id,
            email: Some("member@example.com".to_string()),
            full_name: None,
            role: UserRole::Subscriber.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        profile_repo
            .expect_find_by_id()
            .with(eq(member_id))
            .returning(move |_| {
                let member_profile = member_profile.clone();
                Box::pin(async move { Ok(Some(member_profile)) })
            });

        email
            .expect_send_email()
            .withf(|to, _, html| to == "member@example.com" && html.contains("#txkl-users"))
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        chat.expect_lookup_user_id_by_email()
            .with(eq("member@example.com"))
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = usecase(
            subscription_repo,
            MockPlanRepository::new(),
            profile_repo,
            chat,
            email,
            true,
        );

        let outcome = usecase.activate(&auth, subscription_id).await.unwrap();
        assert_eq!(outcome.status, SubscriptionStatus::Active);
        assert_eq!(outcome.warnings.len(), 1);
    }
}
