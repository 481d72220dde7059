use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use crates::domain::{
    entities::profiles::{InsertProfileEntity, ProfileEntity},
    repositories::{profiles::ProfileRepository, subscriptions::SubscriptionRepository},
    value_objects::{enums::user_roles::UserRole, subscriptions::SubscriptionDetail},
};
use crates::identity::supabase_admin::SupabaseAdminClient;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::usecases::notifications::{EmailGateway, NotificationSender};

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait IdentityGateway: Send + Sync {
    async fn update_user_role(&self, user_id: Uuid, role: &str) -> AnyResult<()>;
}

#[async_trait]
impl IdentityGateway for SupabaseAdminClient {
    async fn update_user_role(&self, user_id: Uuid, role: &str) -> AnyResult<()> {
        self.update_user_role(user_id, role).await
    }
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Invalid role")]
    InvalidRole,
    #[error("Profile not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UserError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            UserError::InvalidRole => StatusCode::BAD_REQUEST,
            UserError::NotFound => StatusCode::NOT_FOUND,
            UserError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UserResult<T> = std::result::Result<T, UserError>;

pub struct UserUseCase<P, S, I, E>
where
    P: ProfileRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    I: IdentityGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    profile_repo: Arc<P>,
    subscription_repo: Arc<S>,
    identity: Arc<I>,
    notifier: NotificationSender<E>,
}

impl<P, S, I, E> UserUseCase<P, S, I, E>
where
    P: ProfileRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    I: IdentityGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    pub fn new(
        profile_repo: Arc<P>,
        subscription_repo: Arc<S>,
        identity: Arc<I>,
        notifier: NotificationSender<E>,
    ) -> Self {
        Self {
            profile_repo,
            subscription_repo,
            identity,
            notifier,
        }
    }

    /// Returns the caller's profile, mirroring a fresh `subscriber` row from
    /// the token claims on first sight. The welcome email rides on that first
    /// mirror, best-effort.
    pub async fn me(&self, auth: &AuthUser) -> UserResult<ProfileEntity> {
        if let Some(profile) = self
            .profile_repo
            .find_by_id(auth.user_id)
            .await
            .map_err(UserError::Internal)?
        {
            return Ok(profile);
        }

        let created = self
            .profile_repo
            .create(InsertProfileEntity {
                id: auth.user_id,
                email: auth.email.clone(),
                full_name: None,
                role: UserRole::Subscriber.to_string(),
            })
            .await
            .map_err(|err| {
                error!(user_id = %auth.user_id, db_error = ?err, "users: profile mirror failed");
                UserError::Internal(err)
            })?;

        info!(user_id = %auth.user_id, "users: mirrored new profile");

        if let Some(email) = created.email.as_deref() {
            if let Err(err) = self.notifier.send_welcome(email).await {
                warn!(
                    user_id = %auth.user_id,
                    error = ?err,
                    "users: welcome email not delivered"
                );
            }
        }

        Ok(created)
    }

    /// Writes the authoritative profile role, then refreshes the
    /// identity-provider metadata cache best-effort. Only self-service roles
    /// are assignable here; admin is granted out of band.
    pub async fn update_role(&self, auth: &AuthUser, role: &str) -> UserResult<()> {
        let role = match role {
            "subscriber" => UserRole::Subscriber,
            "creator" => UserRole::Creator,
            _ => {
                warn!(user_id = %auth.user_id, role, "users: rejected role value");
                return Err(UserError::InvalidRole);
            }
        };

        let affected = self
            .profile_repo
            .update_role(auth.user_id, role)
            .await
            .map_err(|err| {
                error!(user_id = %auth.user_id, db_error = ?err, "users: role write failed");
                UserError::Internal(err)
            })?;
        if affected == 0 {
            return Err(UserError::NotFound);
        }

        info!(user_id = %auth.user_id, role = %role, "users: role updated");

        if let Err(err) = self
            .identity
            .update_user_role(auth.user_id, &role.to_string())
            .await
        {
            // The profile row already holds the truth; the metadata copy
            // stays stale until the next role change.
            warn!(
                user_id = %auth.user_id,
                error = ?err,
                "users: identity metadata cache sync failed"
            );
        }

        Ok(())
    }

    pub async fn subscriptions(&self, auth: &AuthUser) -> UserResult<Vec<SubscriptionDetail>> {
        self.subscription_repo
            .list_details_by_user(auth.user_id)
            .await
            .map_err(|err| {
                error!(user_id = %auth.user_id, db_error = ?err, "users: subscription list failed");
                UserError::Internal(err)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::Utc;
    use crates::domain::repositories::{
        profiles::MockProfileRepository, subscriptions::MockSubscriptionRepository,
    };
    use mockall::predicate::eq;

    use crate::usecases::notifications::MockEmailGateway;

    const INVITE_URL: &str = "https://join.slack.com/t/groopie-workspace/shared_invite/zt-test";

    fn auth_user() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: Some("new@example.com".to_string()),
            role: "authenticated".to_string(),
        }
    }

    fn profile(user_id: Uuid, role: &str) -> ProfileEntity {
        let now = Utc::now();
        ProfileEntity {
            id: user_id,
            email: Some("new@example.com".to_string()),
            full_name: None,
            role: role.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn usecase(
        profile_repo: MockProfileRepository,
        identity: MockIdentityGateway,
        email: MockEmailGateway,
    ) -> UserUseCase<
        MockProfileRepository,
        MockSubscriptionRepository,
        MockIdentityGateway,
        MockEmailGateway,
    > {
        UserUseCase::new(
            Arc::new(profile_repo),
            Arc::new(MockSubscriptionRepository::new()),
            Arc::new(identity),
            NotificationSender::new(Arc::new(email), INVITE_URL.to_string()),
        )
    }

    #[tokio::test]
    async fn me_mirrors_profile_and_sends_welcome_on_first_sight() {
        let auth = auth_user();
        let mut profile_repo = MockProfileRepository::new();
        let mut email = MockEmailGateway::new();

        profile_repo
            .expect_find_by_id()
            .with(eq(auth.user_id))
            .returning(|_| Box::pin(async { Ok(None) }));

        let user_id = auth.user_id;
        profile_repo
            .expect_create()
            .withf(move |insert| {
                insert.id == user_id && insert.role == UserRole::Subscriber.to_string()
            })
            .returning(move |insert| {
                let created = ProfileEntity {
                    id: insert.id,
                    email: insert.email.clone(),
                    full_name: insert.full_name.clone(),
                    role: insert.role.clone(),
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                };
                Box::pin(async move { Ok(created) })
            });

        email
            .expect_send_email()
            .withf(|to, subject, _| to == "new@example.com" && subject.contains("Welcome"))
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let usecase = usecase(profile_repo, MockIdentityGateway::new(), email);

        let created = usecase.me(&auth).await.unwrap();
        assert_eq!(created.role, UserRole::Subscriber.to_string());
    }

    #[tokio::test]
    async fn me_returns_existing_profile_without_welcome() {
        let auth = auth_user();
        let mut profile_repo = MockProfileRepository::new();

        let existing = profile(auth.user_id, "creator");
        profile_repo.expect_find_by_id().returning(move |_| {
            let existing = existing.clone();
            Box::pin(async move { Ok(Some(existing)) })
        });
        // No create/email expectations: a second /me call must not re-mirror.

        let usecase = usecase(
            profile_repo,
            MockIdentityGateway::new(),
            MockEmailGateway::new(),
        );

        let found = usecase.me(&auth).await.unwrap();
        assert_eq!(found.role, "creator");
    }

    #[tokio::test]
    async fn update_role_rejects_admin_self_assignment() {
        let auth = auth_user();
        let usecase = usecase(
            MockProfileRepository::new(),
            MockIdentityGateway::new(),
            MockEmailGateway::new(),
        );

        let result = usecase.update_role(&auth, "admin").await;
        assert!(matches!(result, Err(UserError::InvalidRole)));
    }

    #[tokio::test]
    async fn update_role_survives_metadata_cache_sync_failure() {
        let auth = auth_user();
        let mut profile_repo = MockProfileRepository::new();
        let mut identity = MockIdentityGateway::new();

        profile_repo
            .expect_update_role()
            .with(eq(auth.user_id), eq(UserRole::Creator))
            .returning(|_, _| Box::pin(async { Ok(1) }));

        identity
            .expect_update_user_role()
            .returning(|_, _| Box::pin(async { Err(anyhow!("supabase admin api down")) }));

        let usecase = usecase(profile_repo, identity, MockEmailGateway::new());

        usecase.update_role(&auth, "creator").await.unwrap();
    }
}
