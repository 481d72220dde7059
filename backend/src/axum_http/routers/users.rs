use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use crates::{
    domain::{
        repositories::{profiles::ProfileRepository, subscriptions::SubscriptionRepository},
        value_objects::{
            subscriptions::SubscriptionDetailDto,
            users::{ProfileDto, UpdateRoleModel},
        },
    },
    email::sendgrid_client::SendGridClient,
    identity::supabase_admin::SupabaseAdminClient,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{profiles::ProfilePostgres, subscriptions::SubscriptionPostgres},
    },
};
use serde_json::json;

use crate::auth::AuthUser;
use crate::axum_http::error_responses::error_response;
use crate::config::config_model::DotEnvyConfig;
use crate::usecases::{
    notifications::{EmailGateway, NotificationSender},
    users::{IdentityGateway, UserError, UserUseCase},
};

pub fn routes(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Router {
    let profile_repo = ProfilePostgres::new(Arc::clone(&db_pool));
    let subscription_repo = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let supabase_admin = Arc::new(SupabaseAdminClient::new(
        config.supabase.project_url.clone(),
        config.supabase.service_role_key.clone(),
    ));
    let sendgrid_client = Arc::new(SendGridClient::new(
        config.email.api_key.clone(),
        config.email.from_email.clone(),
    ));

    let users_usecase = UserUseCase::new(
        Arc::new(profile_repo),
        Arc::new(subscription_repo),
        supabase_admin,
        NotificationSender::new(sendgrid_client, config.slack.workspace_invite_url.clone()),
    );

    Router::new()
        .route("/me", get(me))
        .route("/role", patch(update_role))
        .route("/subscriptions", get(list_subscriptions))
        .with_state(Arc::new(users_usecase))
}

pub async fn me<P, S, I, E>(
    State(users_usecase): State<Arc<UserUseCase<P, S, I, E>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    P: ProfileRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    I: IdentityGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    match users_usecase.me(&auth).await {
        Ok(profile) => (
            StatusCode::OK,
            Json(json!({ "user": ProfileDto::from(profile) })),
        )
            .into_response(),
        Err(err) => error_response(err.status_code(), err),
    }
}

pub async fn update_role<P, S, I, E>(
    State(users_usecase): State<Arc<UserUseCase<P, S, I, E>>>,
    auth: AuthUser,
    Json(update_role_model): Json<UpdateRoleModel>,
) -> impl IntoResponse
where
    P: ProfileRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    I: IdentityGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    let role = match update_role_model.role {
        Some(role) => role,
        None => return error_response(StatusCode::BAD_REQUEST, UserError::InvalidRole),
    };

    match users_usecase.update_role(&auth, &role).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Role updated successfully" })),
        )
            .into_response(),
        Err(err) => error_response(err.status_code(), err),
    }
}

pub async fn list_subscriptions<P, S, I, E>(
    State(users_usecase): State<Arc<UserUseCase<P, S, I, E>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    P: ProfileRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    I: IdentityGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    match users_usecase.subscriptions(&auth).await {
        Ok(details) => {
            let subscriptions: Vec<SubscriptionDetailDto> =
                details.into_iter().map(SubscriptionDetailDto::from).collect();
            (
                StatusCode::OK,
                Json(json!({ "subscriptions": subscriptions })),
            )
                .into_response()
        }
        Err(err) => error_response(err.status_code(), err),
    }
}
