use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    chat::slack_client::SlackClient,
    domain::{
        repositories::{
            plans::PlanRepository, profiles::ProfileRepository,
            subscriptions::SubscriptionRepository,
        },
        value_objects::subscriptions::{
            SubscribeModel, SubscriptionDetailDto, SubscriptionDto,
        },
    },
    email::sendgrid_client::SendGridClient,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            plans::PlanPostgres, profiles::ProfilePostgres,
            subscriptions::SubscriptionPostgres,
        },
    },
};
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::axum_http::error_responses::error_response;
use crate::config::config_model::DotEnvyConfig;
use crate::usecases::{
    channel_provisioning::ChatGateway,
    invitations::InvitationDispatcher,
    notifications::{EmailGateway, NotificationSender},
    subscriptions::SubscriptionUseCase,
};

pub fn routes(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Router {
    let subscription_repo = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let plan_repo = PlanPostgres::new(Arc::clone(&db_pool));
    let profile_repo = ProfilePostgres::new(Arc::clone(&db_pool));
    let slack_client = Arc::new(SlackClient::new(
        config.slack.bot_token.clone(),
        config.slack.team_id.clone(),
    ));
    let sendgrid_client = Arc::new(SendGridClient::new(
        config.email.api_key.clone(),
        config.email.from_email.clone(),
    ));

    let subscriptions_usecase = SubscriptionUseCase::new(
        Arc::new(subscription_repo),
        Arc::new(plan_repo),
        Arc::new(profile_repo),
        InvitationDispatcher::new(slack_client),
        NotificationSender::new(sendgrid_client, config.slack.workspace_invite_url.clone()),
        config.checkout.mock_enabled,
    );

    Router::new()
        .route("/", post(subscribe))
        .route("/:id", get(get_subscription))
        .route("/:id/cancel", post(cancel_subscription))
        .route("/:id/activate", post(activate_subscription))
        .with_state(Arc::new(subscriptions_usecase))
}

pub async fn subscribe<S, P, Pr, C, E>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<S, P, Pr, C, E>>>,
    auth: AuthUser,
    Json(subscribe_model): Json<SubscribeModel>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    Pr: ProfileRepository + Send + Sync + 'static,
    C: ChatGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    match subscriptions_usecase
        .subscribe(&auth, subscribe_model.plan_id)
        .await
    {
        Ok(subscription) => (
            StatusCode::CREATED,
            Json(json!({ "subscription": SubscriptionDto::from(subscription) })),
        )
            .into_response(),
        Err(err) => error_response(err.status_code(), err),
    }
}

pub async fn get_subscription<S, P, Pr, C, E>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<S, P, Pr, C, E>>>,
    auth: AuthUser,
    Path(subscription_id): Path<Uuid>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    Pr: ProfileRepository + Send + Sync + 'static,
    C: ChatGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    match subscriptions_usecase.get(&auth, subscription_id).await {
        Ok(detail) => (
            StatusCode::OK,
            Json(json!({ "subscription": SubscriptionDetailDto::from(detail) })),
        )
            .into_response(),
        Err(err) => error_response(err.status_code(), err),
    }
}

pub async fn cancel_subscription<S, P, Pr, C, E>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<S, P, Pr, C, E>>>,
    auth: AuthUser,
    Path(subscription_id): Path<Uuid>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    Pr: ProfileRepository + Send + Sync + 'static,
    C: ChatGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    match subscriptions_usecase.cancel(&auth, subscription_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Subscription canceled successfully" })),
        )
            .into_response(),
        Err(err) => error_response(err.status_code(), err),
    }
}

pub async fn activate_subscription<S, P, Pr, C, E>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<S, P, Pr, C, E>>>,
    auth: AuthUser,
    Path(subscription_id): Path<Uuid>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    Pr: ProfileRepository + Send + Sync + 'static,
    C: ChatGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    match subscriptions_usecase.activate(&auth, subscription_id).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "message": "Subscription activated",
                "status": outcome.status,
                "warnings": outcome.warnings,
            })),
        )
            .into_response(),
        Err(err) => error_response(err.status_code(), err),
    }
}
