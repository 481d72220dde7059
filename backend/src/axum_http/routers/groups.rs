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
        repositories::{groups::GroupRepository, profiles::ProfileRepository},
        value_objects::groups::{
            GroupDetailDto, GroupDto, InsertGroupModel, InviteModel, UpdateGroupModel,
        },
    },
    email::sendgrid_client::SendGridClient,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{groups::GroupPostgres, profiles::ProfilePostgres},
    },
};
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::axum_http::error_responses::error_response;
use crate::config::config_model::DotEnvyConfig;
use crate::usecases::{
    channel_provisioning::ChatGateway,
    groups::{GroupError, GroupUseCase},
    invitations::InvitationDispatcher,
    notifications::{EmailGateway, NotificationSender},
};

pub fn routes(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Router {
    let group_repo = GroupPostgres::new(Arc::clone(&db_pool));
    let profile_repo = ProfilePostgres::new(Arc::clone(&db_pool));
    let slack_client = Arc::new(SlackClient::new(
        config.slack.bot_token.clone(),
        config.slack.team_id.clone(),
    ));
    let sendgrid_client = Arc::new(SendGridClient::new(
        config.email.api_key.clone(),
        config.email.from_email.clone(),
    ));

    let groups_usecase = GroupUseCase::new(
        Arc::new(group_repo),
        Arc::new(profile_repo),
        InvitationDispatcher::new(slack_client),
        NotificationSender::new(sendgrid_client, config.slack.workspace_invite_url.clone()),
    );

    Router::new()
        .route("/", get(list_groups).post(create_group))
        .route("/:id", get(get_group).patch(update_group))
        .route("/:id/invite", post(invite_member))
        .with_state(Arc::new(groups_usecase))
}

pub async fn list_groups<G, P, C, E>(
    State(groups_usecase): State<Arc<GroupUseCase<G, P, C, E>>>,
) -> impl IntoResponse
where
    G: GroupRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    C: ChatGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    match groups_usecase.list_active().await {
        Ok(details) => {
            let groups: Vec<GroupDetailDto> =
                details.into_iter().map(GroupDetailDto::from).collect();
            (StatusCode::OK, Json(json!({ "groups": groups }))).into_response()
        }
        Err(err) => error_response(err.status_code(), err),
    }
}

pub async fn get_group<G, P, C, E>(
    State(groups_usecase): State<Arc<GroupUseCase<G, P, C, E>>>,
    Path(group_id): Path<Uuid>,
) -> impl IntoResponse
where
    G: GroupRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    C: ChatGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    match groups_usecase.get(group_id).await {
        Ok(detail) => (
            StatusCode::OK,
            Json(json!({ "group": GroupDetailDto::from(detail) })),
        )
            .into_response(),
        Err(err) => error_response(err.status_code(), err),
    }
}

pub async fn create_group<G, P, C, E>(
    State(groups_usecase): State<Arc<GroupUseCase<G, P, C, E>>>,
    auth: AuthUser,
    Json(insert_group_model): Json<InsertGroupModel>,
) -> impl IntoResponse
where
    G: GroupRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    C: ChatGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    match groups_usecase.create(&auth, insert_group_model).await {
        Ok(group) => (
            StatusCode::CREATED,
            Json(json!({ "group": GroupDto::from(group) })),
        )
            .into_response(),
        Err(err) => error_response(err.status_code(), err),
    }
}

pub async fn update_group<G, P, C, E>(
    State(groups_usecase): State<Arc<GroupUseCase<G, P, C, E>>>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
    Json(update_group_model): Json<UpdateGroupModel>,
) -> impl IntoResponse
where
    G: GroupRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    C: ChatGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    match groups_usecase
        .update(&auth, group_id, update_group_model)
        .await
    {
        Ok(group) => (
            StatusCode::OK,
            Json(json!({ "group": GroupDto::from(group) })),
        )
            .into_response(),
        Err(err) => error_response(err.status_code(), err),
    }
}

pub async fn invite_member<G, P, C, E>(
    State(groups_usecase): State<Arc<GroupUseCase<G, P, C, E>>>,
    _auth: AuthUser,
    Path(group_id): Path<Uuid>,
    Json(invite_model): Json<InviteModel>,
) -> impl IntoResponse
where
    G: GroupRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    C: ChatGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    let email = invite_model.email.unwrap_or_default();
    if email.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, GroupError::MissingEmail);
    }

    match groups_usecase.invite(group_id, &email).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "message": "Slack invite sent successfully",
                "channel_invited": outcome.channel_invited,
                "warnings": outcome.warnings,
            })),
        )
            .into_response(),
        Err(err) => error_response(err.status_code(), err),
    }
}
