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
        value_objects::groups::{GroupDetailDto, RejectModel},
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
    channel_provisioning::{ChannelProvisioner, ChatGateway},
    group_approval::GroupApprovalWorkflow,
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

    let approval_workflow = GroupApprovalWorkflow::new(
        Arc::new(group_repo),
        Arc::new(profile_repo),
        ChannelProvisioner::new(slack_client, config.slack.operator_email.clone()),
        NotificationSender::new(sendgrid_client, config.slack.workspace_invite_url.clone()),
    );

    Router::new()
        .route("/pending", get(list_pending_groups))
        .route("/:id/approve", post(approve_group))
        .route("/:id/reject", post(reject_group))
        .route("/:id/reactivate", post(reactivate_group))
        .with_state(Arc::new(approval_workflow))
}

pub async fn list_pending_groups<G, P, C, E>(
    State(approval_workflow): State<Arc<GroupApprovalWorkflow<G, P, C, E>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    G: GroupRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    C: ChatGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    match approval_workflow.list_pending(&auth).await {
        Ok(details) => {
            let groups: Vec<GroupDetailDto> =
                details.into_iter().map(GroupDetailDto::from).collect();
            (StatusCode::OK, Json(json!({ "groups": groups }))).into_response()
        }
        Err(err) => error_response(err.status_code(), err),
    }
}

pub async fn approve_group<G, P, C, E>(
    State(approval_workflow): State<Arc<GroupApprovalWorkflow<G, P, C, E>>>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
) -> impl IntoResponse
where
    G: GroupRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    C: ChatGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    match approval_workflow.approve(&auth, group_id).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "message": "Group approved successfully",
                "status": outcome.status,
                "channel": outcome.channel,
                "warnings": outcome.warnings,
            })),
        )
            .into_response(),
        Err(err) => error_response(err.status_code(), err),
    }
}

pub async fn reject_group<G, P, C, E>(
    State(approval_workflow): State<Arc<GroupApprovalWorkflow<G, P, C, E>>>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
    reject_model: Option<Json<RejectModel>>,
) -> impl IntoResponse
where
    G: GroupRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    C: ChatGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    let reason = reject_model.and_then(|Json(model)| model.reason);

    match approval_workflow
        .reject(&auth, group_id, reason.as_deref())
        .await
    {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "Group rejected" }))).into_response(),
        Err(err) => error_response(err.status_code(), err),
    }
}

pub async fn reactivate_group<G, P, C, E>(
    State(approval_workflow): State<Arc<GroupApprovalWorkflow<G, P, C, E>>>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
) -> impl IntoResponse
where
    G: GroupRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    C: ChatGateway + Send + Sync + 'static,
    E: EmailGateway + Send + Sync + 'static,
{
    match approval_workflow.reactivate(&auth, group_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Group reactivated" })),
        )
            .into_response(),
        Err(err) => error_response(err.status_code(), err),
    }
}
