use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use crates::chat::slack_client::SlackClient;
use crates::domain::value_objects::channel_names::normalize_channel_name;
use thiserror::Error;
use tracing::{error, info, warn};

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ChatGateway: Send + Sync {
    async fn find_channel_id_by_name(&self, name: &str) -> AnyResult<Option<String>>;

    async fn create_channel(&self, name: &str) -> AnyResult<String>;

    async fn set_channel_topic(&self, channel_id: &str, topic: &str) -> AnyResult<()>;

    async fn lookup_user_id_by_email(&self, email: &str) -> AnyResult<Option<String>>;

    async fn invite_to_channel(&self, channel_id: &str, user_id: &str) -> AnyResult<()>;

    async fn post_message(&self, channel_id: &str, text: &str) -> AnyResult<()>;

    fn channel_url(&self, channel_id: &str) -> String;
}

#[async_trait]
impl ChatGateway for SlackClient {
    async fn find_channel_id_by_name(&self, name: &str) -> AnyResult<Option<String>> {
        self.find_channel_id_by_name(name).await
    }

    async fn create_channel(&self, name: &str) -> AnyResult<String> {
        let channel = self.create_channel(name).await?;
        Ok(channel.id)
    }

    async fn set_channel_topic(&self, channel_id: &str, topic: &str) -> AnyResult<()> {
        self.set_channel_topic(channel_id, topic).await
    }

    async fn lookup_user_id_by_email(&self, email: &str) -> AnyResult<Option<String>> {
        self.lookup_user_id_by_email(email).await
    }

    async fn invite_to_channel(&self, channel_id: &str, user_id: &str) -> AnyResult<()> {
        self.invite_to_channel(channel_id, user_id).await
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> AnyResult<()> {
        self.post_message(channel_id, text).await
    }

    fn channel_url(&self, channel_id: &str) -> String {
        self.channel_url(channel_id)
    }
}

#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("Failed to create chat channel")]
    ChannelCreationFailed(anyhow::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionedChannel {
    pub channel_id: String,
    pub channel_name: String,
    pub channel_url: String,
}

/// Finds or creates the chat channel backing a group. Only the create call
/// itself is fatal; topic and operator-invite enrichment degrade to warnings.
pub struct ChannelProvisioner<C>
where
    C: ChatGateway + Send + Sync + 'static,
{
    chat: Arc<C>,
    operator_email: String,
}

impl<C> ChannelProvisioner<C>
where
    C: ChatGateway + Send + Sync + 'static,
{
    pub fn new(chat: Arc<C>, operator_email: String) -> Self {
        Self {
            chat,
            operator_email,
        }
    }

    pub async fn ensure_channel(
        &self,
        group_name: &str,
    ) -> Result<ProvisionedChannel, ProvisioningError> {
        let channel_name = normalize_channel_name(group_name);
        info!(
            group_name,
            channel_name = %channel_name,
            "provisioning: ensuring chat channel"
        );

        match self.chat.find_channel_id_by_name(&channel_name).await {
            Ok(Some(channel_id)) => {
                info!(
                    %channel_id,
                    channel_name = %channel_name,
                    "provisioning: reusing existing channel"
                );
                return Ok(ProvisionedChannel {
                    channel_url: self.chat.channel_url(&channel_id),
                    channel_id,
                    channel_name,
                });
            }
            Ok(None) => {
                info!(
                    channel_name = %channel_name,
                    "provisioning: no existing channel, creating"
                );
            }
            Err(err) => {
                // A failed lookup is treated like a miss and falls through to create.
                warn!(
                    channel_name = %channel_name,
                    error = ?err,
                    "provisioning: channel lookup failed, attempting create"
                );
            }
        }

        let channel_id = self
            .chat
            .create_channel(&channel_name)
            .await
            .map_err(|err| {
                error!(
                    group_name,
                    channel_name = %channel_name,
                    error = ?err,
                    "provisioning: channel creation failed"
                );
                ProvisioningError::ChannelCreationFailed(err)
            })?;

        info!(%channel_id, channel_name = %channel_name, "provisioning: channel created");

        let topic = format!("Groopie community channel for {}", group_name);
        if let Err(err) = self.chat.set_channel_topic(&channel_id, &topic).await {
            warn!(
                %channel_id,
                error = ?err,
                "provisioning: failed to set channel topic"
            );
        }

        self.invite_operator(&channel_id).await;

        Ok(ProvisionedChannel {
            channel_url: self.chat.channel_url(&channel_id),
            channel_id,
            channel_name,
        })
    }

    async fn invite_operator(&self, channel_id: &str) {
        match self
            .chat
            .lookup_user_id_by_email(&self.operator_email)
            .await
        {
            Ok(Some(operator_id)) => {
                if let Err(err) = self.chat.invite_to_channel(channel_id, &operator_id).await {
                    warn!(
                        %channel_id,
                        operator_id = %operator_id,
                        error = ?err,
                        "provisioning: failed to invite operator account"
                    );
                }
            }
            Ok(None) => {
                warn!(
                    %channel_id,
                    operator_email = %self.operator_email,
                    "provisioning: operator account not found in workspace"
                );
            }
            Err(err) => {
                warn!(
                    %channel_id,
                    operator_email = %self.operator_email,
                    error = ?err,
                    "provisioning: operator lookup failed"
                );
            }
        }
    }
}
