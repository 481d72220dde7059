use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::usecases::channel_provisioning::ChatGateway;

#[derive(Debug, Error)]
pub enum InvitationError {
    /// Expected whenever the invitee has not joined the workspace yet; the
    /// emailed invite link covers that case.
    #[error("User not found in chat workspace")]
    UserNotInWorkspace,
    #[error("Failed to invite user to chat channel")]
    InviteFailed(anyhow::Error),
}

/// Adds a known workspace member to a channel by email.
pub struct InvitationDispatcher<C>
where
    C: ChatGateway + Send + Sync + 'static,
{
    chat: Arc<C>,
}

impl<C> InvitationDispatcher<C>
where
    C: ChatGateway + Send + Sync + 'static,
{
    pub fn new(chat: Arc<C>) -> Self {
        Self { chat }
    }

    pub async fn invite_by_email(
        &self,
        channel_id: &str,
        email: &str,
    ) -> Result<(), InvitationError> {
        info!(channel_id, email, "invitations: resolving chat account");

        let user_id = match self.chat.lookup_user_id_by_email(email).await {
            Ok(Some(user_id)) => user_id,
            Ok(None) => {
                info!(
                    channel_id,
                    email, "invitations: no chat account for email yet"
                );
                return Err(InvitationError::UserNotInWorkspace);
            }
            Err(err) => {
                error!(
                    channel_id,
                    email,
                    error = ?err,
                    "invitations: account lookup failed"
                );
                return Err(InvitationError::InviteFailed(err));
            }
        };

        self.chat
            .invite_to_channel(channel_id, &user_id)
            .await
            .map_err(|err| {
                error!(
                    channel_id,
                    user_id = %user_id,
                    error = ?err,
                    "invitations: channel invite failed"
                );
                InvitationError::InviteFailed(err)
            })?;

        let text = format!("Welcome to the channel, <@{}>! 👋", user_id);
        if let Err(err) = self.chat.post_message(channel_id, &text).await {
            warn!(
                channel_id,
                user_id = %user_id,
                error = ?err,
                "invitations: failed to post welcome message"
            );
        }

        info!(channel_id, email, user_id = %user_id, "invitations: invite completed");

        Ok(())
    }
}
