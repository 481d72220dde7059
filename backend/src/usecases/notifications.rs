use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use crates::email::sendgrid_client::SendGridClient;
use thiserror::Error;
use tracing::{error, info};

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait EmailGateway: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> AnyResult<()>;
}

#[async_trait]
impl EmailGateway for SendGridClient {
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> AnyResult<()> {
        self.send_email(to, subject, html).await
    }
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Failed to deliver email")]
    EmailDeliveryFailed(anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct EmailTemplate {
    pub subject: String,
    pub html: String,
}

fn welcome_template(recipient: &str) -> EmailTemplate {
    EmailTemplate {
        subject: "Welcome to Groopie! 🎉".to_string(),
        html: format!(
            "<h1>Welcome to Groopie!</h1>\
             <p>Hi {recipient},</p>\
             <p>Thank you for joining Groopie! We're excited to have you on board.</p>\
             <p>With Groopie, you can:</p>\
             <ul>\
               <li>Create and manage Slack communities</li>\
               <li>Set up subscription tiers</li>\
               <li>Connect with your audience</li>\
             </ul>\
             <p>Get started by creating your first group!</p>\
             <p>Best regards,<br>The Groopie Team</p>"
        ),
    }
}

fn group_approval_template(
    group_name: &str,
    channel_name: Option<&str>,
    workspace_invite_url: &str,
) -> EmailTemplate {
    let channel_line = match channel_name {
        Some(channel_name) => {
            format!("<li>Access your Slack channel \"#{channel_name}\"</li>")
        }
        None => "<li>Access your Slack channel</li>".to_string(),
    };

    EmailTemplate {
        subject: "Your Groopie Group Has Been Approved! 🎉".to_string(),
        html: format!(
            "<h1>Your Group Has Been Approved!</h1>\
             <p>Great news! Your group \"{group_name}\" has been approved and is now active.</p>\
             <p>You can now:</p>\
             <ul>\
               {channel_line}\
               <li>Invite members</li>\
               <li>Start building your community</li>\
             </ul>\
             <p><a href=\"{workspace_invite_url}\">Join the Slack workspace</a> if you haven't already.</p>\
             <p>Visit your group dashboard to get started!</p>\
             <p>Best regards,<br>The Groopie Team</p>"
        ),
    }
}

fn slack_invite_template(
    group_name: &str,
    channel_name: &str,
    workspace_invite_url: &str,
) -> EmailTemplate {
    EmailTemplate {
        subject: format!("Join {group_name} on Slack!"),
        html: format!(
            "<h1>Welcome to {group_name}! 🎉</h1>\
             <p>You've been invited to join the Slack channel for {group_name}.</p>\
             <h2>Next Steps:</h2>\
             <ol>\
               <li>Join our Slack workspace using this invite link:<br>\
                 <a href=\"{workspace_invite_url}\">Click here to join the workspace</a>\
               </li>\
               <li>Once you've joined the workspace, your group's channel \"#{channel_name}\" will be ready for you.</li>\
             </ol>\
             <p>If you have any questions or need assistance, please don't hesitate to contact us.</p>\
             <p>Best regards,<br>The Groopie Team</p>"
        ),
    }
}

/// Renders and sends the transactional mail kinds. Success or failure here
/// never decides a workflow's outcome; callers log and move on.
pub struct NotificationSender<E>
where
    E: EmailGateway + Send + Sync + 'static,
{
    email: Arc<E>,
    workspace_invite_url: String,
}

impl<E> NotificationSender<E>
where
    E: EmailGateway + Send + Sync + 'static,
{
    pub fn new(email: Arc<E>, workspace_invite_url: String) -> Self {
        Self {
            email,
            workspace_invite_url,
        }
    }

    pub async fn send_welcome(&self, to: &str) -> Result<(), NotificationError> {
        self.send(to, welcome_template(to)).await
    }

    pub async fn send_group_approval(
        &self,
        to: &str,
        group_name: &str,
        channel_name: Option<&str>,
    ) -> Result<(), NotificationError> {
        self.send(
            to,
            group_approval_template(group_name, channel_name, &self.workspace_invite_url),
        )
        .await
    }

    pub async fn send_slack_invite(
        &self,
        to: &str,
        group_name: &str,
        channel_name: &str,
    ) -> Result<(), NotificationError> {
        self.send(
            to,
            slack_invite_template(group_name, channel_name, &self.workspace_invite_url),
        )
        .await
    }

    async fn send(&self, to: &str, template: EmailTemplate) -> Result<(), NotificationError> {
        info!(to, subject = %template.subject, "notifications: sending email");

        self.email
            .send_email(to, &template.subject, &template.html)
            .await
            .map_err(|err| {
                error!(
                    to,
                    subject = %template.subject,
                    error = ?err,
                    "notifications: email delivery failed"
                );
                NotificationError::EmailDeliveryFailed(err)
            })?;

        info!(to, "notifications: email sent");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    const INVITE_URL: &str = "https://join.slack.com/t/groopie-workspace/shared_invite/zt-test";

    #[tokio::test]
    async fn slack_invite_carries_channel_and_workspace_link() {
        let mut email = MockEmailGateway::new();

        email
            .expect_send_email()
            .withf(|to, subject, html| {
                to == "member@example.com"
                    && subject == "Join TXKL Users on Slack!"
                    && html.contains("#txkl-users")
                    && html.contains(INVITE_URL)
            })
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let sender = NotificationSender::new(Arc::new(email), INVITE_URL.to_string());
        sender
            .send_slack_invite("member@example.com", "TXKL Users", "txkl-users")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn approval_notice_names_group_and_channel() {
        let mut email = MockEmailGateway::new();

        email
            .expect_send_email()
            .withf(|to, subject, html| {
                to == "creator@example.com"
                    && subject.contains("Approved")
                    && html.contains("\"TXKL Users\"")
                    && html.contains("#txkl-users")
                    && html.contains(INVITE_URL)
            })
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let sender = NotificationSender::new(Arc::new(email), INVITE_URL.to_string());
        sender
            .send_group_approval("creator@example.com", "TXKL Users", Some("txkl-users"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn provider_error_maps_to_delivery_failed() {
        let mut email = MockEmailGateway::new();

        email
            .expect_send_email()
            .returning(|_, _, _| Box::pin(async { Err(anyhow!("sendgrid 500")) }));

        let sender = NotificationSender::new(Arc::new(email), INVITE_URL.to_string());
        let result = sender.send_welcome("new@example.com").await;

        assert!(matches!(
            result,
            Err(NotificationError::EmailDeliveryFailed(_))
        ));
    }
}
