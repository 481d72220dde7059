use anyhow::{Result, anyhow};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

/// Minimal Slack Web API client built on reqwest.
///
/// The bot token needs the `channels:manage`, `channels:read`,
/// `users:read.email` and `chat:write` scopes.
pub struct SlackClient {
    http: reqwest::Client,
    bot_token: String,
    team_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackChannel {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct CreateChannelResponse {
    ok: bool,
    error: Option<String>,
    channel: Option<SlackChannel>,
}

#[derive(Debug, Deserialize)]
struct ListChannelsResponse {
    ok: bool,
    error: Option<String>,
    #[serde(default)]
    channels: Vec<SlackChannel>,
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupUserResponse {
    ok: bool,
    error: Option<String>,
    user: Option<SlackUser>,
}

#[derive(Debug, Deserialize)]
struct SlackUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AckResponse {
    ok: bool,
    error: Option<String>,
}

impl SlackClient {
    pub fn new(bot_token: String, team_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            bot_token,
            team_id,
        }
    }

    fn api_failure(context: &str, error: Option<&str>) -> anyhow::Error {
        error!(
            slack_error = ?error,
            context = %context,
            "slack api request failed"
        );
        anyhow!(
            "Slack API request failed: {} ({})",
            context,
            error.unwrap_or("unknown_error")
        )
    }

    /// Creates a public channel and returns it.
    pub async fn create_channel(&self, name: &str) -> Result<SlackChannel> {
        // https://api.slack.com/methods/conversations.create
        let resp = self
            .http
            .post("https://slack.com/api/conversations.create")
            .header(AUTHORIZATION, format!("Bearer {}", self.bot_token))
            .json(&json!({ "name": name, "is_private": false }))
            .send()
            .await?;

        let body: CreateChannelResponse = resp.json().await?;
        if !body.ok {
            return Err(Self::api_failure("create channel", body.error.as_deref()));
        }

        body.channel
            .ok_or_else(|| Self::api_failure("create channel", Some("missing channel in response")))
    }

    /// Sets the channel topic.
    pub async fn set_channel_topic(&self, channel_id: &str, topic: &str) -> Result<()> {
        // https://api.slack.com/methods/conversations.setTopic
        let resp = self
            .http
            .post("https://slack.com/api/conversations.setTopic")
            .header(AUTHORIZATION, format!("Bearer {}", self.bot_token))
            .json(&json!({ "channel": channel_id, "topic": topic }))
            .send()
            .await?;

        let body: AckResponse = resp.json().await?;
        if !body.ok {
            return Err(Self::api_failure("set channel topic", body.error.as_deref()));
        }

        Ok(())
    }

    /// Finds a non-archived public channel by exact name, walking pagination
    /// cursors until the workspace is exhausted.
    pub async fn find_channel_id_by_name(&self, name: &str) -> Result<Option<String>> {
        // https://api.slack.com/methods/conversations.list
        let mut cursor: Option<String> = None;

        loop {
            let mut query: Vec<(&str, String)> = vec![
                ("exclude_archived", "true".to_string()),
                ("types", "public_channel".to_string()),
                ("limit", "1000".to_string()),
            ];
            if let Some(cursor) = cursor.as_ref() {
                query.push(("cursor", cursor.clone()));
            }

            let resp = self
                .http
                .get("https://slack.com/api/conversations.list")
                .header(AUTHORIZATION, format!("Bearer {}", self.bot_token))
                .query(&query)
                .send()
                .await?;

            let body: ListChannelsResponse = resp.json().await?;
            if !body.ok {
                return Err(Self::api_failure("list channels", body.error.as_deref()));
            }

            if let Some(channel) = body.channels.into_iter().find(|c| c.name == name) {
                return Ok(Some(channel.id));
            }

            cursor = body
                .response_metadata
                .and_then(|meta| meta.next_cursor)
                .filter(|next| !next.is_empty());
            if cursor.is_none() {
                return Ok(None);
            }
        }
    }

    /// Resolves a workspace account id by email. Returns `None` when the
    /// provider reports no such user.
    pub async fn lookup_user_id_by_email(&self, email: &str) -> Result<Option<String>> {
        // https://api.slack.com/methods/users.lookupByEmail
        let resp = self
            .http
            .get("https://slack.com/api/users.lookupByEmail")
            .header(AUTHORIZATION, format!("Bearer {}", self.bot_token))
            .query(&[("email", email)])
            .send()
            .await?;

        let body: LookupUserResponse = resp.json().await?;
        if !body.ok {
            if body.error.as_deref() == Some("users_not_found") {
                return Ok(None);
            }
            return Err(Self::api_failure("lookup user by email", body.error.as_deref()));
        }

        Ok(body.user.map(|user| user.id))
    }

    /// Invites a workspace account to a channel.
    pub async fn invite_to_channel(&self, channel_id: &str, user_id: &str) -> Result<()> {
        // https://api.slack.com/methods/conversations.invite
        let resp = self
            .http
            .post("https://slack.com/api/conversations.invite")
            .header(AUTHORIZATION, format!("Bearer {}", self.bot_token))
            .json(&json!({ "channel": channel_id, "users": user_id }))
            .send()
            .await?;

        let body: AckResponse = resp.json().await?;
        if !body.ok {
            return Err(Self::api_failure("invite to channel", body.error.as_deref()));
        }

        Ok(())
    }

    /// Posts a message to a channel.
    pub async fn post_message(&self, channel_id: &str, text: &str) -> Result<()> {
        // https://api.slack.com/methods/chat.postMessage
        let resp = self
            .http
            .post("https://slack.com/api/chat.postMessage")
            .header(AUTHORIZATION, format!("Bearer {}", self.bot_token))
            .json(&json!({ "channel": channel_id, "text": text }))
            .send()
            .await?;

        let body: AckResponse = resp.json().await?;
        if !body.ok {
            return Err(Self::api_failure("post message", body.error.as_deref()));
        }

        Ok(())
    }

    /// Deep link into the workspace client for a channel.
    pub fn channel_url(&self, channel_id: &str) -> String {
        format!("https://app.slack.com/client/{}/{}", self.team_id, channel_id)
    }
}
