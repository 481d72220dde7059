use anyhow::Result;
use reqwest::header::AUTHORIZATION;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

/// Minimal Supabase GoTrue admin client built on reqwest.
///
/// Only the user-metadata role cache is written through here; the mirrored
/// `profiles` row stays the authoritative role store.
pub struct SupabaseAdminClient {
    http: reqwest::Client,
    project_url: String,
    service_role_key: String,
}

impl SupabaseAdminClient {
    pub fn new(project_url: String, service_role_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            project_url: project_url.trim_end_matches('/').to_string(),
            service_role_key,
        }
    }

    /// Rewrites `user_metadata.role` for an account.
    pub async fn update_user_role(&self, user_id: Uuid, role: &str) -> Result<()> {
        // https://supabase.com/docs/reference/auth/admin-api
        let resp = self
            .http
            .put(format!("{}/auth/v1/admin/users/{}", self.project_url, user_id))
            .header(AUTHORIZATION, format!("Bearer {}", self.service_role_key))
            .header("apikey", &self.service_role_key)
            .json(&json!({ "user_metadata": { "role": role } }))
            .send()
            .await?;

        if resp.status().is_success() {
            return Ok(());
        }

        let status = resp.status();
        let response_body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        error!(
            status = %status,
            %user_id,
            response_body = %response_body,
            "supabase admin api request failed"
        );

        anyhow::bail!("Supabase admin API request failed (status {})", status);
    }
}
