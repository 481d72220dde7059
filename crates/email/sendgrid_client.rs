use anyhow::Result;
use reqwest::header::AUTHORIZATION;
use serde_json::json;
use tracing::error;

/// Minimal SendGrid v3 client built on reqwest.
pub struct SendGridClient {
    http: reqwest::Client,
    api_key: String,
    from_email: String,
}

impl SendGridClient {
    pub fn new(api_key: String, from_email: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            from_email,
        }
    }

    /// Sends a single HTML email. SendGrid answers 202 on acceptance.
    pub async fn send_email(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        // https://docs.sendgrid.com/api-reference/mail-send/mail-send
        let body = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.from_email },
            "subject": subject,
            "content": [{ "type": "text/html", "value": html }],
        });

        let resp = self
            .http
            .post("https://api.sendgrid.com/v3/mail/send")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
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
            to = %to,
            subject = %subject,
            response_body = %response_body,
            "sendgrid api request failed"
        );

        anyhow::bail!("SendGrid API request failed (status {})", status);
    }
}
