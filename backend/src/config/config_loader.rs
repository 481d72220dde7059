use anyhow::{Ok, Result};

use super::config_model::{
    BackendServer, Checkout, Database, DotEnvyConfig, Email, Slack, Supabase,
};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let supabase = Supabase {
        project_url: std::env::var("SUPABASE_PROJECT_URL")
            .expect("SUPABASE_PROJECT_URL is invalid"),
        jwt_secret: std::env::var("SUPABASE_JWT_SECRET").expect("SUPABASE_JWT_SECRET is invalid"),
        service_role_key: std::env::var("SUPABASE_SERVICE_ROLE_KEY")
            .expect("SUPABASE_SERVICE_ROLE_KEY is invalid"),
    };

    let slack = Slack {
        bot_token: std::env::var("SLACK_BOT_TOKEN").expect("SLACK_BOT_TOKEN is invalid"),
        team_id: std::env::var("SLACK_TEAM_ID").expect("SLACK_TEAM_ID is invalid"),
        operator_email: std::env::var("SLACK_OPERATOR_EMAIL")
            .unwrap_or_else(|_| "tech@joingroopie.com".to_string()),
        workspace_invite_url: std::env::var("SLACK_WORKSPACE_INVITE")
            .expect("SLACK_WORKSPACE_INVITE is invalid"),
    };

    let email = Email {
        api_key: std::env::var("SENDGRID_API_KEY").expect("SENDGRID_API_KEY is invalid"),
        from_email: std::env::var("SENDGRID_FROM_EMAIL")
            .unwrap_or_else(|_| "support@joingroopie.com".to_string()),
    };

    let checkout = Checkout {
        mock_enabled: std::env::var("MOCK_CHECKOUT_ENABLED")
            .map(|value| value == "true")
            .unwrap_or(false),
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        supabase,
        slack,
        email,
        checkout,
    })
}
