#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub supabase: Supabase,
    pub slack: Slack,
    pub email: Email,
    pub checkout: Checkout,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Supabase {
    pub project_url: String,
    pub jwt_secret: String,
    pub service_role_key: String,
}

#[derive(Debug, Clone)]
pub struct Slack {
    pub bot_token: String,
    pub team_id: String,
    pub operator_email: String,
    pub workspace_invite_url: String,
}

#[derive(Debug, Clone)]
pub struct Email {
    pub api_key: String,
    pub from_email: String,
}

#[derive(Debug, Clone)]
pub struct Checkout {
    /// Activates subscriptions without payment verification. Never enable in
    /// production; exists for demo environments only.
    pub mock_enabled: bool,
}
