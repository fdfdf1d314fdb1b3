use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::chat::{ChatModel, GeminiClient};
use crate::config::AppConfig;
use crate::database::{AuthProvider, RowStore, SupabaseClient};
use crate::error::ApiError;
use crate::investease::{InvestEaseClient, InvestEaseError, InvestEaseProxy};

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

pub const SUPABASE_NOT_CONFIGURED: &str =
    "Supabase not configured. Set SUPABASE_URL and SUPABASE_ANON_KEY in environment.";
pub const GEMINI_NOT_CONFIGURED: &str = "Missing GOOGLE_API_KEY/GEMINI_API_KEY in environment";

/// Everything a handler needs, built once at startup and shared read-only
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    rows: Option<Arc<dyn RowStore>>,
    auth: Option<Arc<dyn AuthProvider>>,
    chat: Option<Arc<dyn ChatModel>>,
    investease: Arc<InvestEaseProxy>,
}

impl AppState {
    /// State with no providers wired and a token-less proxy
    pub fn new(config: AppConfig) -> Result<Self, InvestEaseError> {
        let investease = InvestEaseProxy::new(
            &config.investease.base_url,
            config.investease.token.clone(),
            Duration::from_secs(config.investease.timeout_secs),
        )?;
        Ok(Self {
            config: Arc::new(config),
            rows: None,
            auth: None,
            chat: None,
            investease: Arc::new(investease),
        })
    }

    /// Wire the real upstream clients for whatever credentials are configured
    pub async fn from_config(mut config: AppConfig) -> anyhow::Result<Self> {
        if config.investease.token.is_none() {
            config.investease.token = register_team(&config).await;
        }

        let mut state = Self::new(config)?;

        match state.config.supabase.credentials() {
            Some((url, key)) => {
                let client = Arc::new(SupabaseClient::new(url, key, UPSTREAM_TIMEOUT)?);
                info!(url, "supabase configured");
                state.rows = Some(client.clone());
                state.auth = Some(client);
            }
            None => warn!("supabase not configured; profile and table routes will return 500"),
        }

        match state.config.gemini.api_key.as_deref() {
            Some(key) => {
                let client = GeminiClient::new(&state.config.gemini.base_url, key, UPSTREAM_TIMEOUT)?;
                info!(model = %state.config.gemini.default_model, "gemini configured");
                state.chat = Some(Arc::new(client));
            }
            None => warn!("gemini not configured; chat and learn routes will return 500"),
        }

        if !state.investease.has_token() {
            warn!("investease token not configured; proxy will return 500");
        }

        Ok(state)
    }

    pub fn with_rows(mut self, rows: Arc<dyn RowStore>) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn with_auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_chat(mut self, chat: Arc<dyn ChatModel>) -> Self {
        self.chat = Some(chat);
        self
    }

    pub fn with_investease(mut self, proxy: InvestEaseProxy) -> Self {
        self.investease = Arc::new(proxy);
        self
    }

    pub fn rows(&self) -> Result<&dyn RowStore, ApiError> {
        self.rows
            .as_deref()
            .ok_or_else(|| ApiError::internal_server_error(SUPABASE_NOT_CONFIGURED))
    }

    pub fn auth(&self) -> Result<&dyn AuthProvider, ApiError> {
        self.auth
            .as_deref()
            .ok_or_else(|| ApiError::internal_server_error(SUPABASE_NOT_CONFIGURED))
    }

    pub fn chat(&self) -> Result<Arc<dyn ChatModel>, ApiError> {
        self.chat
            .clone()
            .ok_or_else(|| ApiError::internal_server_error(GEMINI_NOT_CONFIGURED))
    }

    pub fn investease(&self) -> &InvestEaseProxy {
        &self.investease
    }
}

/// One-time sandbox registration when a team is configured but no token is
async fn register_team(config: &AppConfig) -> Option<String> {
    let team = config.investease.team_name.as_deref()?;
    let email = config.investease.contact_email.as_deref()?;

    let client = match InvestEaseClient::new(
        &config.investease.base_url,
        None,
        Duration::from_secs(config.investease.timeout_secs),
    ) {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "investease client setup failed");
            return None;
        }
    };

    match client.register(team, email).await {
        Ok(body) => match body.get("jwtToken").and_then(Value::as_str) {
            Some(token) => {
                info!(team, "investease team registered");
                Some(token.to_string())
            }
            None => {
                warn!(team, "investease registration returned no jwtToken");
                None
            }
        },
        Err(e) => {
            warn!(team, error = %e, "investease team registration failed");
            None
        }
    }
}
