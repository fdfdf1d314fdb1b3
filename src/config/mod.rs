use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_INVESTEASE_BASE_URL: &str =
    "https://2dcq63co40.execute-api.us-east-1.amazonaws.com/dev";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub supabase: SupabaseConfig,
    pub gemini: GeminiConfig,
    pub investease: InvestEaseConfig,
    pub security: SecurityConfig,
    pub tables: TableConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Default `RUST_LOG` directive when the variable is unset
    pub log_filter: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
}

impl SupabaseConfig {
    /// Both halves of the credential pair, or nothing
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.url.as_deref(), self.anon_key.as_deref()) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => Some((url, key)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: String,
    pub learn_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestEaseConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub team_name: Option<String>,
    pub contact_email: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableConfig {
    /// Empty means every table is reachable through /sb/*
    pub allowed: Vec<String>,
}

impl TableConfig {
    pub fn is_allowed(&self, table: &str) -> bool {
        self.allowed.is_empty() || self.allowed.iter().any(|t| t == table)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("BFF_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("BFF_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Supabase
        self.supabase.url = non_empty_var("SUPABASE_URL");
        self.supabase.anon_key = non_empty_var("SUPABASE_ANON_KEY");

        // Gemini: either key name is accepted
        self.gemini.api_key = non_empty_var("GEMINI_API_KEY").or_else(|| non_empty_var("GOOGLE_API_KEY"));
        if let Some(v) = non_empty_var("GEMINI_BASE_URL") {
            self.gemini.base_url = v;
        }
        if let Some(v) = non_empty_var("GEMINI_MODEL") {
            self.gemini.default_model = v;
        }
        if let Some(v) = non_empty_var("LEARN_MODEL") {
            self.gemini.learn_model = v;
        }

        // InvestEase sandbox
        if let Some(v) = non_empty_var("INVESTEASE_BASE_URL") {
            self.investease.base_url = v;
        }
        self.investease.token = non_empty_var("INVESTEASE_TOKEN");
        self.investease.team_name = non_empty_var("INVESTEASE_TEAM_NAME");
        self.investease.contact_email = non_empty_var("INVESTEASE_CONTACT_EMAIL");
        if let Ok(v) = env::var("INVESTEASE_TIMEOUT_SECS") {
            self.investease.timeout_secs = v.parse().unwrap_or(self.investease.timeout_secs);
        }

        // Security / table overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }
        if let Ok(v) = env::var("SB_ALLOWED_TABLES") {
            self.tables.allowed = split_list(&v);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                log_filter: "honk_bff=debug,tower_http=debug".to_string(),
            },
            supabase: SupabaseConfig::default(),
            gemini: GeminiConfig::default(),
            investease: InvestEaseConfig::default(),
            security: SecurityConfig {
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5432".to_string(),
                    "http://localhost:8000".to_string(),
                    "https://v2webhonkonomics.vercel.app".to_string(),
                ],
            },
            tables: TableConfig::default(),
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                log_filter: "honk_bff=info,tower_http=info".to_string(),
            },
            supabase: SupabaseConfig::default(),
            gemini: GeminiConfig::default(),
            investease: InvestEaseConfig::default(),
            security: SecurityConfig {
                cors_origins: vec!["https://v2webhonkonomics.vercel.app".to_string()],
            },
            tables: TableConfig::default(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            default_model: "gemini-2.5-flash".to_string(),
            learn_model: "gemini-1.5-flash".to_string(),
        }
    }
}

impl Default for InvestEaseConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_INVESTEASE_BASE_URL.to_string(),
            token: None,
            team_name: None,
            contact_email: None,
            timeout_secs: 30,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 8000);
        assert!(config.security.cors_origins.contains(&"http://localhost:3000".to_string()));
        assert!(config.supabase.credentials().is_none());
        assert_eq!(config.investease.timeout_secs, 30);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.security.cors_origins, vec!["https://v2webhonkonomics.vercel.app"]);
        assert_eq!(config.gemini.default_model, "gemini-2.5-flash");
    }

    #[test]
    fn test_split_list_drops_blanks() {
        assert_eq!(split_list(" profiles, ,lessons ,"), vec!["profiles", "lessons"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_empty_allowlist_is_unrestricted() {
        let mut tables = TableConfig::default();
        assert!(tables.is_allowed("anything"));
        tables.allowed = vec!["profiles".to_string()];
        assert!(tables.is_allowed("profiles"));
        assert!(!tables.is_allowed("secrets"));
    }

    #[test]
    fn test_supabase_credentials_need_both_halves() {
        let config = SupabaseConfig {
            url: Some("https://example.supabase.co".to_string()),
            anon_key: None,
        };
        assert!(config.credentials().is_none());

        let config = SupabaseConfig {
            url: Some("https://example.supabase.co".to_string()),
            anon_key: Some("anon".to_string()),
        };
        assert_eq!(config.credentials(), Some(("https://example.supabase.co", "anon")));
    }
}
