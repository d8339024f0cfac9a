//! Configuration module for the TeamDesk backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Which persistence provider backs the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

/// Settings for the hosted text-generation API.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// API key; without one the offline generator is used
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub store: StoreBackend,
    /// Insert demo members and tasks into an empty store at startup
    pub seed_demo: bool,
    /// External auth id that is given the founder role on first login
    pub founder_user_id: Option<String>,
    /// Organization name used in task templates and prompts
    pub org_name: String,
    pub generation: GenerationConfig,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidFormat(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_psk = env::var("TEAMDESK_API_PSK").ok();

        let db_path = env::var("TEAMDESK_DB_PATH")
            .unwrap_or_else(|_| "./data/teamdesk.sqlite".to_string())
            .into();

        let bind_addr = env::var("TEAMDESK_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::InvalidFormat("TEAMDESK_BIND_ADDR must be host:port".to_string())
            })?;

        let log_level = env::var("TEAMDESK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let store = match env::var("TEAMDESK_STORE")
            .unwrap_or_else(|_| "sqlite".to_string())
            .to_lowercase()
            .as_str()
        {
            "sqlite" => StoreBackend::Sqlite,
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::InvalidFormat(format!(
                    "TEAMDESK_STORE must be sqlite or memory, got {}",
                    other
                )))
            }
        };

        let seed_demo = parse_bool("TEAMDESK_SEED_DEMO")?;

        let founder_user_id = env::var("TEAMDESK_FOUNDER_ID")
            .ok()
            .filter(|id| !id.trim().is_empty());

        let org_name =
            env::var("TEAMDESK_ORG_NAME").unwrap_or_else(|_| "our foundation".to_string());

        let generation = GenerationConfig {
            api_key: env::var("TEAMDESK_LLM_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            api_url: env::var("TEAMDESK_LLM_API_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com/v1/messages".to_string()),
            model: env::var("TEAMDESK_LLM_MODEL")
                .unwrap_or_else(|_| "claude-3-haiku-20240307".to_string()),
        };

        Ok(Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            store,
            seed_demo,
            founder_user_id,
            org_name,
            generation,
        })
    }
}

fn parse_bool(var: &str) -> Result<bool, ConfigError> {
    match env::var(var) {
        Err(_) => Ok(false),
        Ok(value) => match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(ConfigError::InvalidFormat(format!(
                "{} must be a boolean",
                var
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    // Tests in this module mutate process-wide environment variables.
    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const VARS: &[&str] = &[
        "TEAMDESK_API_PSK",
        "TEAMDESK_DB_PATH",
        "TEAMDESK_BIND_ADDR",
        "TEAMDESK_LOG_LEVEL",
        "TEAMDESK_STORE",
        "TEAMDESK_SEED_DEMO",
        "TEAMDESK_FOUNDER_ID",
        "TEAMDESK_ORG_NAME",
        "TEAMDESK_LLM_API_KEY",
        "TEAMDESK_LLM_API_URL",
        "TEAMDESK_LLM_MODEL",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let config = Config::from_env().unwrap();

        assert!(config.api_psk.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/teamdesk.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.store, StoreBackend::Sqlite);
        assert!(!config.seed_demo);
        assert!(config.founder_user_id.is_none());
        assert_eq!(config.org_name, "our foundation");
        assert!(config.generation.api_key.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        env::set_var("TEAMDESK_BIND_ADDR", "not-an-address");
        assert!(Config::from_env().is_err());
        env::remove_var("TEAMDESK_BIND_ADDR");

        env::set_var("TEAMDESK_STORE", "redis");
        assert!(Config::from_env().is_err());
        env::remove_var("TEAMDESK_STORE");

        env::set_var("TEAMDESK_SEED_DEMO", "maybe");
        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    fn test_memory_store_with_seed() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        env::set_var("TEAMDESK_STORE", "Memory");
        env::set_var("TEAMDESK_SEED_DEMO", "true");
        env::set_var("TEAMDESK_FOUNDER_ID", "founder-auth-1");

        let config = Config::from_env().unwrap();
        assert_eq!(config.store, StoreBackend::Memory);
        assert!(config.seed_demo);
        assert_eq!(config.founder_user_id.as_deref(), Some("founder-auth-1"));

        clear_env();
    }
}
