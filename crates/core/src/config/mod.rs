//! Application configuration with layered loading.
//!
//! Sources, highest precedence first:
//!
//! 1. Environment variables (KRISHI_*)
//! 2. TOML config file (if KRISHI_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend origin that serves pages, static assets and the API.
    ///
    /// Set via KRISHI_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to the SQLite database holding cache buckets and session storage.
    ///
    /// Set via KRISHI_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Version token naming the current cache bucket.
    ///
    /// Set via KRISHI_CACHE_VERSION environment variable. Bump it on every
    /// deployment that changes a precached asset.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Static asset paths fetched into the bucket at install time.
    #[serde(default = "default_precache_assets")]
    pub precache_assets: Vec<String>,

    /// Path prefixes that are never intercepted (authentication mutations).
    #[serde(default = "default_bypass_paths")]
    pub bypass_paths: Vec<String>,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via KRISHI_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via KRISHI_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Identifier of the tab session whose storage this process owns.
    ///
    /// Generated per process when unset.
    #[serde(default)]
    pub session_id: Option<String>,

    /// Seconds a session stays alive without renewing its lease. Storage of
    /// other sessions idle longer than this is purged at startup.
    ///
    /// Set via KRISHI_SESSION_LEASE_SECS environment variable.
    #[serde(default = "default_session_lease_secs")]
    pub session_lease_secs: u64,
}

fn default_origin() -> String {
    "http://127.0.0.1:5000".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./krishi-offline.sqlite")
}

fn default_cache_version() -> String {
    "smart-farmer-v3".into()
}

fn default_precache_assets() -> Vec<String> {
    [
        "/static/style.css",
        "/static/signup.css",
        "/static/app.js",
        "/static/manifest.json",
        "/static/1.png",
        "/static/icons/icon-144x144.png",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_bypass_paths() -> Vec<String> {
    vec!["/login".into(), "/signup".into()]
}

fn default_user_agent() -> String {
    "krishi-offline/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_session_lease_secs() -> u64 {
    120
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            db_path: default_db_path(),
            cache_version: default_cache_version(),
            precache_assets: default_precache_assets(),
            bypass_paths: default_bypass_paths(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            session_id: None,
            session_lease_secs: default_session_lease_secs(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Session lease length as Duration.
    pub fn session_lease(&self) -> Duration {
        Duration::from_secs(self.session_lease_secs)
    }

    /// The configured session id, or a fresh one derived from the current time.
    pub fn session_id(&self) -> String {
        self.session_id
            .clone()
            .unwrap_or_else(|| format!("session-{}", chrono::Utc::now().timestamp_millis()))
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("KRISHI_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("KRISHI_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.origin, "http://127.0.0.1:5000");
        assert_eq!(config.db_path, PathBuf::from("./krishi-offline.sqlite"));
        assert_eq!(config.cache_version, "smart-farmer-v3");
        assert_eq!(config.precache_assets.len(), 6);
        assert_eq!(config.bypass_paths, vec!["/login", "/signup"]);
        assert_eq!(config.timeout_ms, 20_000);
        assert!(config.session_id.is_none());
        assert_eq!(config.session_lease(), Duration::from_secs(120));
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_session_id_configured() {
        let config = AppConfig { session_id: Some("tab-1".into()), ..Default::default() };
        assert_eq!(config.session_id(), "tab-1");
    }

    #[test]
    fn test_session_id_generated() {
        let config = AppConfig::default();
        assert!(config.session_id().starts_with("session-"));
    }

    #[test]
    fn test_load_from_toml_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("krishi.toml", "cache_version = \"smart-farmer-v4\"\ntimeout_ms = 5000")?;
            jail.set_env("KRISHI_CONFIG_FILE", "krishi.toml");
            jail.set_env("KRISHI_TIMEOUT_MS", "7000");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.cache_version, "smart-farmer-v4");
            assert_eq!(config.timeout_ms, 7000);
            Ok(())
        });
    }
}
