//! Process configuration, resolved once at startup.

use std::time::Duration;

use crate::infrastructure::gemini::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};

/// Placeholder key shipped in sample env files. Treated as "no key".
pub const DEMO_API_KEY: &str = "AIzaSyDEMO_KEY_REPLACE_WITH_REAL_KEY_FOR_FULL_FUNCTIONALITY";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SESSION_TTL_SECS: u64 = 7200;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub database_path: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub llm_timeout_secs: Option<u64>,
    pub mock_mode: bool,
    pub session_ttl: Duration,
    pub cors_allowed_origins: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let server_port = var("SERVER_PORT")
            .or_else(|| var("PORT"))
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let gemini_api_key = var("GEMINI_API_KEY");
        let mock_mode = match var("MOCK_MODE").as_deref().and_then(parse_bool) {
            Some(forced) => forced,
            None => key_requires_mock(gemini_api_key.as_deref()),
        };

        Self {
            server_host: var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port,
            database_path: var("DATABASE_PATH").unwrap_or_else(|| "memory_keeper.db".into()),
            gemini_api_key,
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
            gemini_base_url: var("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.into()),
            llm_timeout_secs: var("LLM_TIMEOUT_SECS").and_then(|s| s.parse().ok()),
            mock_mode,
            session_ttl: Duration::from_secs(
                var("SESSION_TTL_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SESSION_TTL_SECS),
            ),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS"),
        }
    }

    /// The key to call Gemini with, or `None` when the mock navigator serves.
    ///
    /// `MOCK_MODE=false` cannot make an unusable key live.
    pub fn live_api_key(&self) -> Option<&str> {
        if self.mock_mode {
            return None;
        }
        let key = self.gemini_api_key.as_deref();
        if key_requires_mock(key) {
            return None;
        }
        key
    }
}

/// Whether a credential is unusable and the mock navigator should be used.
pub fn key_requires_mock(key: Option<&str>) -> bool {
    match key.map(str::trim) {
        None | Some("") => true,
        Some(k) => k == DEMO_API_KEY || k.starts_with("placeholder"),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        let cfg = config(&[]);
        assert_eq!(cfg.server_host, "0.0.0.0");
        assert_eq!(cfg.server_port, 3000);
        assert_eq!(cfg.database_path, "memory_keeper.db");
        assert_eq!(cfg.gemini_model, "gemini-2.5-flash");
        assert_eq!(cfg.llm_timeout_secs, None);
        assert_eq!(cfg.session_ttl, Duration::from_secs(7200));
        assert!(cfg.cors_allowed_origins.is_none());
        assert!(cfg.mock_mode);
    }

    #[test]
    fn port_falls_back_to_port_var_then_default() {
        assert_eq!(config(&[("PORT", "8080")]).server_port, 8080);
        assert_eq!(
            config(&[("SERVER_PORT", "9000"), ("PORT", "8080")]).server_port,
            9000
        );
        assert_eq!(config(&[("SERVER_PORT", "not-a-port")]).server_port, 3000);
    }

    #[test]
    fn real_key_disables_mock_mode() {
        let cfg = config(&[("GEMINI_API_KEY", "AIzaSyRealLookingKey")]);
        assert!(!cfg.mock_mode);
        assert_eq!(cfg.gemini_api_key.as_deref(), Some("AIzaSyRealLookingKey"));
    }

    #[test]
    fn placeholder_keys_enable_mock_mode() {
        assert!(config(&[("GEMINI_API_KEY", DEMO_API_KEY)]).mock_mode);
        assert!(config(&[("GEMINI_API_KEY", "placeholder-key")]).mock_mode);
        assert!(config(&[("GEMINI_API_KEY", "   ")]).mock_mode);
    }

    #[test]
    fn mock_mode_override_wins() {
        assert!(config(&[("GEMINI_API_KEY", "real"), ("MOCK_MODE", "true")]).mock_mode);
        assert!(!config(&[("MOCK_MODE", "false")]).mock_mode);
        // unrecognised values fall back to key detection
        assert!(!config(&[("GEMINI_API_KEY", "real"), ("MOCK_MODE", "maybe")]).mock_mode);
    }

    #[test]
    fn live_key_requires_live_mode_and_usable_key() {
        let cfg = config(&[("GEMINI_API_KEY", "AIzaSyRealLookingKey")]);
        assert_eq!(cfg.live_api_key(), Some("AIzaSyRealLookingKey"));

        let forced_mock = config(&[("GEMINI_API_KEY", "AIzaSyRealLookingKey"), ("MOCK_MODE", "on")]);
        assert_eq!(forced_mock.live_api_key(), None);
    }

    #[test]
    fn forced_live_mode_with_placeholder_key_stays_mock() {
        for key in [DEMO_API_KEY, "placeholder-key"] {
            let cfg = config(&[("GEMINI_API_KEY", key), ("MOCK_MODE", "false")]);
            assert!(!cfg.mock_mode);
            assert_eq!(cfg.live_api_key(), None);
        }
        assert_eq!(config(&[("MOCK_MODE", "false")]).live_api_key(), None);
    }
}
