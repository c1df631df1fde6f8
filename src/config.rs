use std::env;
use std::time::Duration;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_AI_BASE_URL: &str = "https://oi-server.onrender.com";
const DEFAULT_AI_MODEL: &str = "replicate/black-forest-labs/flux-1.1-pro";
const DEFAULT_CACHE_SWEEP_SECS: u64 = 5 * 60;
const DEFAULT_STALE_SWEEP_SECS: u64 = 60 * 60;
const DEFAULT_REFRESH_AFTER_SECS: u64 = 30;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub customer_id: Option<String>,
    pub model: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_AI_BASE_URL.to_string(),
            api_key: None,
            customer_id: None,
            model: DEFAULT_AI_MODEL.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_address: String,
    pub generator: GeneratorConfig,
    pub cache_sweep_interval: Duration,
    pub stale_sweep_interval: Duration,
    pub refresh_after_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let secs = |key: &str, default: u64| {
            value(key)
                .and_then(|raw| raw.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(default)
        };

        let host = value("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = value("PORT")
            .and_then(|raw| raw.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let base_url = value("AI_API_BASE_URL")
            .map(|raw| raw.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_AI_BASE_URL.to_string());

        Self {
            bind_address: format!("{host}:{port}"),
            generator: GeneratorConfig {
                base_url,
                api_key: value("AI_API_KEY"),
                customer_id: value("AI_CUSTOMER_ID"),
                model: value("AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
            },
            cache_sweep_interval: Duration::from_secs(secs(
                "CACHE_SWEEP_SECS",
                DEFAULT_CACHE_SWEEP_SECS,
            )),
            stale_sweep_interval: Duration::from_secs(secs(
                "STALE_SWEEP_SECS",
                DEFAULT_STALE_SWEEP_SECS,
            )),
            refresh_after_secs: secs("REFRESH_AFTER_SECS", DEFAULT_REFRESH_AFTER_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config(&[]);
        assert_eq!(config.bind_address, "0.0.0.0:3000");
        assert_eq!(config.generator, GeneratorConfig::default());
        assert_eq!(config.cache_sweep_interval, Duration::from_secs(300));
        assert_eq!(config.stale_sweep_interval, Duration::from_secs(3600));
        assert_eq!(config.refresh_after_secs, 30);
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("AI_API_BASE_URL", "https://ai.example.com/v1/"),
            ("AI_API_KEY", " secret "),
            ("AI_CUSTOMER_ID", "cus_1"),
            ("AI_MODEL", "flux"),
            ("CACHE_SWEEP_SECS", "60"),
        ]);
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.generator.base_url, "https://ai.example.com/v1");
        assert_eq!(config.generator.api_key.as_deref(), Some("secret"));
        assert_eq!(config.generator.customer_id.as_deref(), Some("cus_1"));
        assert_eq!(config.generator.model, "flux");
        assert_eq!(config.cache_sweep_interval, Duration::from_secs(60));
    }

    #[test]
    fn blank_and_invalid_values_fall_back() {
        let config = config(&[
            ("PORT", "not-a-port"),
            ("AI_API_KEY", "   "),
            ("STALE_SWEEP_SECS", "0"),
        ]);
        assert_eq!(config.bind_address, "0.0.0.0:3000");
        assert!(config.generator.api_key.is_none());
        assert_eq!(config.stale_sweep_interval, Duration::from_secs(3600));
    }
}
