use thiserror::Error;

/// Crate-level constants
pub const APP_NAME: &str = "report-composer";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Env overrides for `EngineConfig::from_env()`.
pub const ENV_MAX_CONCURRENCY: &str = "REPORT_ENGINE_MAX_CONCURRENCY";
pub const ENV_MODULE_TIMEOUT_SECS: &str = "REPORT_ENGINE_MODULE_TIMEOUT_SECS";
pub const ENV_PROVIDER_URL: &str = "REPORT_ENGINE_PROVIDER_URL";
pub const ENV_PROVIDER_MODEL: &str = "REPORT_ENGINE_PROVIDER_MODEL";
pub const ENV_CREDIT_LIMIT: &str = "REPORT_ENGINE_CREDIT_LIMIT";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "report_composer=info"
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Runtime settings for the composition engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Upper bound on AI modules running at once within one batch.
    pub max_concurrency: usize,
    /// Per-module run timeout.
    pub module_timeout_secs: u64,
    pub provider_base_url: String,
    pub provider_model: String,
    pub provider_timeout_secs: u64,
    /// Org AI-credit ceiling. `None` = unmetered.
    pub credit_limit: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            module_timeout_secs: 45,
            provider_base_url: "http://localhost:11434".into(),
            provider_model: "llama3.1".into(),
            provider_timeout_secs: 60,
            credit_limit: None,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `REPORT_ENGINE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_MAX_CONCURRENCY) {
            config.max_concurrency = parse_number::<usize>(ENV_MAX_CONCURRENCY, &raw)?.max(1);
        }
        if let Some(raw) = lookup(ENV_MODULE_TIMEOUT_SECS) {
            config.module_timeout_secs = parse_number(ENV_MODULE_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_PROVIDER_URL) {
            let url = raw.trim();
            if url.is_empty() {
                return Err(ConfigError::InvalidValue {
                    var: ENV_PROVIDER_URL,
                    value: raw,
                });
            }
            config.provider_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup(ENV_PROVIDER_MODEL) {
            if !raw.trim().is_empty() {
                config.provider_model = raw.trim().to_string();
            }
        }
        if let Some(raw) = lookup(ENV_CREDIT_LIMIT) {
            config.credit_limit = Some(parse_number(ENV_CREDIT_LIMIT, &raw)?);
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = EngineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_concurrency, 4);
        assert!(config.credit_limit.is_none());
    }

    #[test]
    fn env_overrides_applied() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            (ENV_MAX_CONCURRENCY, "8"),
            (ENV_MODULE_TIMEOUT_SECS, " 10 "),
            (ENV_PROVIDER_URL, "http://ai.internal:9000/"),
            (ENV_PROVIDER_MODEL, "qwen2.5"),
            (ENV_CREDIT_LIMIT, "500"),
        ]))
        .unwrap();

        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.module_timeout_secs, 10);
        assert_eq!(config.provider_base_url, "http://ai.internal:9000");
        assert_eq!(config.provider_model, "qwen2.5");
        assert_eq!(config.credit_limit, Some(500));
    }

    #[test]
    fn zero_concurrency_clamped_to_one() {
        let config =
            EngineConfig::from_lookup(lookup_from(&[(ENV_MAX_CONCURRENCY, "0")])).unwrap();
        assert_eq!(config.max_concurrency, 1);
    }

    #[test]
    fn invalid_number_rejected() {
        let err = EngineConfig::from_lookup(lookup_from(&[(ENV_CREDIT_LIMIT, "lots")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: ENV_CREDIT_LIMIT,
                value: "lots".into()
            }
        );
    }

    #[test]
    fn blank_provider_url_rejected() {
        assert!(EngineConfig::from_lookup(lookup_from(&[(ENV_PROVIDER_URL, "  ")])).is_err());
    }

    #[test]
    fn app_name_is_report_composer() {
        assert_eq!(APP_NAME, "report-composer");
    }
}
