use std::path::PathBuf;

use crate::app_config::{AppConfig, SourceQuotas, DEFAULT_USER_AGENT};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build configuration using the provided env-var lookup function, so parsing
/// and validation can be tested against a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = AppConfig::default();

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: u32| -> Result<u32, ConfigError> {
        match optional(var) {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        }
    };

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match optional(var) {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        }
    };

    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        match optional(var) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                }),
        }
    };

    let storage_root = PathBuf::from(or_default(
        "VIRALIMG_STORAGE_ROOT",
        &defaults.storage_root.display().to_string(),
    ));
    let log_level = or_default("VIRALIMG_LOG_LEVEL", &defaults.log_level);
    let request_timeout_secs =
        parse_u64("VIRALIMG_REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?;
    let user_agent = or_default("VIRALIMG_USER_AGENT", DEFAULT_USER_AGENT);
    let max_retries = parse_u32("VIRALIMG_MAX_RETRIES", defaults.max_retries)?;
    let retry_backoff_base_ms =
        parse_u64("VIRALIMG_RETRY_BACKOFF_BASE_MS", defaults.retry_backoff_base_ms)?;
    let download_concurrency =
        parse_usize("VIRALIMG_DOWNLOAD_CONCURRENCY", defaults.download_concurrency)?;
    let min_target = parse_usize("VIRALIMG_MIN_TARGET", defaults.min_target)?;
    let max_target = parse_usize("VIRALIMG_MAX_TARGET", defaults.max_target)?;

    let default_quotas = SourceQuotas::default();
    let quotas = SourceQuotas {
        instagram: parse_usize("VIRALIMG_QUOTA_INSTAGRAM", default_quotas.instagram)?,
        facebook: parse_usize("VIRALIMG_QUOTA_FACEBOOK", default_quotas.facebook)?,
        youtube: parse_usize("VIRALIMG_QUOTA_YOUTUBE", default_quotas.youtube)?,
        news: parse_usize("VIRALIMG_QUOTA_NEWS", default_quotas.news)?,
        commercial: parse_usize("VIRALIMG_QUOTA_COMMERCIAL", default_quotas.commercial)?,
    };

    let renderer_url = optional("VIRALIMG_RENDERER_URL");
    let renderer_token = optional("VIRALIMG_RENDERER_TOKEN");
    let scoring_path = optional("VIRALIMG_SCORING_PATH").map(PathBuf::from);

    let config = AppConfig {
        storage_root,
        log_level,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        download_concurrency,
        min_target,
        max_target,
        quotas,
        renderer_url,
        renderer_token,
        scoring_path,
    };
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.max_target == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "VIRALIMG_MAX_TARGET".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if config.min_target > config.max_target {
        return Err(ConfigError::Validation(format!(
            "VIRALIMG_MIN_TARGET ({}) must not exceed VIRALIMG_MAX_TARGET ({})",
            config.min_target, config.max_target
        )));
    }
    if config.download_concurrency == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "VIRALIMG_DOWNLOAD_CONCURRENCY".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if config.request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "VIRALIMG_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn build_app_config_uses_defaults_when_env_is_empty() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.storage_root, PathBuf::from("./viral_images"));
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(cfg.max_retries, 2);
        assert_eq!(cfg.retry_backoff_base_ms, 500);
        assert_eq!(cfg.download_concurrency, 4);
        assert_eq!(cfg.min_target, 20);
        assert_eq!(cfg.max_target, 20);
        assert_eq!(cfg.quotas, SourceQuotas::default());
        assert!(cfg.renderer_url.is_none());
        assert!(cfg.scoring_path.is_none());
    }

    #[test]
    fn build_app_config_reads_overrides() {
        let mut map = HashMap::new();
        map.insert("VIRALIMG_STORAGE_ROOT", "/data/viral");
        map.insert("VIRALIMG_REQUEST_TIMEOUT_SECS", "10");
        map.insert("VIRALIMG_MIN_TARGET", "5");
        map.insert("VIRALIMG_MAX_TARGET", "12");
        map.insert("VIRALIMG_QUOTA_YOUTUBE", "3");
        map.insert("VIRALIMG_RENDERER_URL", "http://localhost:3000");
        map.insert("VIRALIMG_SCORING_PATH", "./config/scoring.yaml");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.storage_root, PathBuf::from("/data/viral"));
        assert_eq!(cfg.request_timeout_secs, 10);
        assert_eq!(cfg.min_target, 5);
        assert_eq!(cfg.max_target, 12);
        assert_eq!(cfg.quotas.youtube, 3);
        assert_eq!(cfg.quotas.instagram, 8);
        assert_eq!(cfg.renderer_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(
            cfg.scoring_path,
            Some(PathBuf::from("./config/scoring.yaml"))
        );
    }

    #[test]
    fn build_app_config_rejects_non_numeric_quota() {
        let mut map = HashMap::new();
        map.insert("VIRALIMG_QUOTA_NEWS", "lots");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VIRALIMG_QUOTA_NEWS"),
            "expected InvalidEnvVar(VIRALIMG_QUOTA_NEWS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_min_above_max() {
        let mut map = HashMap::new();
        map.insert("VIRALIMG_MIN_TARGET", "30");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::Validation(_))),
            "expected Validation error, got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_zero_concurrency() {
        let mut map = HashMap::new();
        map.insert("VIRALIMG_DOWNLOAD_CONCURRENCY", "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VIRALIMG_DOWNLOAD_CONCURRENCY"),
            "expected InvalidEnvVar(VIRALIMG_DOWNLOAD_CONCURRENCY), got: {result:?}"
        );
    }

    #[test]
    fn blank_optional_values_are_treated_as_unset() {
        let mut map = HashMap::new();
        map.insert("VIRALIMG_RENDERER_URL", "  ");
        map.insert("VIRALIMG_MAX_RETRIES", "");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.renderer_url.is_none());
        assert_eq!(cfg.max_retries, 2);
    }

    #[test]
    fn debug_output_redacts_renderer_token() {
        let mut map = HashMap::new();
        map.insert("VIRALIMG_RENDERER_TOKEN", "super-secret");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[redacted]"));
    }
}
