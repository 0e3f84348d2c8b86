//! Post-merge configuration validation.
//!
//! Validates that deserialized [`Config`](crate::Config) values are within
//! acceptable ranges and that cross-field invariants hold.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Ceiling for `approval.max_timeout_secs` (one day).
const MAX_TIMEOUT_UPPER_BOUND: u64 = 86_400;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_server(config)?;
    validate_slack(config)?;
    validate_approval(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_server(config: &Config) -> ConfigResult<()> {
    let s = &config.server;

    if s.bind.trim().is_empty() {
        return Err(invalid("server.bind", "must not be empty"));
    }
    for (field, path) in [
        ("server.request_path", &s.request_path),
        ("server.callback_path", &s.callback_path),
    ] {
        if !path.starts_with('/') {
            return Err(invalid(field, format!("'{path}' must start with '/'")));
        }
    }
    if s.request_path == s.callback_path {
        return Err(invalid(
            "server.callback_path",
            "must differ from server.request_path",
        ));
    }
    if s.request_path == "/healthz" || s.callback_path == "/healthz" {
        return Err(invalid("server", "'/healthz' is reserved"));
    }
    Ok(())
}

fn validate_slack(config: &Config) -> ConfigResult<()> {
    let s = &config.slack;

    if s.api_token.trim().is_empty() {
        return Err(invalid(
            "slack.api_token",
            "must be set (config file, ASSENT_SLACK_API_TOKEN or API_TOKEN)",
        ));
    }
    if s.verification_token.trim().is_empty() {
        return Err(invalid(
            "slack.verification_token",
            "must be set (config file, ASSENT_SLACK_VERIFICATION_TOKEN or VERIFICATION_TOKEN)",
        ));
    }
    if !(s.api_url.starts_with("https://") || s.api_url.starts_with("http://")) {
        return Err(invalid(
            "slack.api_url",
            format!("'{}' must be an http(s) URL", s.api_url),
        ));
    }
    if s.request_timeout_secs == 0 {
        return Err(invalid("slack.request_timeout_secs", "must be greater than 0"));
    }
    Ok(())
}

fn validate_approval(config: &Config) -> ConfigResult<()> {
    let a = &config.approval;

    if a.max_timeout_secs > MAX_TIMEOUT_UPPER_BOUND {
        return Err(invalid(
            "approval.max_timeout_secs",
            format!("{} exceeds the limit of {MAX_TIMEOUT_UPPER_BOUND}", a.max_timeout_secs),
        ));
    }
    if a.min_timeout_secs > a.max_timeout_secs {
        return Err(invalid(
            "approval.min_timeout_secs",
            format!(
                "{} is greater than max_timeout_secs ({})",
                a.min_timeout_secs, a.max_timeout_secs
            ),
        ));
    }
    if !(a.min_timeout_secs..=a.max_timeout_secs).contains(&a.default_timeout_secs) {
        return Err(invalid(
            "approval.default_timeout_secs",
            format!(
                "{} is outside [{}, {}]",
                a.default_timeout_secs, a.min_timeout_secs, a.max_timeout_secs
            ),
        ));
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(invalid(
            "logging.level",
            format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        ));
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                valid_formats.join(", ")
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.slack.api_token = "xoxb-1".to_owned();
        config.slack.verification_token = "verif".to_owned();
        config
    }

    fn field_of(result: ConfigResult<()>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_tokens_rejected() {
        let mut config = valid_config();
        config.slack.api_token.clear();
        assert_eq!(field_of(validate(&config)), "slack.api_token");

        let mut config = valid_config();
        config.slack.verification_token = "  ".to_owned();
        assert_eq!(field_of(validate(&config)), "slack.verification_token");
    }

    #[test]
    fn test_paths_must_be_absolute_and_distinct() {
        let mut config = valid_config();
        config.server.request_path = "ask".to_owned();
        assert_eq!(field_of(validate(&config)), "server.request_path");

        let mut config = valid_config();
        config.server.callback_path = "/ask".to_owned();
        assert_eq!(field_of(validate(&config)), "server.callback_path");

        let mut config = valid_config();
        config.server.request_path = "/healthz".to_owned();
        assert_eq!(field_of(validate(&config)), "server");
    }

    #[test]
    fn test_timeout_bounds() {
        let mut config = valid_config();
        config.approval.default_timeout_secs = 700;
        assert_eq!(field_of(validate(&config)), "approval.default_timeout_secs");

        let mut config = valid_config();
        config.approval.min_timeout_secs = 601;
        assert_eq!(field_of(validate(&config)), "approval.min_timeout_secs");

        let mut config = valid_config();
        config.approval.max_timeout_secs = 100_000;
        assert_eq!(field_of(validate(&config)), "approval.max_timeout_secs");
    }

    #[test]
    fn test_unknown_log_level_and_format() {
        let mut config = valid_config();
        config.logging.level = "verbose".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.level");

        let mut config = valid_config();
        config.logging.format = "xml".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.format");
    }

    #[test]
    fn test_api_url_scheme() {
        let mut config = valid_config();
        config.slack.api_url = "ftp://slack.com".to_owned();
        assert_eq!(field_of(validate(&config)), "slack.api_url");
    }
}
