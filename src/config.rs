//! Runtime configuration.
//!
//! Everything comes from environment variables at process start and stays
//! immutable for the whole run. Scheduling is left to whatever invokes the
//! binary (cron, a systemd timer); each invocation starts cold.

use anyhow::{Context, Result, bail};

static ENV_EMAIL: &str = "KONDATE_EMAIL";
static ENV_PASSWORD: &str = "KONDATE_PASSWORD";
static ENV_SLACK_WEBHOOK_URL: &str = "KONDATE_SLACK_WEBHOOK_URL";
static ENV_SLACK_CHANNEL: &str = "KONDATE_SLACK_CHANNEL";
static ENV_REMIND_HOURS: &str = "KONDATE_REMIND_HOURS";

const DEFAULT_REMIND_HOURS: f64 = 24.0;

/// Immutable per-run configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Dashboard account credentials
    pub email: String,
    pub password: String,

    /// Slack incoming-webhook destination
    pub slack_webhook_url: String,
    pub slack_channel: String,

    /// Reminder horizon in hours; deadlines closer than this get posted
    pub remind_hours: f64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .with_context(|| format!("{key} must be set"))
        };

        let remind_hours = match lookup(ENV_REMIND_HOURS).filter(|value| !value.is_empty()) {
            None => DEFAULT_REMIND_HOURS,
            Some(raw) => raw
                .parse()
                .with_context(|| format!("{ENV_REMIND_HOURS} is not a number: {raw:?}"))?,
        };
        if remind_hours < 0.0 {
            bail!("{ENV_REMIND_HOURS} must be non-negative, got {remind_hours}");
        }

        Ok(Config {
            email: required(ENV_EMAIL)?,
            password: required(ENV_PASSWORD)?,
            slack_webhook_url: required(ENV_SLACK_WEBHOOK_URL)?,
            slack_channel: required(ENV_SLACK_CHANNEL)?,
            remind_hours,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (ENV_EMAIL, "me@example.com"),
            (ENV_PASSWORD, "hunter2"),
            (ENV_SLACK_WEBHOOK_URL, "https://hooks.slack.com/services/T0/B0/x"),
            (ENV_SLACK_CHANNEL, "#meals"),
        ])
    }

    fn from_vars(vars: &HashMap<&str, &str>) -> Result<Config> {
        Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_horizon_to_24() {
        let config = from_vars(&base_vars()).unwrap();
        assert_eq!(config.remind_hours, 24.0);
        assert_eq!(config.email, "me@example.com");
        assert_eq!(config.slack_channel, "#meals");
    }

    #[test]
    fn parses_fractional_horizon() {
        let mut vars = base_vars();
        vars.insert(ENV_REMIND_HOURS, "13.5");
        assert_eq!(from_vars(&vars).unwrap().remind_hours, 13.5);
    }

    #[test]
    fn missing_credential_fails() {
        let mut vars = base_vars();
        vars.remove(ENV_PASSWORD);
        let err = from_vars(&vars).unwrap_err();
        assert!(err.to_string().contains(ENV_PASSWORD));
    }

    #[test]
    fn empty_value_counts_as_unset() {
        let mut vars = base_vars();
        vars.insert(ENV_EMAIL, "");
        assert!(from_vars(&vars).is_err());
    }

    #[test]
    fn invalid_horizon_fails() {
        let mut vars = base_vars();
        vars.insert(ENV_REMIND_HOURS, "soon");
        assert!(from_vars(&vars).is_err());
    }

    #[test]
    fn negative_horizon_fails() {
        let mut vars = base_vars();
        vars.insert(ENV_REMIND_HOURS, "-1");
        assert!(from_vars(&vars).is_err());
    }
}
