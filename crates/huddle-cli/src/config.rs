//! CLI configuration loaded from environment variables.
//!
//! Every setting has a default so the binary runs with zero configuration;
//! command-line flags are applied on top by `main`.

use std::path::PathBuf;
use std::time::Duration;

use huddle_presence::PresenceConfig;
use huddle_shared::constants::DB_FILE_NAME;
use huddle_shared::UserId;
use huddle_store::Database;

#[derive(Debug, Clone)]
pub struct HuddleConfig {
    /// SQLite replica location.
    /// Env: `HUDDLE_DB_PATH`
    /// Default: platform data directory, `huddle/huddle.db`
    pub db_path: PathBuf,

    /// Id of the signed-in user.
    /// Env: `HUDDLE_USER`
    pub current_user: Option<UserId>,

    /// Env: `HUDDLE_ONLINE_DEBOUNCE_MS`, `HUDDLE_ACTIVITY_DEBOUNCE_MS`,
    /// `HUDDLE_AWAY_AFTER_SECS`
    pub presence: PresenceConfig,
}

impl Default for HuddleConfig {
    fn default() -> Self {
        Self {
            db_path: Database::default_path().unwrap_or_else(|_| PathBuf::from(DB_FILE_NAME)),
            current_user: None,
            presence: PresenceConfig::default(),
        }
    }
}

impl HuddleConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("HUDDLE_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Some(user) = lookup("HUDDLE_USER") {
            let user = UserId::new(user.trim());
            if !user.is_empty() {
                config.current_user = Some(user);
            }
        }

        if let Some(ms) = parse_u64(&lookup, "HUDDLE_ONLINE_DEBOUNCE_MS") {
            config.presence.online_debounce = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_u64(&lookup, "HUDDLE_ACTIVITY_DEBOUNCE_MS") {
            config.presence.activity_debounce = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_u64(&lookup, "HUDDLE_AWAY_AFTER_SECS") {
            config.presence.away_after = Duration::from_secs(secs);
        }

        // RUST_LOG is read by tracing-subscriber's EnvFilter directly.

        config
    }

    pub fn require_user(&self) -> anyhow::Result<&UserId> {
        self.current_user
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no current user: set HUDDLE_USER or pass --user"))
    }
}

fn parse_u64<F>(lookup: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Invalid number, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> HuddleConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HuddleConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = HuddleConfig::default();
        assert!(config.current_user.is_none());
        assert_eq!(config.presence, PresenceConfig::default());
        assert!(config.db_path.ends_with(DB_FILE_NAME));
    }

    #[test]
    fn test_env_overrides() {
        let config = config_from(&[
            ("HUDDLE_DB_PATH", "/tmp/h.db"),
            ("HUDDLE_USER", " u1 "),
            ("HUDDLE_AWAY_AFTER_SECS", "5"),
            ("HUDDLE_ONLINE_DEBOUNCE_MS", "250"),
        ]);
        assert_eq!(config.db_path, PathBuf::from("/tmp/h.db"));
        assert_eq!(config.current_user, Some(UserId::from("u1")));
        assert_eq!(config.presence.away_after, Duration::from_secs(5));
        assert_eq!(config.presence.online_debounce, Duration::from_millis(250));
        assert!(config.require_user().is_ok());
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = config_from(&[("HUDDLE_ACTIVITY_DEBOUNCE_MS", "soon"), ("HUDDLE_USER", "  ")]);
        assert_eq!(config.presence, PresenceConfig::default());
        assert!(config.require_user().is_err());
    }
}
