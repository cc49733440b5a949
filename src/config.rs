// Runtime configuration, read from the environment (a `.env` file is loaded
// first by main). Optional values that fail to parse fall back to defaults
// with a warning instead of stopping the bot.

use crate::core::reports::SystemClock;
use anyhow::{bail, Context as _, Result};
use std::time::Duration;

const DEFAULT_FLOW_TIMEOUT_MINUTES: u64 = 30;

/// Where reports are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageMode {
    /// Shared Google spreadsheet.
    Sheets {
        spreadsheet_id: String,
        credentials: ServiceAccountSource,
    },
    /// Process memory only. Handy for trying the bot without credentials.
    Memory,
    /// Sheets storage was asked for but can't be set up. The bot still runs
    /// and refuses reports until it is restarted with working settings.
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceAccountSource {
    KeyFile(String),
    InlineJson(String),
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub admin_user_id: Option<u64>,
    pub storage: StorageMode,
    /// `None` keeps abandoned flows forever.
    pub flow_timeout: Option<Duration>,
    pub clock: SystemClock,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let discord_token = get("DISCORD_TOKEN").context(
            "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
        )?;

        let admin_user_id = get("ADMIN_USER_ID").and_then(|raw| match raw.parse::<u64>() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!("ADMIN_USER_ID '{}' is not a Discord user ID; ignoring it", raw);
                None
            }
        });

        let storage = match get("HOTELFLOW_STORAGE").as_deref() {
            Some("memory") => StorageMode::Memory,
            None | Some("sheets") => {
                let credentials = if let Some(path) = get("GOOGLE_SERVICE_ACCOUNT_KEY") {
                    Some(ServiceAccountSource::KeyFile(path))
                } else {
                    get("GOOGLE_SERVICE_ACCOUNT_JSON").map(ServiceAccountSource::InlineJson)
                };
                match (get("GOOGLE_SHEET_ID"), credentials) {
                    (Some(spreadsheet_id), Some(credentials)) => StorageMode::Sheets {
                        spreadsheet_id,
                        credentials,
                    },
                    (None, _) => StorageMode::Unavailable(
                        "GOOGLE_SHEET_ID is not set".to_string(),
                    ),
                    (Some(_), None) => StorageMode::Unavailable(
                        "neither GOOGLE_SERVICE_ACCOUNT_KEY nor GOOGLE_SERVICE_ACCOUNT_JSON is set"
                            .to_string(),
                    ),
                }
            }
            Some(other) => bail!("Unknown HOTELFLOW_STORAGE '{}' (expected 'sheets' or 'memory')", other),
        };

        let timeout_minutes = get("FLOW_TIMEOUT_MINUTES")
            .and_then(|raw| match raw.parse::<u64>() {
                Ok(minutes) => Some(minutes),
                Err(_) => {
                    tracing::warn!("FLOW_TIMEOUT_MINUTES '{}' is not a number; using default", raw);
                    None
                }
            })
            .unwrap_or(DEFAULT_FLOW_TIMEOUT_MINUTES);
        let flow_timeout = (timeout_minutes > 0).then(|| Duration::from_secs(timeout_minutes * 60));

        let clock = match get("REPORT_TIMEZONE") {
            Some(name) => SystemClock::from_zone_name(&name).unwrap_or_else(|| {
                tracing::warn!("Unknown REPORT_TIMEZONE '{}'; using the host's local time", name);
                SystemClock::local()
            }),
            None => SystemClock::local(),
        };

        Ok(Self {
            discord_token,
            admin_user_id,
            storage,
            flow_timeout,
            clock,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<BotConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_token_is_required() {
        assert!(config(&[("HOTELFLOW_STORAGE", "memory")]).is_err());
    }

    #[test]
    fn test_memory_storage_defaults() {
        let cfg = config(&[("DISCORD_TOKEN", "abc"), ("HOTELFLOW_STORAGE", "memory")]).unwrap();
        assert_eq!(cfg.storage, StorageMode::Memory);
        assert_eq!(cfg.admin_user_id, None);
        assert_eq!(cfg.flow_timeout, Some(Duration::from_secs(30 * 60)));
    }

    #[test]
    fn test_sheets_storage_needs_credentials() {
        let cfg = config(&[("DISCORD_TOKEN", "abc"), ("GOOGLE_SHEET_ID", "sheet")]).unwrap();
        assert!(matches!(&cfg.storage, StorageMode::Unavailable(reason) if reason.contains("GOOGLE_SERVICE_ACCOUNT")));

        let cfg = config(&[("DISCORD_TOKEN", "abc"), ("GOOGLE_SERVICE_ACCOUNT_JSON", "{}")]).unwrap();
        assert!(matches!(&cfg.storage, StorageMode::Unavailable(reason) if reason.contains("GOOGLE_SHEET_ID")));

        let cfg = config(&[
            ("DISCORD_TOKEN", "abc"),
            ("GOOGLE_SHEET_ID", "sheet"),
            ("GOOGLE_SERVICE_ACCOUNT_KEY", "creds.json"),
            ("ADMIN_USER_ID", "123456789"),
        ])
        .unwrap();
        assert_eq!(
            cfg.storage,
            StorageMode::Sheets {
                spreadsheet_id: "sheet".to_string(),
                credentials: ServiceAccountSource::KeyFile("creds.json".to_string()),
            }
        );
        assert_eq!(cfg.admin_user_id, Some(123456789));
    }

    #[test]
    fn test_bad_optional_values_fall_back() {
        let cfg = config(&[
            ("DISCORD_TOKEN", "abc"),
            ("HOTELFLOW_STORAGE", "memory"),
            ("ADMIN_USER_ID", "@boss"),
            ("FLOW_TIMEOUT_MINUTES", "soon"),
            ("REPORT_TIMEZONE", "Nowhere/Special"),
        ])
        .unwrap();
        assert_eq!(cfg.admin_user_id, None);
        assert_eq!(cfg.flow_timeout, Some(Duration::from_secs(30 * 60)));
    }

    #[test]
    fn test_zero_timeout_disables_expiry() {
        let cfg = config(&[
            ("DISCORD_TOKEN", "abc"),
            ("HOTELFLOW_STORAGE", "memory"),
            ("FLOW_TIMEOUT_MINUTES", "0"),
        ])
        .unwrap();
        assert_eq!(cfg.flow_timeout, None);
    }

    #[test]
    fn test_unknown_storage_mode() {
        assert!(config(&[("DISCORD_TOKEN", "abc"), ("HOTELFLOW_STORAGE", "csv")]).is_err());
    }
}
