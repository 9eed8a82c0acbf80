use serde::{Deserialize, Deserializer};
use std::env;
use std::path::{Path, PathBuf};

use crate::errors::BotError;

pub const DEFAULT_SETTINGS_PATH: &str = "bot_settings.toml";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub slack_bot_token: String,
    pub slack_app_token: String,
    pub settings_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| format!("{}: environment variable not found", key))
        };

        Ok(Self {
            slack_bot_token: required("SLACK_BOT_TOKEN")?,
            slack_app_token: required("SLACK_APP_TOKEN")?,
            settings_path: lookup("BOT_SETTINGS_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH), PathBuf::from),
        })
    }
}

/// Analytics connection and segment settings, read from a TOML file.
///
/// ```
/// use analytics_bot::core::config::BotSettings;
///
/// let settings = BotSettings::from_toml_str(r#"
///     [CONNECT]
///     KEY_FILE_LOCATION = "key.json"
///     VIEW_ID = 123456
///
///     [SEGMENT]
///     FACULTY = "/faculty"
///     STAFF = "/staff"
///     STUDENT = "/student"
///     WELCOME = "/welcome"
/// "#).unwrap();
/// assert_eq!(settings.connect.view_id, "123456");
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct BotSettings {
    #[serde(rename = "CONNECT")]
    pub connect: ConnectSettings,
    #[serde(rename = "SEGMENT")]
    pub segment: SegmentSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ConnectSettings {
    pub key_file_location: PathBuf,
    #[serde(deserialize_with = "string_or_number")]
    pub view_id: String,
}

/// Page-path substrings that define each audience segment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SegmentSettings {
    pub faculty: String,
    pub staff: String,
    pub student: String,
    pub welcome: String,
}

impl SegmentSettings {
    /// Segment display names paired with their page-path filters, in report order.
    #[must_use]
    pub fn named(&self) -> [(&'static str, &str); 4] {
        [
            ("Faculty Users", self.faculty.as_str()),
            ("Staff Users", self.staff.as_str()),
            ("Student Users", self.student.as_str()),
            ("Welcome Users", self.welcome.as_str()),
        ]
    }
}

impl BotSettings {
    /// # Errors
    ///
    /// Returns `BotError::ConfigError` if the file is unreadable or invalid.
    pub fn load(path: &Path) -> Result<Self, BotError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BotError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    /// # Errors
    ///
    /// Returns `BotError::ConfigError` if the TOML is invalid or incomplete.
    pub fn from_toml_str(raw: &str) -> Result<Self, BotError> {
        toml::from_str(raw).map_err(|e| BotError::ConfigError(format!("bot settings: {}", e)))
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
