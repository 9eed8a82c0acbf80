use serde::{Deserialize, Serialize};

pub const DEFAULT_START_DATE: &str = "7daysAgo";
pub const DEFAULT_END_DATE: &str = "today";

/// A single event delivered by the Slack event feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl InboundEvent {
    /// A user-authored message: `type == "message"` without a subtype
    /// (edits, joins and bot posts all carry one).
    #[must_use]
    pub fn is_plain_message(&self) -> bool {
        self.event_type == "message" && self.subtype.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub text: String,
    pub channel: String,
}

/// The bot's own Slack user id, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity(String);

impl BotIdentity {
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self(user_id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque analytics date specs, forwarded to the reporting API as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl Default for DateRange {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_DATE.to_string(),
            end: DEFAULT_END_DATE.to_string(),
        }
    }
}
