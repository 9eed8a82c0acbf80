use slack_morphism::errors::SlackClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to parse Slack event: {0}")]
    ParseError(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("No data returned for {0}")]
    NoData(String),

    #[error("Unexpected report shape: {0}")]
    MalformedReport(String),

    #[error("Failed to authenticate with Google: {0}")]
    AuthError(String),

    #[error("Failed to access Analytics Reporting API: {0}")]
    AnalyticsError(String),

    #[error("Failed to access Slack API: {0}")]
    ApiError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Socket Mode connection failed: {0}")]
    WebSocketError(String),
}

impl BotError {
    /// Text posted back to the channel when a command fails.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            BotError::InvalidCommand(msg) => format!(":warning: {}", msg),
            BotError::NoData(what) => format!("No data found for {}.", what),
            BotError::MalformedReport(_) => {
                "Sorry, the analytics report came back in a shape I don't understand.".to_string()
            }
            BotError::AuthError(_) => {
                "Sorry, I couldn't sign in to Google Analytics. Please check my credentials."
                    .to_string()
            }
            _ => "Sorry, I couldn't fetch that report right now. Please try again later."
                .to_string(),
        }
    }
}

impl From<SlackClientError> for BotError {
    fn from(error: SlackClientError) -> Self {
        BotError::ApiError(error.to_string())
    }
}

impl From<reqwest::Error> for BotError {
    fn from(error: reqwest::Error) -> Self {
        BotError::HttpError(error.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for BotError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        BotError::WebSocketError(error.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for BotError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        BotError::AuthError(error.to_string())
    }
}
