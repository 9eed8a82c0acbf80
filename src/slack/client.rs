//! Slack Web API client module
//!
//! Wraps the two Web API calls the bot needs: identity lookup and posting replies.

use slack_morphism::hyper_tokio::{SlackClientHyperConnector, SlackHyperClient};
use slack_morphism::prelude::SlackApiChatPostMessageRequest;
use slack_morphism::{SlackApiToken, SlackApiTokenValue, SlackChannelId, SlackMessageContent};
use tracing::debug;

use crate::errors::BotError;

pub struct SlackClient {
    client: SlackHyperClient,
    token: SlackApiToken,
}

impl SlackClient {
    /// # Errors
    ///
    /// Returns an error if the HTTPS connector cannot be built.
    pub fn new(token: String) -> Result<Self, BotError> {
        let connector = SlackClientHyperConnector::new().map_err(|e| {
            BotError::ConfigError(format!("Failed to create Slack HTTP connector: {}", e))
        })?;

        Ok(Self {
            client: SlackHyperClient::new(connector),
            token: SlackApiToken::new(SlackApiTokenValue::new(token)),
        })
    }

    /// Resolves the bot's own user id via `auth.test`.
    ///
    /// # Errors
    ///
    /// Returns an error if the Slack API call fails.
    pub async fn get_bot_user_id(&self) -> Result<String, BotError> {
        let session = self.client.open_session(&self.token);
        let test_resp = session.auth_test().await?;

        Ok(test_resp.user_id.0)
    }

    /// # Errors
    ///
    /// Returns an error if the Slack API call fails.
    pub async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), BotError> {
        let session = self.client.open_session(&self.token);
        let post_req = SlackApiChatPostMessageRequest::new(
            SlackChannelId(channel_id.to_string()),
            SlackMessageContent::new().with_text(text.to_string()),
        );

        session.chat_post_message(&post_req).await?;
        debug!("Posted {} chars to {}", text.len(), channel_id);

        Ok(())
    }
}
