use analytics_bot::analytics::AnalyticsClient;
use analytics_bot::bot::{AnalyticsBot, CONNECTED_MESSAGE};
use analytics_bot::commands::CommandHandler;
use analytics_bot::core::config::{AppConfig, BotSettings};
use analytics_bot::core::models::BotIdentity;
use analytics_bot::slack::{SlackClient, SocketModeConnector, SocketModeFeed};
use anyhow::{Result, anyhow};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    analytics_bot::setup_logging();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        anyhow!(e)
    })?;
    let settings = BotSettings::load(&config.settings_path)?;

    let analytics = AnalyticsClient::from_key_file(&settings.connect.key_file_location)?;
    let commands = CommandHandler::new(analytics, settings.connect.view_id, settings.segment);
    let slack = SlackClient::new(config.slack_bot_token)?;

    let feed = match SocketModeFeed::connect(SocketModeConnector::new(config.slack_app_token)).await
    {
        Ok(feed) => feed,
        Err(e) => {
            error!("Connection failed. {}", e);
            return Err(e.into());
        }
    };
    info!("{}", CONNECTED_MESSAGE);

    let identity = BotIdentity::new(slack.get_bot_user_id().await?);
    let bot = AnalyticsBot::new(slack, identity, commands);
    bot.run(feed).await;

    Ok(())
}
