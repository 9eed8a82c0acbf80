/// Analytics bot - a Slack bot that answers `pageviews`, `top clicks` and
/// `clicks on "<label>"` mentions with Google Analytics reports.
///
/// # Architecture
///
/// One sequential poll loop per process:
/// - a Socket Mode WebSocket feeds message events into a queue
/// - each tick drains the queue and picks the first direct mention of the bot
/// - the mention text is matched against the command table and turned into
///   a Reporting API v4 query
/// - the formatted report is posted back with `chat.postMessage`
///
/// # Example
///
/// ```no_run
/// use analytics_bot::analytics::AnalyticsClient;
/// use analytics_bot::commands::CommandHandler;
/// use analytics_bot::core::config::BotSettings;
/// use analytics_bot::core::models::DateRange;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     analytics_bot::setup_logging();
///
///     let settings = BotSettings::load(std::path::Path::new("bot_settings.toml"))?;
///     let client = AnalyticsClient::from_key_file(&settings.connect.key_file_location)?;
///     let commands = CommandHandler::new(client, settings.connect.view_id, settings.segment);
///
///     println!("{}", commands.top_clicks(&DateRange::default()).await?);
///     Ok(())
/// }
/// ```
pub mod analytics;
pub mod bot;
pub mod commands;
pub mod core;
pub mod errors;
pub mod slack;

pub use bot::AnalyticsBot;
pub use errors::BotError;

/// Configure structured logging with a JSON formatter.
///
/// The filter comes from `RUST_LOG`, falling back to `info` (or `debug`
/// with the `debug-logs` feature). Calling it more than once is harmless.
///
/// # Example
///
/// ```
/// analytics_bot::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let default_level = if cfg!(feature = "debug-logs") {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
