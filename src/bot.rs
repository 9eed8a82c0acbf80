//! The poll loop: read a batch of events, answer at most one mention, sleep.

use std::future::Future;
use std::time::Duration;
use tracing::{error, info};

use crate::analytics::ReportingApi;
use crate::commands::CommandHandler;
use crate::core::models::{BotIdentity, InboundEvent};
use crate::slack::{SlackClient, SocketModeFeed, parse_bot_commands};

/// Delay between reads of the event feed.
pub const READ_DELAY: Duration = Duration::from_secs(1);

pub const CONNECTED_MESSAGE: &str = "myPugetSound Analytics Bot connected and running!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub channel: String,
    pub text: String,
}

/// Parses one batch and builds the reply for its first bot mention, if any.
/// A bare mention with no command text gets no reply.
pub async fn reply_for<R: ReportingApi>(
    events: &[InboundEvent],
    identity: &BotIdentity,
    commands: &CommandHandler<R>,
) -> Option<Reply> {
    let parsed = parse_bot_commands(events, identity)?;
    if parsed.text.is_empty() {
        return None;
    }
    let text = commands.respond(&parsed.text).await;

    Some(Reply {
        channel: parsed.channel,
        text,
    })
}

pub struct AnalyticsBot<R> {
    slack: SlackClient,
    identity: BotIdentity,
    commands: CommandHandler<R>,
}

impl<R: ReportingApi> AnalyticsBot<R> {
    pub fn new(slack: SlackClient, identity: BotIdentity, commands: CommandHandler<R>) -> Self {
        Self {
            slack,
            identity,
            commands,
        }
    }

    #[must_use]
    pub fn identity(&self) -> &BotIdentity {
        &self.identity
    }

    /// One poll iteration. Delivery failures are logged, not propagated.
    pub async fn tick(&self, feed: &mut SocketModeFeed) {
        let events = feed.read_events();
        let Some(reply) = reply_for(&events, &self.identity, &self.commands).await else {
            return;
        };

        if let Err(e) = self.slack.post_message(&reply.channel, &reply.text).await {
            error!("Failed to post reply to {}: {}", reply.channel, e);
        }
    }

    /// Polls until Ctrl-C.
    pub async fn run(&self, feed: SocketModeFeed) {
        info!("Listening for mentions of {}", self.identity.as_str());

        poll_until(tokio::signal::ctrl_c(), feed, move |mut feed| async move {
            self.tick(&mut feed).await;
            feed
        })
        .await;

        info!("Shutdown requested");
    }
}

/// Runs `step` then waits [`READ_DELAY`], over and over, until `shutdown`
/// resolves. The state is threaded through each step by value. A step still
/// in flight when `shutdown` fires is dropped.
pub async fn poll_until<Sig, S, F, Fut>(shutdown: Sig, mut state: S, mut step: F)
where
    Sig: Future,
    F: FnMut(S) -> Fut,
    Fut: Future<Output = S>,
{
    tokio::pin!(shutdown);

    loop {
        let next = async {
            let state = step(state).await;
            tokio::time::sleep(READ_DELAY).await;
            state
        };

        tokio::select! {
            _ = &mut shutdown => return,
            updated = next => state = updated,
        }
    }
}
