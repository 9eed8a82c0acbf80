use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::models::{BotIdentity, InboundEvent, ParsedCommand};

static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<@(|[WU].+?)>(.*)").expect("static regex compile"));

/// Finds a direct mention (a mention at the very start of the message) and
/// returns the mentioned user id together with the trimmed remainder.
///
/// # Examples
///
/// ```
/// use analytics_bot::slack::mention::parse_direct_mention;
///
/// let (user, rest) = parse_direct_mention("<@U123>  pageviews ").unwrap();
/// assert_eq!(user, "U123");
/// assert_eq!(rest, "pageviews");
///
/// assert!(parse_direct_mention("hello <@U123>").is_none());
/// ```
#[must_use]
pub fn parse_direct_mention(message_text: &str) -> Option<(String, String)> {
    MENTION_RE.captures(message_text).map(|caps| {
        let user_id = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let remainder = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
        (user_id, remainder)
    })
}

/// Scans a batch of events for the first plain message that mentions the bot.
///
/// Returns `None` when no event in the batch qualifies.
#[must_use]
pub fn parse_bot_commands(events: &[InboundEvent], bot: &BotIdentity) -> Option<ParsedCommand> {
    events
        .iter()
        .filter(|event| event.is_plain_message())
        .find_map(|event| match parse_direct_mention(&event.text) {
            Some((user_id, text)) if user_id == bot.as_str() => Some(ParsedCommand {
                text,
                channel: event.channel.clone(),
            }),
            _ => None,
        })
}
