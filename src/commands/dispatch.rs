//! Command grammar: which command a mention asks for, and for which dates.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::models::DateRange;
use crate::errors::BotError;

pub const EXAMPLE_COMMAND: &str = "help";

static QUOTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]*)""#).expect("static regex compile"));

static DATE_SPEC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(today|yesterday|[0-9]+daysAgo|[0-9]{4}-[0-9]{2}-[0-9]{2})$")
        .expect("static regex compile")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Usage,
    Cat,
    Greeting,
    Pageviews,
    TopClicks,
    ClicksOn { label: String },
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub command: Command,
    pub range: DateRange,
}

#[derive(Debug, Clone, Copy)]
enum Matcher {
    Prefix(&'static str),
    FirstWord(&'static str),
}

impl Matcher {
    fn matches(self, text: &str) -> bool {
        match self {
            Matcher::Prefix(prefix) => text.starts_with(prefix),
            Matcher::FirstWord(word) => text.split_whitespace().next() == Some(word),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    ClicksOn,
    Usage,
    TopClicks,
    Pageviews,
    Greeting,
    Cat,
}

/// First match wins. `clicks on` outranks everything and an exact `help`
/// word outranks the other prefixes, so `help` shows usage while `helpme`
/// still gets the cat.
const PRIORITY: [(Matcher, Kind); 6] = [
    (Matcher::Prefix("clicks on"), Kind::ClicksOn),
    (Matcher::FirstWord(EXAMPLE_COMMAND), Kind::Usage),
    (Matcher::Prefix("top clicks"), Kind::TopClicks),
    (Matcher::Prefix("pageviews"), Kind::Pageviews),
    (Matcher::Prefix("kumbunwa"), Kind::Greeting),
    (Matcher::Prefix(EXAMPLE_COMMAND), Kind::Cat),
];

fn token_after(text: &str, keyword: &str) -> Option<String> {
    let mut tokens = text.split_whitespace();
    tokens.position(|t| t == keyword)?;
    tokens.next().map(str::to_string)
}

/// Reads `from <start>` and `to <end>` independently; absent or dangling
/// keywords keep the defaults.
///
/// ```
/// use analytics_bot::commands::dispatch::extract_date_range;
///
/// let range = extract_date_range("pageviews from 2024-01-01 to 2024-01-31");
/// assert_eq!(range.start, "2024-01-01");
/// assert_eq!(range.end, "2024-01-31");
///
/// let range = extract_date_range("pageviews");
/// assert_eq!((range.start.as_str(), range.end.as_str()), ("7daysAgo", "today"));
/// ```
#[must_use]
pub fn extract_date_range(text: &str) -> DateRange {
    let mut range = DateRange::default();

    if text.contains("from ") {
        if let Some(start) = token_after(text, "from") {
            range.start = start;
        }
    }
    if text.contains("to ") {
        if let Some(end) = token_after(text, "to") {
            range.end = end;
        }
    }

    range
}

/// Accepts `today`, `yesterday`, `NdaysAgo` and `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns `BotError::InvalidCommand` naming the first unrecognised token.
pub fn validate_date_range(range: &DateRange) -> Result<(), BotError> {
    for token in [&range.start, &range.end] {
        if !DATE_SPEC_RE.is_match(token) {
            return Err(BotError::InvalidCommand(format!(
                "`{}` is not a date I understand. Dates: today / yesterday / NdaysAgo / YYYY-MM-DD",
                token
            )));
        }
    }
    Ok(())
}

/// The first `"quoted"` substring of the command.
///
/// # Errors
///
/// Returns `BotError::InvalidCommand` if the command has no quoted label.
pub fn extract_link_label(text: &str) -> Result<String, BotError> {
    QUOTED_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            BotError::InvalidCommand(
                "`clicks on` needs a link name in quotes, e.g. `clicks on \"Apply Now\"`"
                    .to_string(),
            )
        })
}

/// # Errors
///
/// Returns `BotError::InvalidCommand` for a `clicks on` without a quoted label.
pub fn parse_request(text: &str) -> Result<Request, BotError> {
    let kind = PRIORITY
        .iter()
        .find(|(matcher, _)| matcher.matches(text))
        .map(|(_, kind)| *kind);

    let command = match kind {
        Some(Kind::ClicksOn) => Command::ClicksOn {
            label: extract_link_label(text)?,
        },
        Some(Kind::Usage) => Command::Usage,
        Some(Kind::TopClicks) => Command::TopClicks,
        Some(Kind::Pageviews) => Command::Pageviews,
        Some(Kind::Greeting) => Command::Greeting,
        Some(Kind::Cat) => Command::Cat,
        None => Command::Unknown,
    };

    Ok(Request {
        command,
        range: extract_date_range(text),
    })
}
