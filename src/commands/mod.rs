//! Bot command handling: parse the mention text, run the matching report
//! and render the reply.

pub mod dispatch;
pub mod format;

use tracing::{info, warn};

use crate::analytics::ReportingApi;
use crate::analytics::requests::{
    build_clicks_on_request, build_pageviews_request, build_top_clicks_request,
};
use crate::core::config::SegmentSettings;
use crate::core::models::DateRange;
use crate::errors::BotError;
use dispatch::{Command, EXAMPLE_COMMAND, parse_request, validate_date_range};

pub const USAGE: &str = "`pageviews from ____ to ____ (Dates are optional)` \n `top clicks from ____ to ____ (Dates are optional)` \n `clicks on \"____\" [link name] from ____ to ____ (Dates are optional)` \n `(Dates: today / yesterday / NdaysAgo / YYYY-MM-DD)`";
pub const CAT_REPLY: &str = ":cat2:";
pub const GREETING_REPLY: &str = ":woman-bowing:";

#[must_use]
pub fn default_response() -> String {
    format!("Not sure what you mean. Try *{}*.", EXAMPLE_COMMAND)
}

pub struct CommandHandler<R> {
    reports: R,
    view_id: String,
    segments: SegmentSettings,
}

impl<R: ReportingApi> CommandHandler<R> {
    pub fn new(reports: R, view_id: String, segments: SegmentSettings) -> Self {
        Self {
            reports,
            view_id,
            segments,
        }
    }

    #[must_use]
    pub fn reports(&self) -> &R {
        &self.reports
    }

    /// Pageviews per audience segment.
    ///
    /// # Errors
    ///
    /// Fails if the query fails or returns no rows.
    pub async fn pageviews(&self, range: &DateRange) -> Result<String, BotError> {
        let body = build_pageviews_request(&self.view_id, &self.segments, range);
        let report = self.reports.batch_get(body).await?;
        format::format_pageviews(&report)
    }

    /// # Errors
    ///
    /// Fails if the query fails or returns no rows.
    pub async fn top_clicks(&self, range: &DateRange) -> Result<String, BotError> {
        let body = build_top_clicks_request(&self.view_id, range);
        let report = self.reports.batch_get(body).await?;
        format::format_top_clicks(&report)
    }

    /// # Errors
    ///
    /// Fails if the query fails or the report is malformed.
    pub async fn clicks_on(&self, label: &str, range: &DateRange) -> Result<String, BotError> {
        let body = build_clicks_on_request(&self.view_id, label, range);
        let report = self.reports.batch_get(body).await?;
        format::format_clicks_on(&report)
    }

    /// Runs one command and returns the reply text.
    ///
    /// # Errors
    ///
    /// Returns the first failure from parsing, date validation or the report.
    pub async fn handle(&self, text: &str) -> Result<String, BotError> {
        let request = parse_request(text)?;
        let range = &request.range;

        let response = match &request.command {
            Command::Usage => USAGE.to_string(),
            Command::Cat => CAT_REPLY.to_string(),
            Command::Greeting => GREETING_REPLY.to_string(),
            Command::Pageviews => {
                validate_date_range(range)?;
                format!(
                    ":eye: *` Pageviews `* `{} → {}`\n{}",
                    range.start,
                    range.end,
                    self.pageviews(range).await?
                )
            }
            Command::TopClicks => {
                validate_date_range(range)?;
                format!(
                    "*Top Clicks* ({} - {})\n-------------\n{}",
                    range.start,
                    range.end,
                    self.top_clicks(range).await?
                )
            }
            Command::ClicksOn { label } => {
                validate_date_range(range)?;
                format!(
                    "*Clicks on \"{}\"* ({} - {}) \n-------------\n{}",
                    label,
                    range.start,
                    range.end,
                    self.clicks_on(label, range).await?
                )
            }
            Command::Unknown => default_response(),
        };

        Ok(response)
    }

    /// Like [`handle`](Self::handle), but failures become a safe reply.
    pub async fn respond(&self, text: &str) -> String {
        match self.handle(text).await {
            Ok(response) => {
                info!("Handled command `{}`", text);
                response
            }
            Err(e) => {
                warn!("Command `{}` failed: {}", text, e);
                e.user_message()
            }
        }
    }
}
