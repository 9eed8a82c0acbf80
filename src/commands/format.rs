//! Turns report rows into the Slack text blocks the bot posts.

use chrono::NaiveDate;

use crate::analytics::{Report, ReportRow};
use crate::errors::BotError;

pub const NO_CLICKS_FOUND: &str = "no clicks found";
pub const SEPARATOR: &str = "-------------";

/// Renders an integer with `,` between each group of three digits.
///
/// ```
/// use analytics_bot::commands::format::group_thousands;
///
/// assert_eq!(group_thousands(1234567), "1,234,567");
/// assert_eq!(group_thousands(-1234), "-1,234");
/// assert_eq!(group_thousands(999), "999");
/// ```
#[must_use]
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

/// Parses a metric value string and groups its digits.
///
/// # Errors
///
/// Returns `BotError::MalformedReport` if the value is not an integer.
pub fn format_count(raw: &str) -> Result<String, BotError> {
    raw.trim()
        .parse::<i64>()
        .map(group_thousands)
        .map_err(|_| BotError::MalformedReport(format!("`{}` is not a count", raw)))
}

/// `20240105` becomes `Jan 5`.
///
/// # Errors
///
/// Returns `BotError::MalformedReport` if the value is not a `YYYYMMDD` date.
pub fn format_short_date(yyyymmdd: &str) -> Result<String, BotError> {
    NaiveDate::parse_from_str(yyyymmdd, "%Y%m%d")
        .map(|date| date.format("%b %-d").to_string())
        .map_err(|_| BotError::MalformedReport(format!("`{}` is not a YYYYMMDD date", yyyymmdd)))
}

fn row_dimension<'a>(row: &'a ReportRow, index: usize) -> Result<&'a str, BotError> {
    row.dimension(index)
        .ok_or_else(|| BotError::MalformedReport(format!("row is missing dimension {}", index)))
}

fn row_count(row: &ReportRow) -> Result<String, BotError> {
    row.metric_value()
        .ok_or_else(|| BotError::MalformedReport("row has no metric value".to_string()))
        .and_then(format_count)
}

fn report_total(report: &Report) -> Result<&str, BotError> {
    report
        .data
        .total()
        .ok_or_else(|| BotError::MalformedReport("report has no totals".to_string()))
}

/// Segment labels right-aligned to the longest one, then a total line.
///
/// # Errors
///
/// Returns `BotError::NoData` if the report has no rows.
pub fn format_pageviews(report: &Report) -> Result<String, BotError> {
    let rows = &report.data.rows;
    if rows.is_empty() {
        return Err(BotError::NoData("pageviews in that date range".to_string()));
    }

    let labels = rows
        .iter()
        .map(|row| row_dimension(row, 0))
        .collect::<Result<Vec<_>, _>>()?;
    let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let mut answer = String::from("```");
    for (row, label) in rows.iter().zip(&labels) {
        answer.push_str(&format!("{:>width$}:  {}\n", label, row_count(row)?));
    }
    answer.push_str(&format!(
        "```\n*```        TOTAL:  {}```*",
        format_count(report_total(report)?)?
    ));

    Ok(answer)
}

/// One `action *label* - count` line per row, no total.
///
/// # Errors
///
/// Returns `BotError::NoData` if the report has no rows.
pub fn format_top_clicks(report: &Report) -> Result<String, BotError> {
    let rows = &report.data.rows;
    if rows.is_empty() {
        return Err(BotError::NoData("clicks in that date range".to_string()));
    }

    let mut answer = String::new();
    for row in rows {
        answer.push_str(&format!(
            "{} *{}* - {}\n ",
            row_dimension(row, 0)?,
            row_dimension(row, 1)?,
            row_count(row)?
        ));
    }

    Ok(answer)
}

/// Per-day clicks, newest first, followed by the total.
///
/// A reported total of `"0"` short-circuits to [`NO_CLICKS_FOUND`].
///
/// # Errors
///
/// Returns `BotError::MalformedReport` on missing totals or bad dates.
pub fn format_clicks_on(report: &Report) -> Result<String, BotError> {
    let total = report_total(report)?;
    if total == "0" {
        return Ok(NO_CLICKS_FOUND.to_string());
    }

    let mut answer = String::new();
    for row in &report.data.rows {
        answer.push_str(&format!(
            "{} - *{}*\n ",
            format_short_date(row_dimension(row, 0)?)?,
            row_count(row)?
        ));
    }
    answer.push_str(&format!("{}\nTotal - *{}*", SEPARATOR, format_count(total)?));

    Ok(answer)
}
