use analytics_bot::analytics::{Report, ReportingApi};
use analytics_bot::bot::{Reply, poll_until, reply_for};
use analytics_bot::commands::{CAT_REPLY, CommandHandler, GREETING_REPLY, USAGE, default_response};
use analytics_bot::core::config::SegmentSettings;
use analytics_bot::core::models::{BotIdentity, InboundEvent};
use analytics_bot::errors::BotError;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Returns a canned report and records every request body it receives.
struct FakeReports {
    report: Value,
    requests: Mutex<Vec<Value>>,
}

impl FakeReports {
    fn returning(report: Value) -> Self {
        Self {
            report,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportingApi for FakeReports {
    async fn batch_get(&self, body: Value) -> Result<Report, BotError> {
        self.requests.lock().unwrap().push(body);
        serde_json::from_value(self.report.clone())
            .map_err(|e| BotError::MalformedReport(e.to_string()))
    }
}

struct FailingReports;

#[async_trait]
impl ReportingApi for FailingReports {
    async fn batch_get(&self, _body: Value) -> Result<Report, BotError> {
        Err(BotError::AnalyticsError("400: Invalid value 'lastweek'".to_string()))
    }
}

fn segments() -> SegmentSettings {
    SegmentSettings {
        faculty: "/faculty".to_string(),
        staff: "/staff".to_string(),
        student: "/student".to_string(),
        welcome: "/welcome".to_string(),
    }
}

fn handler(report: Value) -> CommandHandler<FakeReports> {
    CommandHandler::new(FakeReports::returning(report), "98765".to_string(), segments())
}

fn empty_report() -> Value {
    json!({ "data": { "totals": [{ "values": ["0"] }] } })
}

fn first_request(handler_reports: &[Value]) -> &Value {
    &handler_reports[0]["reportRequests"][0]
}

#[tokio::test]
async fn test_pageviews_defaults_to_last_seven_days() {
    let reports = FakeReports::returning(json!({
        "data": {
            "rows": [
                { "dimensions": ["Faculty Users"], "metrics": [{ "values": ["120"] }] },
                { "dimensions": ["Staff Users"], "metrics": [{ "values": ["45"] }] }
            ],
            "totals": [{ "values": ["165"] }]
        }
    }));
    let commands = CommandHandler::new(reports, "98765".to_string(), segments());

    let response = commands.handle("pageviews").await.unwrap();

    assert!(response.starts_with(":eye: *` Pageviews `* `7daysAgo → today`\n```"));
    assert!(response.contains("TOTAL:  165"));
}

#[tokio::test]
async fn test_pageviews_forwards_date_range() {
    let commands = handler(json!({
        "data": {
            "rows": [{ "dimensions": ["Welcome Users"], "metrics": [{ "values": ["7"] }] }],
            "totals": [{ "values": ["7"] }]
        }
    }));

    commands
        .handle("pageviews from 2024-01-01 to 2024-01-31")
        .await
        .unwrap();

    let requests = commands_requests(&commands);
    let request = first_request(&requests);
    assert_eq!(request["viewId"], "98765");
    assert_eq!(
        request["dateRanges"],
        json!([{ "startDate": "2024-01-01", "endDate": "2024-01-31" }])
    );
}

fn commands_requests(commands: &CommandHandler<FakeReports>) -> Vec<Value> {
    commands.reports().requests()
}

#[tokio::test]
async fn test_clicks_on_extracts_quoted_label() {
    let commands = handler(empty_report());

    let response = commands
        .handle(r#"clicks on "Apply Now" from yesterday to today"#)
        .await
        .unwrap();

    assert_eq!(
        response,
        "*Clicks on \"Apply Now\"* (yesterday - today) \n-------------\nno clicks found"
    );
    let requests = commands_requests(&commands);
    let filter = &first_request(&requests)["dimensionFilterClauses"][0]["filters"][0];
    assert_eq!(filter["expressions"], json!(["Apply Now"]));
}

#[tokio::test]
async fn test_clicks_on_without_quotes_replies_instead_of_crashing() {
    let commands = handler(empty_report());

    let response = commands.respond("clicks on Apply Now").await;

    assert!(response.starts_with(":warning:"));
    assert!(response.contains("quotes"));
    assert!(commands_requests(&commands).is_empty(), "no query for a bad command");
}

#[tokio::test]
async fn test_top_clicks_header() {
    let commands = handler(json!({
        "data": {
            "rows": [{ "dimensions": ["click", "Apply"], "metrics": [{ "values": ["9"] }] }],
            "totals": [{ "values": ["9"] }]
        }
    }));

    let response = commands.handle("top clicks from 30daysAgo").await.unwrap();

    assert_eq!(
        response,
        "*Top Clicks* (30daysAgo - today)\n-------------\nclick *Apply* - 9\n "
    );
}

#[tokio::test]
async fn test_empty_report_becomes_no_data_reply() {
    let commands = handler(empty_report());

    let response = commands.respond("top clicks").await;

    assert_eq!(response, "No data found for clicks in that date range.");
}

#[tokio::test]
async fn test_invalid_date_is_rejected_before_querying() {
    let commands = handler(empty_report());

    let response = commands.respond("pageviews from lastweek").await;

    assert!(response.contains("lastweek"));
    assert!(commands_requests(&commands).is_empty());
}

#[tokio::test]
async fn test_api_failure_becomes_safe_reply() {
    let commands = CommandHandler::new(FailingReports, "1".to_string(), segments());

    let response = commands.respond("pageviews").await;

    assert!(response.starts_with("Sorry"));
    assert!(!response.contains("lastweek"));
}

#[tokio::test]
async fn test_fixed_replies() {
    let commands = handler(empty_report());

    assert_eq!(commands.respond("help").await, USAGE);
    assert_eq!(commands.respond("helpme").await, CAT_REPLY);
    assert_eq!(commands.respond("kumbunwa").await, GREETING_REPLY);
    assert_eq!(commands.respond("what is this").await, default_response());
    assert!(commands_requests(&commands).is_empty());
}

#[test]
fn test_usage_and_default_text() {
    assert_eq!(default_response(), "Not sure what you mean. Try *help*.");
    assert!(USAGE.contains("`pageviews from ____ to ____ (Dates are optional)`"));
    assert!(USAGE.contains("`top clicks from ____ to ____ (Dates are optional)`"));
    assert!(USAGE.contains("`clicks on \"____\" [link name] from ____ to ____ (Dates are optional)`"));
    assert!(USAGE.contains("(Dates: today / yesterday / NdaysAgo / YYYY-MM-DD)"));
}

#[tokio::test]
async fn test_reply_targets_source_channel() {
    let commands = handler(empty_report());
    let bot = BotIdentity::new("UBOT");
    let events = vec![
        InboundEvent {
            event_type: "message".to_string(),
            subtype: None,
            text: "<@UOTHER> help".to_string(),
            channel: "C1".to_string(),
            user: Some("U1".to_string()),
        },
        InboundEvent {
            event_type: "message".to_string(),
            subtype: None,
            text: "<@UBOT> kumbunwa".to_string(),
            channel: "C2".to_string(),
            user: Some("U2".to_string()),
        },
    ];

    let reply = reply_for(&events, &bot, &commands).await;

    assert_eq!(
        reply,
        Some(Reply {
            channel: "C2".to_string(),
            text: GREETING_REPLY.to_string(),
        })
    );
    assert_eq!(reply_for(&events[..1], &bot, &commands).await, None);
}

fn mention(text: &str) -> InboundEvent {
    InboundEvent {
        event_type: "message".to_string(),
        subtype: None,
        text: text.to_string(),
        channel: "C1".to_string(),
        user: Some("U1".to_string()),
    }
}

#[tokio::test]
async fn test_bare_mention_gets_no_reply() {
    let commands = handler(empty_report());
    let bot = BotIdentity::new("UBOT");

    assert_eq!(reply_for(&[mention("<@UBOT>   ")], &bot, &commands).await, None);
    assert_eq!(reply_for(&[mention("<@UBOT>")], &bot, &commands).await, None);
    assert!(commands_requests(&commands).is_empty());

    let reply = reply_for(&[mention("<@UBOT> what is this")], &bot, &commands).await;
    assert_eq!(reply.map(|r| r.text), Some(default_response()));
}

#[tokio::test]
async fn test_shutdown_interrupts_a_stalled_step() {
    let started = AtomicUsize::new(0);

    let finished = tokio::time::timeout(
        Duration::from_secs(5),
        poll_until(tokio::time::sleep(Duration::from_millis(50)), (), |()| {
            started.fetch_add(1, Ordering::SeqCst);
            std::future::pending::<()>()
        }),
    )
    .await;

    assert!(finished.is_ok(), "shutdown must not wait for the step");
    assert_eq!(started.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_poll_until_threads_state_between_steps() {
    let seen = Mutex::new(Vec::new());

    poll_until(tokio::time::sleep(Duration::from_millis(1500)), 0u32, |n| {
        seen.lock().unwrap().push(n);
        async move { n + 1 }
    })
    .await;

    let seen = seen.into_inner().unwrap();
    assert!(seen.len() >= 2, "expected a second step after the read delay: {seen:?}");
    assert_eq!(seen[..2], [0, 1]);
}
