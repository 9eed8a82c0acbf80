use analytics_bot::analytics::requests::{
    build_clicks_on_request, build_pageviews_request, build_top_clicks_request,
};
use analytics_bot::core::config::SegmentSettings;
use analytics_bot::core::models::DateRange;
use serde_json::json;

fn range(start: &str, end: &str) -> DateRange {
    DateRange {
        start: start.to_string(),
        end: end.to_string(),
    }
}

#[test]
fn test_pageviews_request_has_four_segments() {
    let segments = SegmentSettings {
        faculty: "/faculty".to_string(),
        staff: "/staff".to_string(),
        student: "/student".to_string(),
        welcome: "/welcome".to_string(),
    };

    let body = build_pageviews_request("123", &segments, &DateRange::default());
    let request = &body["reportRequests"][0];

    assert_eq!(body["reportRequests"].as_array().unwrap().len(), 1);
    assert_eq!(request["viewId"], "123");
    assert_eq!(request["dimensions"], json!([{ "name": "ga:segment" }]));
    assert_eq!(request["metrics"], json!([{ "expression": "ga:pageviews" }]));
    assert_eq!(
        request["dateRanges"],
        json!([{ "startDate": "7daysAgo", "endDate": "today" }])
    );

    let names: Vec<&str> = request["segments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["dynamicSegment"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Faculty Users", "Staff Users", "Student Users", "Welcome Users"]
    );

    let staff_filter = &request["segments"][1]["dynamicSegment"]["userSegment"]["segmentFilters"]
        [0]["simpleSegment"]["orFiltersForSegment"]["segmentFilterClauses"][0]["dimensionFilter"];
    assert_eq!(
        staff_filter,
        &json!({
            "dimensionName": "ga:pagePath",
            "operator": "PARTIAL",
            "expressions": ["/staff"]
        })
    );
}

#[test]
fn test_top_clicks_request() {
    let body = build_top_clicks_request("123", &range("30daysAgo", "yesterday"));
    let request = &body["reportRequests"][0];

    assert_eq!(request["pageSize"], 10);
    assert_eq!(request["metrics"], json!([{ "expression": "ga:totalEvents" }]));
    assert_eq!(
        request["dimensions"],
        json!([{ "name": "ga:eventAction" }, { "name": "ga:eventLabel" }])
    );
    assert_eq!(
        request["orderBys"],
        json!([{ "fieldName": "ga:totalEvents", "sortOrder": "DESCENDING" }])
    );
    assert_eq!(request["dateRanges"][0]["startDate"], "30daysAgo");
    assert_eq!(request["dateRanges"][0]["endDate"], "yesterday");
}

#[test]
fn test_clicks_on_request_filters_exact_label() {
    let body = build_clicks_on_request("123", "Apply Now", &range("2024-01-01", "today"));
    let request = &body["reportRequests"][0];

    assert_eq!(
        request["dimensionFilterClauses"],
        json!([{
            "filters": [{
                "dimensionName": "ga:eventLabel",
                "operator": "EXACT",
                "expressions": ["Apply Now"]
            }]
        }])
    );
    assert_eq!(request["dimensions"], json!([{ "name": "ga:date" }]));
    assert_eq!(
        request["orderBys"],
        json!([{ "fieldName": "ga:date", "sortOrder": "DESCENDING" }])
    );
    assert!(request.get("pageSize").is_none());
}
