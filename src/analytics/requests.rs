//! `reports:batchGet` request bodies, one builder per bot command.

use serde_json::{Value, json};

use crate::core::config::SegmentSettings;
use crate::core::models::DateRange;

pub const METRIC_PAGEVIEWS: &str = "ga:pageviews";
pub const METRIC_TOTAL_EVENTS: &str = "ga:totalEvents";
pub const DIMENSION_SEGMENT: &str = "ga:segment";
pub const DIMENSION_PAGE_PATH: &str = "ga:pagePath";
pub const DIMENSION_EVENT_ACTION: &str = "ga:eventAction";
pub const DIMENSION_EVENT_LABEL: &str = "ga:eventLabel";
pub const DIMENSION_DATE: &str = "ga:date";

pub const TOP_CLICKS_PAGE_SIZE: u32 = 10;

fn date_ranges(range: &DateRange) -> Value {
    json!([{ "startDate": range.start, "endDate": range.end }])
}

fn wrap(report_request: Value) -> Value {
    json!({ "reportRequests": [report_request] })
}

/// A dynamic user segment matching sessions whose page path contains `expression`.
#[must_use]
pub fn page_path_segment(name: &str, expression: &str) -> Value {
    json!({
        "dynamicSegment": {
            "name": name,
            "userSegment": {
                "segmentFilters": [{
                    "simpleSegment": {
                        "orFiltersForSegment": {
                            "segmentFilterClauses": [{
                                "dimensionFilter": {
                                    "dimensionName": DIMENSION_PAGE_PATH,
                                    "operator": "PARTIAL",
                                    "expressions": [expression]
                                }
                            }]
                        }
                    }
                }]
            }
        }
    })
}

/// Pageviews split by the four audience segments.
#[must_use]
pub fn build_pageviews_request(
    view_id: &str,
    segments: &SegmentSettings,
    range: &DateRange,
) -> Value {
    let segments: Vec<Value> = segments
        .named()
        .iter()
        .map(|(name, expression)| page_path_segment(name, expression))
        .collect();

    wrap(json!({
        "viewId": view_id,
        "dimensions": [{ "name": DIMENSION_SEGMENT }],
        "dateRanges": date_ranges(range),
        "metrics": [{ "expression": METRIC_PAGEVIEWS }],
        "segments": segments
    }))
}

/// Ten most frequent event action/label pairs.
#[must_use]
pub fn build_top_clicks_request(view_id: &str, range: &DateRange) -> Value {
    wrap(json!({
        "viewId": view_id,
        "pageSize": TOP_CLICKS_PAGE_SIZE,
        "dateRanges": date_ranges(range),
        "metrics": [{ "expression": METRIC_TOTAL_EVENTS }],
        "dimensions": [
            { "name": DIMENSION_EVENT_ACTION },
            { "name": DIMENSION_EVENT_LABEL }
        ],
        "orderBys": [{
            "fieldName": METRIC_TOTAL_EVENTS,
            "sortOrder": "DESCENDING"
        }]
    }))
}

/// Daily event totals for a single event label, newest day first.
#[must_use]
pub fn build_clicks_on_request(view_id: &str, link_label: &str, range: &DateRange) -> Value {
    wrap(json!({
        "viewId": view_id,
        "dateRanges": date_ranges(range),
        "metrics": [{ "expression": METRIC_TOTAL_EVENTS }],
        "dimensionFilterClauses": [{
            "filters": [{
                "dimensionName": DIMENSION_EVENT_LABEL,
                "operator": "EXACT",
                "expressions": [link_label]
            }]
        }],
        "dimensions": [{ "name": DIMENSION_DATE }],
        "orderBys": [{
            "fieldName": DIMENSION_DATE,
            "sortOrder": "DESCENDING"
        }]
    }))
}
