use serde::Deserialize;

use crate::errors::BotError;

/// Body of a `reports:batchGet` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchGetResponse {
    #[serde(default)]
    pub reports: Vec<Report>,
}

impl BatchGetResponse {
    /// Every request the bot issues carries exactly one report request.
    ///
    /// # Errors
    ///
    /// Returns `BotError::MalformedReport` if the response holds no report.
    pub fn into_first_report(self) -> Result<Report, BotError> {
        self.reports
            .into_iter()
            .next()
            .ok_or_else(|| BotError::MalformedReport("response contains no reports".to_string()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Report {
    #[serde(default)]
    pub data: ReportData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    #[serde(default)]
    pub rows: Vec<ReportRow>,
    #[serde(default)]
    pub totals: Vec<MetricValues>,
    #[serde(default)]
    pub row_count: Option<u64>,
}

impl ReportData {
    /// First metric of the first date range's precomputed total.
    #[must_use]
    pub fn total(&self) -> Option<&str> {
        self.totals
            .first()
            .and_then(|t| t.values.first())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportRow {
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<MetricValues>,
}

impl ReportRow {
    #[must_use]
    pub fn dimension(&self, index: usize) -> Option<&str> {
        self.dimensions.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn metric_value(&self) -> Option<&str> {
        self.metrics
            .first()
            .and_then(|m| m.values.first())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricValues {
    #[serde(default)]
    pub values: Vec<String>,
}
