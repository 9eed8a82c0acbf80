use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error};

use super::auth::{ServiceAccountAuth, ServiceAccountKey};
use super::report::{BatchGetResponse, Report};
use crate::errors::BotError;

pub const REPORTING_ENDPOINT: &str =
    "https://analyticsreporting.googleapis.com/v4/reports:batchGet";

/// The reporting call every command goes through.
#[async_trait]
pub trait ReportingApi: Send + Sync {
    /// Issues one `reports:batchGet` and returns its first report.
    async fn batch_get(&self, body: Value) -> Result<Report, BotError>;
}

/// Credentialed Analytics Reporting API v4 client.
pub struct AnalyticsClient {
    http: Client,
    auth: ServiceAccountAuth,
    endpoint: String,
}

impl AnalyticsClient {
    #[must_use]
    pub fn new(key: ServiceAccountKey) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            auth: ServiceAccountAuth::new(key, http.clone()),
            http,
            endpoint: REPORTING_ENDPOINT.to_string(),
        }
    }

    /// # Errors
    ///
    /// Returns `BotError::ConfigError` if the key file cannot be loaded.
    pub fn from_key_file(path: &Path) -> Result<Self, BotError> {
        Ok(Self::new(ServiceAccountKey::from_file(path)?))
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl ReportingApi for AnalyticsClient {
    async fn batch_get(&self, body: Value) -> Result<Report, BotError> {
        let token = self.auth.access_token().await?;
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            error!("Analytics API returned {}: {}", status, detail);
            return Err(BotError::AnalyticsError(format!("{}: {}", status, detail)));
        }

        let parsed: BatchGetResponse = resp.json().await?;
        debug!("Analytics API returned {} report(s)", parsed.reports.len());
        parsed.into_first_report()
    }
}
