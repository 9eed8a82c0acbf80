//! Google Analytics Reporting API v4 access

pub mod auth;
pub mod client;
pub mod report;
pub mod requests;

pub use client::{AnalyticsClient, ReportingApi};
pub use report::{Report, ReportRow};
