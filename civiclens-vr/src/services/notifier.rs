//! Authority alert dispatch
//!
//! Best-effort side effect: the assembler persists first, then hands the
//! finished report to the dispatch endpoint. Delivery failure is logged
//! and never surfaced to the reporting user; report persistence is the
//! success criterion.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::ViolationReport;

const USER_AGENT: &str = "CivicLens/0.1.0 (https://github.com/civiclens/civiclens)";
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Notification dispatch errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Dispatch endpoint error {0}: {1}")]
    EndpointError(u16, String),
}

/// Outbound alert payload carried to the authority
#[derive(Debug, Serialize)]
pub struct AuthorityAlert<'a> {
    /// Short human-readable case reference
    pub reference: String,
    pub authority: &'a str,
    pub reporter_email: &'a str,
    pub title: &'a str,
    pub category: &'a str,
    pub severity: &'a str,
    pub location: &'a str,
    pub description: &'a str,
    pub offense_date: &'a str,
    pub offense_time: &'a str,
    pub evidence_image: &'a str,
}

impl<'a> AuthorityAlert<'a> {
    pub fn from_report(report: &'a ViolationReport) -> Self {
        Self {
            reference: case_reference(report),
            authority: &report.forwarded_to,
            reporter_email: &report.reporter_email,
            title: &report.title,
            category: report.category.as_str(),
            severity: report.severity.as_str(),
            location: &report.location,
            description: &report.description,
            offense_date: &report.offense_date,
            offense_time: &report.offense_time,
            evidence_image: &report.evidence_image,
        }
    }
}

/// Short case reference derived from the report id (last 6 hex digits)
fn case_reference(report: &ViolationReport) -> String {
    let id = report.report_id.simple().to_string();
    format!("CASE-{}", id[id.len() - 6..].to_uppercase())
}

/// Delivery of authority alerts
#[async_trait]
pub trait AuthorityNotifier: Send + Sync {
    async fn dispatch(&self, report: &ViolationReport) -> Result<(), NotifyError>;
}

/// Posts alerts as JSON to a configured dispatch endpoint
pub struct HttpNotifier {
    http_client: reqwest::Client,
    dispatch_url: String,
}

impl HttpNotifier {
    pub fn new(dispatch_url: String) -> Result<Self, NotifyError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| NotifyError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            dispatch_url,
        })
    }
}

#[async_trait]
impl AuthorityNotifier for HttpNotifier {
    async fn dispatch(&self, report: &ViolationReport) -> Result<(), NotifyError> {
        let alert = AuthorityAlert::from_report(report);

        let response = self
            .http_client
            .post(&self.dispatch_url)
            .json(&alert)
            .send()
            .await
            .map_err(|e| NotifyError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(NotifyError::EndpointError(status.as_u16(), error_text));
        }

        tracing::info!(
            reference = %alert.reference,
            authority = %report.forwarded_to,
            "Authority alert dispatched"
        );
        Ok(())
    }
}

/// No-op notifier used when no dispatch endpoint is configured
pub struct DisabledNotifier;

#[async_trait]
impl AuthorityNotifier for DisabledNotifier {
    async fn dispatch(&self, report: &ViolationReport) -> Result<(), NotifyError> {
        tracing::info!(
            report_id = %report.report_id,
            authority = %report.forwarded_to,
            "Notification dispatch disabled, skipping alert"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthorityConfidence, Category, ReportStatus, Severity};
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_report() -> ViolationReport {
        ViolationReport {
            report_id: Uuid::parse_str("0191b2c3-d4e5-7f80-9a0b-1c2d3e4fabcd").unwrap(),
            reporter_email: "citizen@example.org".to_string(),
            title: "Rider without helmet".to_string(),
            category: Category::Traffic,
            severity: Severity::High,
            description: "Two-wheeler rider without helmet".to_string(),
            location: "Thrissur".to_string(),
            evidence_image: "aGVsbG8=".to_string(),
            status: ReportStatus::Forwarded,
            forwarded_to: "Thrissur Traffic Police Station".to_string(),
            authority_confidence: AuthorityConfidence::Verified,
            offense_date: "06/08/2026".to_string(),
            offense_time: "14:05:00".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn alert_payload_carries_report_fields() {
        let report = sample_report();
        let alert = AuthorityAlert::from_report(&report);

        assert_eq!(alert.authority, "Thrissur Traffic Police Station");
        assert_eq!(alert.category, "Traffic");
        assert_eq!(alert.severity, "High");
        assert_eq!(alert.reference, "CASE-4FABCD");
    }

    #[tokio::test]
    async fn disabled_notifier_always_succeeds() {
        let report = sample_report();
        assert!(DisabledNotifier.dispatch(&report).await.is_ok());
    }
}
