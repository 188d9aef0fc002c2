//! Persisted violation report entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::classification::{Category, Severity};
use super::routing::AuthorityConfidence;

/// Report lifecycle status
///
/// Single hop Pending → Forwarded, set exactly once, never reverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    Pending,
    Forwarded,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending",
            ReportStatus::Forwarded => "Forwarded",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Forwarded" => ReportStatus::Forwarded,
            _ => ReportStatus::Pending,
        }
    }
}

/// Persisted violation report
///
/// Owned by the reporting account; `forwarded_to` is set at creation and
/// immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationReport {
    pub report_id: Uuid,
    pub reporter_email: String,
    pub title: String,
    pub category: Category,
    pub severity: Severity,
    pub description: String,
    pub location: String,
    pub evidence_image: String,
    pub status: ReportStatus,
    pub forwarded_to: String,
    pub authority_confidence: AuthorityConfidence,
    pub offense_date: String,
    pub offense_time: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        assert_eq!(ReportStatus::parse("Pending"), ReportStatus::Pending);
        assert_eq!(ReportStatus::parse("Forwarded"), ReportStatus::Forwarded);
        assert_eq!(ReportStatus::Forwarded.as_str(), "Forwarded");
    }
}
