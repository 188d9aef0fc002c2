//! Report assembly and submission
//!
//! Combines a verdict, reporter identity, location, and evidence into a
//! persisted report. Authorization is checked before any side effect;
//! authority resolution happens internally; persistence is the success
//! criterion and notification dispatch is best-effort.

use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use civiclens_common::Error;

use crate::db;
use crate::models::{
    EvidenceImage, GeoPoint, ReportStatus, ViolationReport, ViolationVerdict,
};
use crate::services::authority_resolver::AuthorityResolver;
use crate::services::notifier::AuthorityNotifier;

/// One report submission from a verified reporter
#[derive(Debug, Clone)]
pub struct ReportSubmission {
    /// Opaque reporter identity key from the auth layer
    pub reporter_email: String,
    pub verdict: ViolationVerdict,
    /// Human-readable administrative area name
    pub place: String,
    pub position: GeoPoint,
    pub evidence: EvidenceImage,
    pub offense_date: Option<String>,
    pub offense_time: Option<String>,
}

/// Assembles and persists violation reports
pub struct ReportAssembler {
    db: SqlitePool,
    resolver: Arc<AuthorityResolver>,
    notifier: Arc<dyn AuthorityNotifier>,
}

impl ReportAssembler {
    pub fn new(
        db: SqlitePool,
        resolver: Arc<AuthorityResolver>,
        notifier: Arc<dyn AuthorityNotifier>,
    ) -> Self {
        Self {
            db,
            resolver,
            notifier,
        }
    }

    /// Submit a report: authorize, resolve, persist, dispatch
    ///
    /// The record is written exactly once; the single Pending→Forwarded
    /// status hop follows the dispatch attempt and is never reverted.
    pub async fn submit(&self, submission: ReportSubmission) -> Result<ViolationReport, Error> {
        if submission.reporter_email.trim().is_empty() {
            return Err(Error::Unauthorized(
                "Report submission requires a reporter identity".to_string(),
            ));
        }

        let verdict = &submission.verdict;
        if !verdict.violation_detected {
            return Err(Error::InvalidInput(
                "No violation detected; nothing to report".to_string(),
            ));
        }
        if !verdict.is_actionable() {
            return Err(Error::InvalidInput(
                "Verdict is not actionable (insufficient or unreadable evidence)".to_string(),
            ));
        }

        let authority = self
            .resolver
            .resolve(verdict.category.as_str(), &submission.place, submission.position)
            .await;

        let now = Utc::now();
        let mut report = ViolationReport {
            report_id: Uuid::new_v4(),
            reporter_email: submission.reporter_email.trim().to_string(),
            title: verdict.title.clone(),
            category: verdict.category,
            severity: verdict.severity,
            description: describe(verdict),
            location: submission.place.clone(),
            evidence_image: submission.evidence.data.clone(),
            status: ReportStatus::Pending,
            forwarded_to: authority.name.clone(),
            authority_confidence: authority.confidence,
            offense_date: submission
                .offense_date
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| now.format("%d/%m/%Y").to_string()),
            offense_time: submission
                .offense_time
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| now.format("%H:%M:%S").to_string()),
            created_at: now,
        };

        // Persistence failure is fatal to the submission; nothing below
        // may run before the record exists.
        db::reports::insert_report(&self.db, &report).await?;

        tracing::info!(
            report_id = %report.report_id,
            reporter = %report.reporter_email,
            authority = %report.forwarded_to,
            authority_confidence = authority.confidence.as_str(),
            "Report persisted"
        );

        if let Err(e) = self.notifier.dispatch(&report).await {
            tracing::error!(
                report_id = %report.report_id,
                error = %e,
                "Authority alert dispatch failed (report persistence unaffected)"
            );
        }

        match db::reports::mark_forwarded(&self.db, report.report_id).await {
            Ok(true) => report.status = ReportStatus::Forwarded,
            Ok(false) => {}
            Err(e) => {
                tracing::error!(
                    report_id = %report.report_id,
                    error = %e,
                    "Failed to mark report forwarded; record remains Pending"
                );
            }
        }

        Ok(report)
    }
}

/// Report description, folding the legal citation in when present
fn describe(verdict: &ViolationVerdict) -> String {
    if verdict.applicable_law.trim().is_empty() || verdict.applicable_law == "N/A" {
        verdict.description.clone()
    } else {
        format!("{}. Law: {}.", verdict.description, verdict.applicable_law)
    }
}
