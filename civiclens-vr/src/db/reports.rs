//! Violation report database operations

use sqlx::{Row, SqlitePool};
use uuid::Uuid;
use civiclens_common::Result;

use crate::models::{
    AuthorityConfidence, Category, ReportStatus, Severity, ViolationReport,
};

/// Insert a new report
///
/// One atomic write: the report is either fully created or not created at
/// all.
pub async fn insert_report(pool: &SqlitePool, report: &ViolationReport) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reports (
            report_id, reporter_email, title, category, severity,
            description, location, evidence_image, status, forwarded_to,
            authority_confidence, offense_date, offense_time, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(report.report_id.to_string())
    .bind(&report.reporter_email)
    .bind(&report.title)
    .bind(report.category.as_str())
    .bind(report.severity.as_str())
    .bind(&report.description)
    .bind(&report.location)
    .bind(&report.evidence_image)
    .bind(report.status.as_str())
    .bind(&report.forwarded_to)
    .bind(report.authority_confidence.as_str())
    .bind(&report.offense_date)
    .bind(&report.offense_time)
    .bind(report.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Mark a pending report as forwarded
///
/// The status hop happens exactly once; an already-forwarded report is
/// left untouched.
pub async fn mark_forwarded(pool: &SqlitePool, report_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE reports SET status = 'Forwarded' WHERE report_id = ? AND status = 'Pending'",
    )
    .bind(report_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Load one report by id
pub async fn load_report(pool: &SqlitePool, report_id: Uuid) -> Result<Option<ViolationReport>> {
    let row = sqlx::query(
        r#"
        SELECT report_id, reporter_email, title, category, severity,
               description, location, evidence_image, status, forwarded_to,
               authority_confidence, offense_date, offense_time, created_at
        FROM reports
        WHERE report_id = ?
        "#,
    )
    .bind(report_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(report_from_row).transpose()
}

/// List reports for one reporter, newest first
pub async fn list_reports_for_reporter(
    pool: &SqlitePool,
    reporter_email: &str,
) -> Result<Vec<ViolationReport>> {
    let rows = sqlx::query(
        r#"
        SELECT report_id, reporter_email, title, category, severity,
               description, location, evidence_image, status, forwarded_to,
               authority_confidence, offense_date, offense_time, created_at
        FROM reports
        WHERE reporter_email = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(reporter_email)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(report_from_row).collect()
}

fn report_from_row(row: sqlx::sqlite::SqliteRow) -> Result<ViolationReport> {
    let report_id: String = row.get("report_id");
    let report_id = Uuid::parse_str(&report_id)
        .map_err(|e| civiclens_common::Error::Internal(format!("Failed to parse report_id: {}", e)))?;

    let created_at: String = row.get("created_at");
    let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| civiclens_common::Error::Internal(format!("Failed to parse created_at: {}", e)))?
        .with_timezone(&chrono::Utc);

    let category: String = row.get("category");
    let severity: String = row.get("severity");
    let status: String = row.get("status");
    let authority_confidence: String = row.get("authority_confidence");

    Ok(ViolationReport {
        report_id,
        reporter_email: row.get("reporter_email"),
        title: row.get("title"),
        category: Category::from_model_text(&category),
        severity: Severity::from_model_text(&severity),
        description: row.get("description"),
        location: row.get("location"),
        evidence_image: row.get("evidence_image"),
        status: ReportStatus::parse(&status),
        forwarded_to: row.get("forwarded_to"),
        authority_confidence: AuthorityConfidence::parse(&authority_confidence),
        offense_date: row.get("offense_date"),
        offense_time: row.get("offense_time"),
        created_at,
    })
}
