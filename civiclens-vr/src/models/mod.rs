//! Domain models for civiclens-vr

pub mod classification;
pub mod evidence;
pub mod report;
pub mod routing;

pub use classification::{Category, Confidence, Severity, ViolationVerdict};
pub use evidence::EvidenceImage;
pub use report::{ReportStatus, ViolationReport};
pub use routing::{AuthorityConfidence, AuthorityMatch, GeoPoint, Intent};
