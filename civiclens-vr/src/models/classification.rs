//! Violation verdict produced by classifying one image

use serde::{Deserialize, Serialize};

use super::routing::{Intent, CIVIC_TERMS};

/// Closed violation category enumeration
///
/// The model emits free text; it is constrained to this enumeration via
/// the shared routing keyword tables so that downstream authority routing
/// has a stable input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Traffic,
    Environmental,
    Industrial,
    Civic,
    None,
}

impl Category {
    /// Constrain free model text to the closed enumeration
    pub fn from_model_text(text: &str) -> Self {
        let lower = text.trim().to_lowercase();

        if lower.is_empty() || lower == "none" || lower == "n/a" {
            Category::None
        } else if Intent::matches_traffic(&lower) {
            Category::Traffic
        } else if lower.contains("industrial") {
            Category::Industrial
        } else if Intent::matches_environmental(&lower) {
            Category::Environmental
        } else if CIVIC_TERMS.iter().any(|t| lower.contains(t)) {
            Category::Civic
        } else {
            // Unrecognized but non-empty category text: treat as a general
            // civic issue rather than silently claiming compliance.
            Category::Civic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Traffic => "Traffic",
            Category::Environmental => "Environmental",
            Category::Industrial => "Industrial",
            Category::Civic => "Civic",
            Category::None => "None",
        }
    }
}

/// Violation severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn from_model_text(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "high" => Severity::High,
            "low" => Severity::Low,
            _ => Severity::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

/// Evidence confidence for a verdict
///
/// Ambiguous scenes must surface as `InsufficientEvidence` rather than a
/// silent "no violation"; such verdicts are non-actionable but remain
/// distinguishable from confirmed-compliant scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Confirmed,
    InsufficientEvidence,
}

/// Structured result of classifying one image
///
/// Immutable once produced; consumed once by the report assembler or
/// discarded by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationVerdict {
    pub violation_detected: bool,
    pub category: Category,
    pub title: String,
    pub description: String,
    pub applicable_law: String,
    pub estimated_fine: String,
    pub severity: Severity,
    pub preventive_action: String,
    pub confidence: Confidence,
    /// True when the model responded but its output could not be coerced
    /// to the verdict schema. Distinguishes normalizer fallback from a
    /// genuine compliant-scene verdict for telemetry.
    #[serde(default)]
    pub parse_error: bool,
}

impl ViolationVerdict {
    /// Fallback verdict for unparseable model output
    pub fn unparseable() -> Self {
        Self {
            violation_detected: false,
            category: Category::None,
            title: "Unreadable analysis result".to_string(),
            description: "The vision model returned output that could not be interpreted"
                .to_string(),
            applicable_law: "N/A".to_string(),
            estimated_fine: "N/A".to_string(),
            severity: Severity::Medium,
            preventive_action: "Retry the analysis".to_string(),
            confidence: Confidence::InsufficientEvidence,
            parse_error: true,
        }
    }

    /// Whether a report may be filed from this verdict
    ///
    /// Requires a detected violation with confirmed evidence and a clean
    /// parse. Insufficient-evidence and fallback verdicts never route.
    pub fn is_actionable(&self) -> bool {
        self.violation_detected && !self.parse_error && self.confidence == Confidence::Confirmed
    }
}
