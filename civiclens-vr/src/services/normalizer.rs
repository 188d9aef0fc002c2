//! Model output normalization
//!
//! Model text arrives as untrusted prose: the JSON verdict may be wrapped
//! in Markdown code fences or surrounded by commentary. Extraction strips
//! fence markers, slices from the first `{` to the last `}` inclusive, and
//! parses with per-field defaults. Failures yield a marked fallback
//! verdict instead of an error; this code path must never crash the
//! classification pipeline.
//!
//! Pure and synchronous, no I/O.

use serde::Deserialize;

use crate::models::{Category, Confidence, Severity, ViolationVerdict};

/// Verdict wire schema as the prompt demands it from the model
#[derive(Debug, Default, Deserialize)]
struct RawVerdict {
    #[serde(default)]
    violation_detected: bool,
    #[serde(default)]
    category: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    applicable_law: String,
    #[serde(default)]
    estimated_fine: String,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    preventive_action: String,
    #[serde(default)]
    confidence: String,
}

/// Extract the JSON object embedded in raw model text
///
/// Strips all code-fence markers, then slices from the first `{` to the
/// last `}` inclusive. Returns None when no brace pair exists.
pub fn extract_json_object(raw: &str) -> Option<String> {
    let cleaned = raw.replace("```json", "").replace("```", "");

    let first = cleaned.find('{')?;
    let last = cleaned.rfind('}')?;
    if last < first {
        return None;
    }

    Some(cleaned[first..=last].to_string())
}

fn default_or(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

/// Parse raw model text into a typed verdict
///
/// Never fails: unextractable or unparseable output yields the fallback
/// verdict with `parse_error` set, distinguishable from a genuine
/// compliant-scene verdict.
pub fn parse_verdict(raw: &str) -> ViolationVerdict {
    let json = match extract_json_object(raw) {
        Some(json) => json,
        None => {
            tracing::warn!("Model output contained no JSON object");
            return ViolationVerdict::unparseable();
        }
    };

    let raw_verdict: RawVerdict = match serde_json::from_str(&json) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "Model output JSON did not match verdict schema");
            return ViolationVerdict::unparseable();
        }
    };

    let confidence = if raw_verdict.confidence.to_lowercase().contains("insufficient") {
        Confidence::InsufficientEvidence
    } else {
        Confidence::Confirmed
    };

    ViolationVerdict {
        violation_detected: raw_verdict.violation_detected,
        category: Category::from_model_text(&raw_verdict.category),
        title: default_or(raw_verdict.title, "Detected Violation"),
        description: default_or(raw_verdict.description, "No description provided"),
        applicable_law: default_or(raw_verdict.applicable_law, "N/A"),
        estimated_fine: default_or(raw_verdict.estimated_fine, "N/A"),
        severity: Severity::from_model_text(&raw_verdict.severity),
        preventive_action: default_or(raw_verdict.preventive_action, "N/A"),
        confidence,
        parse_error: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_VERDICT: &str = r#"{
        "violation_detected": true,
        "category": "Traffic Violation",
        "title": "Rider without helmet",
        "description": "Two-wheeler rider visible without helmet",
        "applicable_law": "Section 129 MV Act",
        "estimated_fine": "Rs 1000",
        "severity": "High",
        "preventive_action": "Wear a helmet",
        "confidence": "confirmed"
    }"#;

    #[test]
    fn extracts_object_from_code_fences() {
        let raw = format!("```json\n{}\n```", FULL_VERDICT);
        let json = extract_json_object(&raw).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
        assert!(!json.contains("```"));
    }

    #[test]
    fn extracts_object_from_surrounding_prose() {
        let raw = format!("Here is my analysis:\n{}\nLet me know if you need more.", FULL_VERDICT);
        let verdict = parse_verdict(&raw);
        assert!(verdict.violation_detected);
        assert_eq!(verdict.category, Category::Traffic);
        assert_eq!(verdict.severity, Severity::High);
        assert!(!verdict.parse_error);
    }

    #[test]
    fn no_braces_yields_marked_fallback() {
        let verdict = parse_verdict("I could not analyze this image.");
        assert!(verdict.parse_error);
        assert!(!verdict.violation_detected);
        assert_eq!(verdict.category, Category::None);
    }

    #[test]
    fn malformed_json_yields_marked_fallback() {
        let verdict = parse_verdict("{ \"violation_detected\": true, ");
        assert!(verdict.parse_error);
        assert!(!verdict.violation_detected);
    }

    #[test]
    fn reversed_braces_yield_fallback() {
        let verdict = parse_verdict("} nothing here {");
        assert!(verdict.parse_error);
    }

    #[test]
    fn nested_braces_are_kept_whole() {
        let raw = r#"note {"violation_detected": false, "category": "None", "detail": {"x": 1}} done"#;
        let json = extract_json_object(raw).unwrap();
        assert_eq!(
            json,
            r#"{"violation_detected": false, "category": "None", "detail": {"x": 1}}"#
        );
    }

    #[test]
    fn missing_fields_get_defaults_without_parse_error() {
        let verdict = parse_verdict(r#"{"violation_detected": true, "category": "Traffic"}"#);
        assert!(verdict.violation_detected);
        assert!(!verdict.parse_error);
        assert_eq!(verdict.applicable_law, "N/A");
        assert_eq!(verdict.estimated_fine, "N/A");
        assert_eq!(verdict.severity, Severity::Medium);
        assert_eq!(verdict.confidence, Confidence::Confirmed);
    }

    #[test]
    fn insufficient_evidence_marker_is_parsed() {
        let verdict = parse_verdict(
            r#"{"violation_detected": true, "category": "Traffic", "confidence": "insufficient_evidence"}"#,
        );
        assert_eq!(verdict.confidence, Confidence::InsufficientEvidence);
        assert!(!verdict.is_actionable());
    }

    #[test]
    fn fallback_is_distinguishable_from_compliant_scene() {
        let compliant = parse_verdict(r#"{"violation_detected": false, "category": "None"}"#);
        let garbage = parse_verdict("total nonsense");
        assert!(!compliant.parse_error);
        assert!(garbage.parse_error);
        assert_eq!(compliant.violation_detected, garbage.violation_detected);
    }
}
