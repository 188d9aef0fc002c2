//! Violation classifier
//!
//! Composes the enforcement prompt, invokes the model gateway, and
//! normalizes the raw output into a typed verdict. The prompt instructs
//! the model to judge only visible evidence and to mark ambiguous scenes
//! as insufficient evidence instead of defaulting to "no violation";
//! the structured `confidence` field makes that policy checkable in code.

use std::sync::Arc;

use crate::models::{EvidenceImage, ViolationVerdict};
use crate::services::model_gateway::{ModelError, ModelGateway};
use crate::services::normalizer;

/// Image classifier producing violation verdicts
pub struct ViolationClassifier {
    gateway: Arc<ModelGateway>,
}

impl ViolationClassifier {
    pub fn new(gateway: Arc<ModelGateway>) -> Self {
        Self { gateway }
    }

    /// Classify one image for the given administrative area
    ///
    /// Gateway exhaustion propagates as an error with no partial verdict;
    /// unparseable model output becomes a marked fallback verdict.
    pub async fn classify(
        &self,
        image: &EvidenceImage,
        place: &str,
    ) -> Result<ViolationVerdict, ModelError> {
        let prompt = enforcement_prompt(place);

        let raw = self.gateway.generate(&prompt, Some(image)).await?;
        let verdict = normalizer::parse_verdict(&raw);

        tracing::info!(
            place = %place,
            violation_detected = verdict.violation_detected,
            category = verdict.category.as_str(),
            severity = verdict.severity.as_str(),
            parse_error = verdict.parse_error,
            "Image classified"
        );

        Ok(verdict)
    }
}

/// Fixed-structure enforcement prompt
fn enforcement_prompt(place: &str) -> String {
    format!(
        r#"You are an AI Environmental and Traffic Compliance Analyst for {place}, India.

CRITICAL INSTRUCTIONS:
- Analyze ONLY what is VISIBLE in the image
- Do NOT assume facts that cannot be seen
- If a violation is visible, report it
- If evidence is ambiguous or NOT clearly visible, set "confidence" to "insufficient_evidence"
- Do NOT default to "no violation" unless the scene is clearly compliant

CHECK STRICTLY FOR:

1. Traffic Violations:
   - Rider without helmet
   - Driver without seatbelt
   - Obscured / missing number plate

2. Environmental Violations:
   - Open burning of waste
   - Thick black smoke
   - Burning of tires, plastic, chemical containers

3. Industrial Violations:
   - Illegal waste dumping
   - Uncontrolled emissions

4. Civic Issues:
   - Road damage, encroachment

RETURN JSON ONLY (NO MARKDOWN, NO EXTRA TEXT):

{{
  "violation_detected": true | false,
  "category": "Traffic" | "Environmental" | "Industrial" | "Civic" | "None",
  "title": "Precise violation name",
  "description": "What is clearly visible in the image",
  "applicable_law": "Relevant Indian Act and Section or N/A",
  "estimated_fine": "Amount in Indian Rupees or N/A",
  "severity": "High" | "Medium" | "Low",
  "preventive_action": "Corrective action",
  "confidence": "confirmed" | "insufficient_evidence"
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::model_gateway::VisionModel;
    use async_trait::async_trait;

    struct FixedModel(String);

    #[async_trait]
    impl VisionModel for FixedModel {
        fn id(&self) -> &str {
            "fixed"
        }

        async fn invoke(
            &self,
            prompt: &str,
            image: Option<&EvidenceImage>,
        ) -> Result<String, ModelError> {
            assert!(prompt.contains("Thrissur"));
            assert!(image.is_some());
            Ok(self.0.clone())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl VisionModel for FailingModel {
        fn id(&self) -> &str {
            "failing"
        }

        async fn invoke(
            &self,
            _prompt: &str,
            _image: Option<&EvidenceImage>,
        ) -> Result<String, ModelError> {
            Err(ModelError::NetworkError("down".to_string()))
        }
    }

    fn test_image() -> EvidenceImage {
        EvidenceImage::from_client_data("aGVsbG8=", None).unwrap()
    }

    #[tokio::test]
    async fn classify_parses_model_output() {
        let model = Arc::new(FixedModel(
            r#"```json
            {"violation_detected": true, "category": "Traffic", "title": "No helmet",
             "severity": "High", "confidence": "confirmed"}
            ```"#
                .to_string(),
        ));
        let classifier = ViolationClassifier::new(Arc::new(ModelGateway::new(vec![model])));

        let verdict = classifier.classify(&test_image(), "Thrissur").await.unwrap();

        assert!(verdict.violation_detected);
        assert!(verdict.is_actionable());
        assert_eq!(verdict.title, "No helmet");
    }

    #[tokio::test]
    async fn gateway_exhaustion_propagates_as_error() {
        let classifier = ViolationClassifier::new(Arc::new(ModelGateway::new(vec![
            Arc::new(FailingModel),
        ])));

        let result = classifier.classify(&test_image(), "Thrissur").await;

        assert!(matches!(result, Err(ModelError::AllModelsUnavailable)));
    }

    #[test]
    fn prompt_embeds_place_and_schema() {
        let prompt = enforcement_prompt("Kochi");
        assert!(prompt.contains("Kochi"));
        assert!(prompt.contains("violation_detected"));
        assert!(prompt.contains("insufficient_evidence"));
        assert!(prompt.contains("RETURN JSON ONLY"));
    }
}
