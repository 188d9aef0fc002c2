//! Evidence image handling

use base64::Engine;
use civiclens_common::Error;
use serde::{Deserialize, Serialize};

const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

/// Base64-encoded evidence image with its declared media type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceImage {
    pub media_type: String,
    /// Base64 payload without any data-URL prefix
    pub data: String,
}

impl EvidenceImage {
    /// Build from client-supplied image data
    ///
    /// Accepts either a bare base64 payload or a `data:<mime>;base64,...`
    /// URL. The media type embedded in a data URL wins over the declared
    /// one. The payload must decode as base64.
    pub fn from_client_data(raw: &str, declared_media_type: Option<&str>) -> Result<Self, Error> {
        if raw.trim().is_empty() {
            return Err(Error::InvalidInput("No image data provided".to_string()));
        }

        let (media_type, payload) = match raw.split_once(",") {
            Some((prefix, payload)) if prefix.starts_with("data:") => {
                let mime = prefix
                    .strip_prefix("data:")
                    .and_then(|p| p.strip_suffix(";base64"))
                    .filter(|m| !m.is_empty())
                    .map(|m| m.to_string());
                (mime, payload)
            }
            _ => (None, raw),
        };

        let media_type = media_type
            .or_else(|| declared_media_type.map(|m| m.to_string()))
            .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string());

        let payload = payload.trim();
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| Error::InvalidInput(format!("Image is not valid base64: {}", e)))?;

        Ok(Self {
            media_type,
            data: payload.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bare_base64() {
        let image = EvidenceImage::from_client_data("aGVsbG8=", None).unwrap();
        assert_eq!(image.media_type, "image/jpeg");
        assert_eq!(image.data, "aGVsbG8=");
    }

    #[test]
    fn data_url_media_type_wins_over_declared() {
        let image =
            EvidenceImage::from_client_data("data:image/png;base64,aGVsbG8=", Some("image/jpeg"))
                .unwrap();
        assert_eq!(image.media_type, "image/png");
        assert_eq!(image.data, "aGVsbG8=");
    }

    #[test]
    fn declared_media_type_used_for_bare_payload() {
        let image = EvidenceImage::from_client_data("aGVsbG8=", Some("image/webp")).unwrap();
        assert_eq!(image.media_type, "image/webp");
    }

    #[test]
    fn rejects_empty_and_invalid_payloads() {
        assert!(EvidenceImage::from_client_data("", None).is_err());
        assert!(EvidenceImage::from_client_data("   ", None).is_err());
        assert!(EvidenceImage::from_client_data("not!!base64@@", None).is_err());
    }
}
