//! Configuration resolution for civiclens-vr
//!
//! API keys resolve Environment → TOML. Multiple configured sources get a
//! warning since that usually signals a stale config file.

use civiclens_common::config::TomlConfig;
use civiclens_common::{Error, Result};
use tracing::{info, warn};

use crate::services::model_gateway::DEFAULT_MODEL_CANDIDATES;

/// Default HTTP port for civiclens-vr
pub const DEFAULT_PORT: u16 = 5830;

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve the vision model API key
///
/// **Priority:** Environment → TOML. A missing key is a startup error:
/// the service cannot classify anything without it.
pub fn resolve_model_api_key(toml_config: &TomlConfig) -> Result<String> {
    let env_key = std::env::var("CIVICLENS_MODEL_API_KEY")
        .ok()
        .filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .model_api_key
        .clone()
        .filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!("Model API key found in environment and TOML. Using environment (highest priority).");
    }

    if let Some(key) = env_key {
        info!("Model API key loaded from environment variable");
        return Ok(key);
    }

    if let Some(key) = toml_key {
        info!("Model API key loaded from TOML config");
        return Ok(key);
    }

    Err(Error::Config(
        "Model API key not configured. Please configure using one of:\n\
         1. Environment: CIVICLENS_MODEL_API_KEY=your-key-here\n\
         2. TOML config: ~/.config/civiclens/civiclens-vr.toml (model_api_key = \"your-key\")"
            .to_string(),
    ))
}

/// Resolve the POI search API key
///
/// **Priority:** Environment → TOML. Unlike the model key this one is
/// optional: without it, authority routing degrades to synthesized names.
pub fn resolve_poi_api_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var("CIVICLENS_POI_API_KEY")
        .ok()
        .filter(|k| is_valid_key(k));
    let toml_key = toml_config.poi_api_key.clone().filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!("POI API key found in environment and TOML. Using environment (highest priority).");
    }

    let key = env_key.or(toml_key);
    if key.is_none() {
        warn!("No POI API key configured; authority routing will use synthesized names only");
    }
    key
}

/// Ordered vision model candidate list
///
/// TOML override wins; otherwise the compiled default list, newest first.
pub fn model_candidates(toml_config: &TomlConfig) -> Vec<String> {
    match &toml_config.model_candidates {
        Some(candidates) if !candidates.is_empty() => candidates.clone(),
        _ => DEFAULT_MODEL_CANDIDATES
            .iter()
            .map(|id| id.to_string())
            .collect(),
    }
}

/// HTTP port, TOML override or default
pub fn port(toml_config: &TomlConfig) -> u16 {
    toml_config.port.unwrap_or(DEFAULT_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn key_validation_rejects_blank() {
        assert!(is_valid_key("abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }

    #[test]
    #[serial]
    fn model_key_env_beats_toml() {
        std::env::set_var("CIVICLENS_MODEL_API_KEY", "env-key");
        let config = TomlConfig {
            model_api_key: Some("toml-key".to_string()),
            ..TomlConfig::default()
        };

        assert_eq!(resolve_model_api_key(&config).unwrap(), "env-key");

        std::env::remove_var("CIVICLENS_MODEL_API_KEY");
    }

    #[test]
    #[serial]
    fn missing_model_key_is_a_config_error() {
        std::env::remove_var("CIVICLENS_MODEL_API_KEY");
        let result = resolve_model_api_key(&TomlConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    #[serial]
    fn missing_poi_key_degrades_to_none() {
        std::env::remove_var("CIVICLENS_POI_API_KEY");
        assert!(resolve_poi_api_key(&TomlConfig::default()).is_none());
    }

    #[test]
    fn candidate_list_defaults_when_unset() {
        let candidates = model_candidates(&TomlConfig::default());
        assert_eq!(candidates.first().map(String::as_str), Some("gemini-2.5-flash"));
        assert_eq!(candidates.len(), DEFAULT_MODEL_CANDIDATES.len());
    }

    #[test]
    fn candidate_list_respects_toml_override() {
        let config = TomlConfig {
            model_candidates: Some(vec!["model-x".to_string()]),
            ..TomlConfig::default()
        };
        assert_eq!(model_candidates(&config), vec!["model-x".to_string()]);
    }
}
