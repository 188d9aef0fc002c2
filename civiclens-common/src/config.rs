//! Bootstrap configuration loading and root folder resolution
//!
//! Two-tier configuration: a minimal TOML bootstrap file (cannot change
//! while running) plus environment variable overrides. Runtime data (the
//! SQLite database) lives inside the resolved root folder.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Bootstrap configuration loaded from TOML file
///
/// These settings cannot change during runtime. The service must restart
/// to pick up changes to the TOML file.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    /// Root folder for service data (optional)
    ///
    /// If not specified, resolution falls through to the environment
    /// variable and then the OS-dependent compiled default.
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP server port (default: 5830)
    #[serde(default)]
    pub port: Option<u16>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// API key for the external vision model service
    #[serde(default)]
    pub model_api_key: Option<String>,

    /// Ordered vision model candidate identifiers, most capable first
    #[serde(default)]
    pub model_candidates: Option<Vec<String>>,

    /// API key for the point-of-interest search service
    #[serde(default)]
    pub poi_api_key: Option<String>,

    /// Endpoint that receives authority alert dispatches
    #[serde(default)]
    pub dispatch_url: Option<String>,

    /// Per-deployment additions to the authority name block-list
    #[serde(default)]
    pub authority_blocklist_extra: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Compiled per-platform defaults used when no configuration is present
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = if cfg!(target_os = "linux") {
            dirs::data_local_dir()
                .map(|d| d.join("civiclens"))
                .unwrap_or_else(|| PathBuf::from("/var/lib/civiclens"))
        } else if cfg!(target_os = "macos") {
            dirs::data_dir()
                .map(|d| d.join("civiclens"))
                .unwrap_or_else(|| PathBuf::from("/Library/Application Support/civiclens"))
        } else if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .map(|d| d.join("civiclens"))
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\civiclens"))
        } else {
            PathBuf::from("./civiclens_data")
        };

        Self {
            root_folder,
            log_level: default_log_level(),
        }
    }
}

/// Locate the bootstrap TOML file for a module
///
/// Checks the user config directory first, then the system-wide path on
/// Linux. Returns None when no file exists; a missing config file must
/// never cause termination.
pub fn config_file_path(module_name: &str) -> Option<PathBuf> {
    let file_name = format!("{}.toml", module_name);

    if let Some(dir) = dirs::config_dir() {
        let user_config = dir.join("civiclens").join(&file_name);
        if user_config.exists() {
            return Some(user_config);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/civiclens").join(&file_name);
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Load the bootstrap TOML config for a module
///
/// Missing files yield defaults with a warning; malformed files are an
/// error since silently ignoring operator configuration is worse than
/// refusing to start.
pub fn load_toml_config(module_name: &str) -> Result<TomlConfig> {
    match config_file_path(module_name) {
        Some(path) => {
            let content = std::fs::read_to_string(&path)?;
            let config: TomlConfig = toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
            info!("Loaded bootstrap config from {}", path.display());
            Ok(config)
        }
        None => {
            warn!(
                module = module_name,
                "No bootstrap config file found, using defaults"
            );
            Ok(TomlConfig::default())
        }
    }
}

/// Root folder resolution
///
/// Priority order:
/// 1. `CIVICLENS_ROOT_FOLDER` environment variable
/// 2. TOML config file `root_folder` key
/// 3. OS-dependent compiled default
pub struct RootFolderResolver<'a> {
    module_name: &'a str,
    toml_config: &'a TomlConfig,
}

impl<'a> RootFolderResolver<'a> {
    pub fn new(module_name: &'a str, toml_config: &'a TomlConfig) -> Self {
        Self {
            module_name,
            toml_config,
        }
    }

    pub fn resolve(&self) -> PathBuf {
        if let Ok(path) = std::env::var("CIVICLENS_ROOT_FOLDER") {
            if !path.trim().is_empty() {
                info!(
                    module = self.module_name,
                    root_folder = %path,
                    "Root folder resolved from environment"
                );
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_config.root_folder {
            info!(
                module = self.module_name,
                root_folder = %path.display(),
                "Root folder resolved from TOML config"
            );
            return path.clone();
        }

        let defaults = CompiledDefaults::for_current_platform();
        info!(
            module = self.module_name,
            root_folder = %defaults.root_folder.display(),
            "Root folder resolved from compiled default"
        );
        defaults.root_folder
    }
}

/// Root folder initialization: directory and database path handling
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder directory if it does not exist
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    /// Path of the shared SQLite database inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join("civiclens.db")
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiled_defaults_are_nonempty() {
        let defaults = CompiledDefaults::for_current_platform();
        assert!(!defaults.root_folder.as_os_str().is_empty());
        assert_eq!(defaults.log_level, "info");
    }

    #[test]
    fn toml_config_parses_all_fields() {
        let config: TomlConfig = toml::from_str(
            r#"
            root_folder = "/tmp/civiclens-test"
            port = 5831
            model_api_key = "model-key"
            model_candidates = ["gemini-2.5-flash", "gemini-1.5-pro"]
            poi_api_key = "poi-key"
            dispatch_url = "https://dispatch.example/alerts"
            authority_blocklist_extra = ["cafe"]

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.root_folder, Some(PathBuf::from("/tmp/civiclens-test")));
        assert_eq!(config.port, Some(5831));
        assert_eq!(config.model_api_key.as_deref(), Some("model-key"));
        assert_eq!(
            config.model_candidates.as_deref(),
            Some(&["gemini-2.5-flash".to_string(), "gemini-1.5-pro".to_string()][..])
        );
        assert_eq!(config.poi_api_key.as_deref(), Some("poi-key"));
        assert_eq!(config.authority_blocklist_extra, vec!["cafe".to_string()]);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert!(config.root_folder.is_none());
        assert!(config.port.is_none());
        assert!(config.model_api_key.is_none());
        assert!(config.authority_blocklist_extra.is_empty());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn initializer_database_path_is_inside_root() {
        let init = RootFolderInitializer::new(PathBuf::from("/data/civiclens"));
        assert_eq!(
            init.database_path(),
            PathBuf::from("/data/civiclens/civiclens.db")
        );
    }
}
