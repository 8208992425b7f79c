//! Runner configuration loaded from `stagehand.json`.
//!
//! The config file is a drop-in next to the application being deployed.
//! Every field has a built-in default so a missing file is fine; an
//! explicitly requested file that is absent or broken is an error.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::Result;

/// Config file name resolved relative to the working directory.
pub const CONFIG_FILE: &str = "stagehand.json";

/// Root configuration structure for stagehand.json.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StagehandConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via stagehand.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    /// Step names executed by `run`, in order.
    #[serde(default = "default_pipeline")]
    pub pipeline: Vec<String>,

    /// Target environment passed to console steps.
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default)]
    pub toolchain: ToolchainConfig,

    #[serde(default)]
    pub terminal: TerminalConfig,

    /// Source/dest trees for the copy-vendor-assets step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_assets: Option<VendorAssetsConfig>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            pipeline: default_pipeline(),
            environment: default_environment(),
            toolchain: ToolchainConfig::default(),
            terminal: TerminalConfig::default(),
            vendor_assets: None,
        }
    }
}

/// Locations of the external tools the steps invoke.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolchainConfig {
    #[serde(default = "default_php_bin")]
    pub php_bin: String,

    /// Explicit composer location; auto-detected when absent
    /// (composer.phar in the working directory, then PATH).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composer_bin: Option<String>,

    #[serde(default = "default_console_bin")]
    pub console_bin: String,

    /// Fallback COMPOSER_HOME when `$HOME/.composer` does not exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composer_home: Option<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            php_bin: default_php_bin(),
            composer_bin: None,
            console_bin: default_console_bin(),
            composer_home: None,
        }
    }
}

/// Visual settings for the rendered terminal block.
///
/// Width and height constrain the HTML wrapper (in `em`); the colors are
/// names resolved by the renderer for both surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalConfig {
    #[serde(default = "default_terminal_width")]
    pub width: u32,

    #[serde(default = "default_terminal_height")]
    pub height: u32,

    #[serde(default = "default_prompt_color")]
    pub prompt_color: String,

    #[serde(default = "default_success_color")]
    pub success_color: String,

    #[serde(default = "default_error_color")]
    pub error_color: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            width: default_terminal_width(),
            height: default_terminal_height(),
            prompt_color: default_prompt_color(),
            success_color: default_success_color(),
            error_color: default_error_color(),
        }
    }
}

/// Source and destination trees for the vendor-asset copy step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorAssetsConfig {
    pub source: PathBuf,
    pub dest: PathBuf,
}

fn default_pipeline() -> Vec<String> {
    vec![
        "install-dependencies".to_string(),
        "clear-cache".to_string(),
        "dump-assets".to_string(),
    ]
}

fn default_environment() -> String {
    "prod".to_string()
}

fn default_php_bin() -> String {
    "php".to_string()
}

fn default_console_bin() -> String {
    "bin/console".to_string()
}

fn default_terminal_width() -> u32 {
    80
}

fn default_terminal_height() -> u32 {
    50
}

fn default_prompt_color() -> String {
    "tomato".to_string()
}

fn default_success_color() -> String {
    "green".to_string()
}

fn default_error_color() -> String {
    "tomato".to_string()
}

/// Load config for a working directory, falling back to built-in defaults
/// when no usable file is present.
pub fn load_config(work_dir: &Path) -> StagehandConfig {
    load_config_from_file(&work_dir.join(CONFIG_FILE)).unwrap_or_default()
}

/// Load config from an explicit path, surfacing read and parse errors.
pub fn load_config_from_file(path: &Path) -> Result<StagehandConfig> {
    if !path.exists() {
        return Err(Error::config_invalid_value(
            "config",
            Some(path.display().to_string()),
            "config file not found",
        ));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::internal_io(e.to_string(), Some(format!("read {}", path.display()))))?;

    let config: StagehandConfig = serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tempfile::tempdir;

    #[test]
    fn defaults_cover_the_standard_pipeline() {
        let config = StagehandConfig::default();
        assert_eq!(
            config.defaults.pipeline,
            vec!["install-dependencies", "clear-cache", "dump-assets"]
        );
        assert_eq!(config.defaults.environment, "prod");
        assert_eq!(config.defaults.toolchain.php_bin, "php");
        assert_eq!(config.defaults.terminal.width, 80);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(dir.path());
        assert_eq!(config.defaults.environment, "prod");
    }

    #[test]
    fn file_overrides_merge_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"{"defaults":{"environment":"staging","pipeline":["clear-cache"],"vendorAssets":{"source":"vendor/acme/assets","dest":"web/assets"}}}"#,
        )
        .unwrap();

        let config = load_config(dir.path());
        assert_eq!(config.defaults.environment, "staging");
        assert_eq!(config.defaults.pipeline, vec!["clear-cache"]);
        assert_eq!(config.defaults.toolchain.console_bin, "bin/console");
        let vendor = config.defaults.vendor_assets.unwrap();
        assert_eq!(vendor.source, PathBuf::from("vendor/acme/assets"));
    }

    #[test]
    fn broken_json_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{not json").unwrap();

        let err = load_config_from_file(&path).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidJson);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load_config_from_file(Path::new("/nonexistent/stagehand.json")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
    }
}
