//! Named deployment operations and the toolchain that runs them.
//!
//! Each operation maps to a fixed external command template plus a default
//! argument set. The copy-vendor-assets operation is the odd one out: it is
//! a local filesystem copy, synthesized into the same result shape.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{ToolchainConfig, VendorAssetsConfig};
use crate::copy;
use crate::error::{Error, Result};
use crate::exec::{self, ArgSpec, ExecutionResult};
use crate::utils::command;

/// A unit of work that can be registered as a hook.
///
/// Arguments are bound at registration time and replayed verbatim when the
/// step runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    InstallDependencies,
    DumpAssets { environment: String },
    ClearCache { environment: String },
    InstallAssets { environment: String },
    CopyVendorAssets { source: PathBuf, dest: PathBuf },
}

impl Operation {
    pub const NAMES: [&'static str; 5] = [
        "install-dependencies",
        "dump-assets",
        "clear-cache",
        "install-assets",
        "copy-vendor-assets",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::InstallDependencies => "install-dependencies",
            Operation::DumpAssets { .. } => "dump-assets",
            Operation::ClearCache { .. } => "clear-cache",
            Operation::InstallAssets { .. } => "install-assets",
            Operation::CopyVendorAssets { .. } => "copy-vendor-assets",
        }
    }

    /// Build an operation from its registered name plus run-scoped settings.
    pub fn from_name(
        name: &str,
        environment: &str,
        vendor_assets: Option<&VendorAssetsConfig>,
    ) -> Result<Self> {
        match name {
            "install-dependencies" => Ok(Operation::InstallDependencies),
            "dump-assets" => Ok(Operation::DumpAssets {
                environment: environment.to_string(),
            }),
            "clear-cache" => Ok(Operation::ClearCache {
                environment: environment.to_string(),
            }),
            "install-assets" => Ok(Operation::InstallAssets {
                environment: environment.to_string(),
            }),
            "copy-vendor-assets" => {
                let vendor = vendor_assets.ok_or_else(|| {
                    Error::validation_invalid_argument(
                        "step",
                        "copy-vendor-assets requires vendorAssets source/dest in config",
                        Some(name.to_string()),
                        None,
                    )
                })?;
                Ok(Operation::CopyVendorAssets {
                    source: vendor.source.clone(),
                    dest: vendor.dest.clone(),
                })
            }
            other => Err(Error::validation_invalid_argument(
                "step",
                format!("Unknown step '{}'", other),
                Some(other.to_string()),
                Some(Self::NAMES.iter().map(|n| n.to_string()).collect()),
            )),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of running one step: the raw execution result plus the adapter's
/// success verdict (`exit code == 0`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub operation: String,
    pub success: bool,
    pub result: ExecutionResult,
}

/// External tool configuration shared by all steps in a run.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub php_bin: String,
    pub composer_bin: String,
    pub console_bin: String,
    pub work_dir: PathBuf,
    pub verbose: bool,
    pub composer_home_override: Option<String>,
}

impl Toolchain {
    /// Resolve tool locations for a working directory.
    ///
    /// Composer resolution mirrors the drop-in layout: a `composer.phar`
    /// beside the application wins, otherwise `composer` from PATH.
    pub fn resolve(work_dir: &Path, config: &ToolchainConfig, verbose: bool) -> Self {
        let composer_bin = match &config.composer_bin {
            Some(bin) => bin.clone(),
            None => detect_composer_bin(work_dir),
        };

        Self {
            php_bin: config.php_bin.clone(),
            composer_bin,
            console_bin: config.console_bin.clone(),
            work_dir: work_dir.to_path_buf(),
            verbose,
            composer_home_override: config.composer_home.clone(),
        }
    }

    /// Run one operation to completion.
    pub fn run_step(&self, operation: &Operation) -> StepResult {
        let result = match operation {
            Operation::InstallDependencies => self.run_composer(
                "install",
                ArgSpec::new().flag("no-dev").flag("optimize-autoloader"),
            ),
            Operation::DumpAssets { environment } => self.run_console("assetic:dump", environment),
            Operation::ClearCache { environment } => self.run_console("cache:clear", environment),
            Operation::InstallAssets { environment } => {
                self.run_console("assets:install", environment)
            }
            Operation::CopyVendorAssets { source, dest } => {
                copy::run_copy(&self.work_dir.join(source), &self.work_dir.join(dest))
            }
        };

        StepResult {
            operation: operation.name().to_string(),
            success: result.success(),
            result,
        }
    }

    fn run_composer(&self, composer_cmd: &str, mut args: ArgSpec) -> ExecutionResult {
        if self.verbose {
            args = args.flag("verbose");
        }

        // COMPOSER_HOME is scoped to composer subprocesses only
        let env = vec![("COMPOSER_HOME".to_string(), self.composer_home())];

        exec::execute(
            &self.php_bin,
            &[self.composer_bin.clone(), composer_cmd.to_string()],
            &args,
            &self.work_dir,
            &env,
        )
    }

    fn run_console(&self, console_cmd: &str, environment: &str) -> ExecutionResult {
        let mut args = ArgSpec::new().value("env", environment);
        if self.verbose {
            args = args.flag("verbose");
        }

        exec::execute(
            &self.php_bin,
            &[self.console_bin.clone(), console_cmd.to_string()],
            &args,
            &self.work_dir,
            &[],
        )
    }

    /// COMPOSER_HOME for composer subprocesses: `$HOME/.composer` when it
    /// exists, else the configured override, else the working directory.
    fn composer_home(&self) -> String {
        if let Ok(home) = std::env::var("HOME") {
            let composer_home = Path::new(&home).join(".composer");
            if composer_home.is_dir() {
                return composer_home.to_string_lossy().into_owned();
            }
        }

        if let Some(override_dir) = &self.composer_home_override {
            let expanded = shellexpand::tilde(override_dir).to_string();
            if Path::new(&expanded).is_dir() {
                return expanded;
            }
        }

        self.work_dir.to_string_lossy().into_owned()
    }
}

fn detect_composer_bin(work_dir: &Path) -> String {
    let local = work_dir.join("composer.phar");
    if local.is_file() {
        return local.to_string_lossy().into_owned();
    }

    command::which("composer").unwrap_or_else(|| "composer".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn echo_toolchain(work_dir: &Path) -> Toolchain {
        Toolchain {
            php_bin: "echo".to_string(),
            composer_bin: "composer.phar".to_string(),
            console_bin: "bin/console".to_string(),
            work_dir: work_dir.to_path_buf(),
            verbose: false,
            composer_home_override: None,
        }
    }

    #[test]
    fn install_dependencies_uses_composer_template() {
        let dir = tempdir().unwrap();
        let step = echo_toolchain(dir.path()).run_step(&Operation::InstallDependencies);

        assert!(step.success);
        assert_eq!(step.operation, "install-dependencies");
        assert_eq!(
            step.result.stdout_lines,
            vec!["composer.phar install --no-dev --optimize-autoloader"]
        );
    }

    #[test]
    fn console_steps_pass_the_environment() {
        let dir = tempdir().unwrap();
        let step = echo_toolchain(dir.path()).run_step(&Operation::ClearCache {
            environment: "staging".to_string(),
        });

        assert_eq!(
            step.result.stdout_lines,
            vec!["bin/console cache:clear --env=staging"]
        );
    }

    #[test]
    fn verbose_appends_the_flag() {
        let dir = tempdir().unwrap();
        let mut toolchain = echo_toolchain(dir.path());
        toolchain.verbose = true;

        let step = toolchain.run_step(&Operation::DumpAssets {
            environment: "prod".to_string(),
        });

        assert_eq!(
            step.result.stdout_lines,
            vec!["bin/console assetic:dump --env=prod --verbose"]
        );
    }

    #[test]
    fn failing_tool_yields_unsuccessful_step() {
        let dir = tempdir().unwrap();
        let mut toolchain = echo_toolchain(dir.path());
        toolchain.php_bin = "false".to_string();

        let step = toolchain.run_step(&Operation::InstallDependencies);
        assert!(!step.success);
    }

    #[test]
    fn from_name_builds_console_operations() {
        let op = Operation::from_name("dump-assets", "dev", None).unwrap();
        assert_eq!(
            op,
            Operation::DumpAssets {
                environment: "dev".to_string()
            }
        );
    }

    #[test]
    fn from_name_rejects_unknown_steps() {
        let err = Operation::from_name("reticulate-splines", "prod", None).unwrap_err();
        assert!(err.message.contains("reticulate-splines"));
    }

    #[test]
    fn copy_step_requires_vendor_assets_config() {
        assert!(Operation::from_name("copy-vendor-assets", "prod", None).is_err());

        let vendor = VendorAssetsConfig {
            source: PathBuf::from("vendor/acme/assets"),
            dest: PathBuf::from("web/assets"),
        };
        let op = Operation::from_name("copy-vendor-assets", "prod", Some(&vendor)).unwrap();
        assert_eq!(op.name(), "copy-vendor-assets");
    }

    #[test]
    fn detect_composer_prefers_local_phar() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("composer.phar"), b"").unwrap();

        let detected = detect_composer_bin(dir.path());
        assert!(detected.ends_with("composer.phar"));
    }
}
