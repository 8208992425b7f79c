use std::path::{Path, PathBuf};

use stagehand::config::{self, StagehandConfig};
use stagehand::hooks::HookRegistry;
use stagehand::steps::Operation;
use stagehand::Error;

pub mod copy;
pub mod list;
pub mod run;

/// Command functions return the process exit code to use.
pub type CmdResult = stagehand::Result<i32>;

/// Print a structured error to stderr with its code and hints.
pub fn print_error(err: &Error) {
    eprintln!("stagehand: {} [{}]", err.message, err.code.as_str());
    for hint in &err.hints {
        eprintln!("  hint: {}", hint.message);
    }
}

/// Resolve the working directory from a flag, defaulting to the CWD.
pub(crate) fn resolve_work_dir(flag: Option<&str>) -> stagehand::Result<PathBuf> {
    match flag {
        Some(dir) => {
            let expanded = shellexpand::tilde(dir).to_string();
            let path = PathBuf::from(&expanded);
            if !path.is_dir() {
                return Err(Error::validation_invalid_argument(
                    "workingDir",
                    format!("'{}' is not a directory", dir),
                    Some(expanded),
                    None,
                ));
            }
            Ok(path)
        }
        None => std::env::current_dir().map_err(|e| {
            Error::internal_io(e.to_string(), Some("resolve working directory".to_string()))
        }),
    }
}

/// Load config: an explicit --config path is strict, the default drop-in
/// location is lenient.
pub(crate) fn load_config_for(
    work_dir: &Path,
    config_flag: Option<&str>,
) -> stagehand::Result<StagehandConfig> {
    match config_flag {
        Some(path) => config::load_config_from_file(Path::new(path)).map_err(|e| {
            e.with_hint("Pass --config with a readable stagehand.json, or omit it to use defaults")
        }),
        None => Ok(config::load_config(work_dir)),
    }
}

/// Build the registry for a run: explicit --step flags win over the
/// configured pipeline.
pub(crate) fn build_registry(
    config: &StagehandConfig,
    step_flags: &[String],
    env_flag: Option<&str>,
) -> stagehand::Result<HookRegistry> {
    let defaults = &config.defaults;
    let environment = env_flag.unwrap_or(&defaults.environment);
    let names: &[String] = if step_flags.is_empty() {
        &defaults.pipeline
    } else {
        step_flags
    };

    let mut registry = HookRegistry::new();
    for name in names {
        registry.register(Operation::from_name(
            name,
            environment,
            defaults.vendor_assets.as_ref(),
        )?);
    }

    Ok(registry)
}

/// `user@host` shown in the rendered prompt, resolved once per run.
pub(crate) fn identity() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "deploy".to_string());
    let host = std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
    format!("{}@{}", user, host)
}
