//! Helpers for locating external tools.

use std::process::Command;

/// Run a program and return trimmed stdout when it succeeds with output.
///
/// Returns None on spawn failure, non-zero exit, or empty output. Useful
/// when the command is a probe rather than a step (e.g. `which composer`).
pub fn run_optional(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() {
        None
    } else {
        Some(stdout)
    }
}

/// Locate a binary on PATH via `which`.
pub fn which(binary: &str) -> Option<String> {
    run_optional("which", &[binary])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_optional_captures_stdout() {
        let result = run_optional("echo", &["hello"]);
        assert_eq!(result, Some("hello".to_string()));
    }

    #[test]
    fn run_optional_returns_none_on_failure() {
        assert!(run_optional("false", &[]).is_none());
    }

    #[test]
    fn which_finds_sh() {
        assert!(which("sh").is_some());
    }
}
