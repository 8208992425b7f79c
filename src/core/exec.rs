//! Subprocess execution with captured output and timing.
//!
//! Commands are spawned directly (no shell) with both stdio streams piped.
//! Captured lines are stored unmodified; any escaping for an output surface
//! is the renderer's concern.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

use serde::Serialize;

use crate::utils::shell;

/// Argument specification for an external tool invocation.
///
/// Arguments keep their insertion order. A name without a value renders a
/// bare flag (`--name`); a name with a value renders `--name=value`. Prefix
/// and separator are configurable per invocation.
#[derive(Debug, Clone, Default)]
pub struct ArgSpec {
    prefix: Option<String>,
    separator: Option<String>,
    items: Vec<(String, Option<String>)>,
}

impl ArgSpec {
    pub const DEFAULT_PREFIX: &'static str = "--";
    pub const DEFAULT_SEPARATOR: &'static str = "=";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Append a bare flag (`--name`).
    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.items.push((name.into(), None));
        self
    }

    /// Append a key/value argument (`--name=value`).
    pub fn value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.items.push((name.into(), Some(value.into())));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or(Self::DEFAULT_PREFIX)
    }

    fn separator(&self) -> &str {
        self.separator.as_deref().unwrap_or(Self::DEFAULT_SEPARATOR)
    }

    /// Raw tokens handed to the child process, one per argument.
    pub fn tokens(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|(name, value)| match value {
                Some(value) => format!("{}{}{}{}", self.prefix(), name, self.separator(), value),
                None => format!("{}{}", self.prefix(), name),
            })
            .collect()
    }

    /// Shell-quoted rendering for display and audit, values escaped.
    pub fn render(&self) -> String {
        self.items
            .iter()
            .map(|(name, value)| match value {
                Some(value) => format!(
                    "{}{}{}{}",
                    self.prefix(),
                    name,
                    self.separator(),
                    shell::quote_arg(value)
                ),
                None => format!("{}{}", self.prefix(), name),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Terminal state of an executed command.
///
/// A spawn failure (binary missing, not executable) is a distinct outcome,
/// not a fabricated exit code. `exit_code` maps it to the conventional 127
/// where a plain integer is needed for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessStatus {
    Exited { code: i32 },
    SpawnFailed { error: String },
}

impl ProcessStatus {
    pub fn success(&self) -> bool {
        matches!(self, ProcessStatus::Exited { code: 0 })
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            ProcessStatus::Exited { code } => *code,
            ProcessStatus::SpawnFailed { .. } => 127,
        }
    }
}

/// Outcome of running one external command.
///
/// Only constructed after the process has terminated and both pipes are
/// drained; partial results are never returned.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub command_line: String,
    pub stdout_lines: Vec<String>,
    pub stderr_lines: Vec<String>,
    pub duration_secs: f64,
    pub status: ProcessStatus,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Run one external command to completion, capturing output line by line.
///
/// Blocks until the child exits; there is no timeout. The clock stops only
/// after the exit status is collected and both pipes hit end-of-stream.
pub fn execute(
    program: &str,
    base_args: &[String],
    args: &ArgSpec,
    work_dir: &Path,
    env: &[(String, String)],
) -> ExecutionResult {
    let command_line = render_command_line(program, base_args, args);
    let start = Instant::now();

    let mut cmd = Command::new(program);
    cmd.args(base_args)
        .args(args.tokens())
        .current_dir(work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    for (key, value) in env {
        cmd.env(key, value);
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            return ExecutionResult {
                command_line,
                stdout_lines: Vec::new(),
                stderr_lines: Vec::new(),
                duration_secs: start.elapsed().as_secs_f64(),
                status: ProcessStatus::SpawnFailed {
                    error: err.to_string(),
                },
            };
        }
    };

    let stdout_lines = drain_lines(child.stdout.take());
    let stderr_lines = drain_lines(child.stderr.take());

    let code = match child.wait() {
        Ok(status) => status.code().unwrap_or(-1),
        Err(_) => -1,
    };

    ExecutionResult {
        command_line,
        stdout_lines,
        stderr_lines,
        duration_secs: start.elapsed().as_secs_f64(),
        status: ProcessStatus::Exited { code },
    }
}

fn drain_lines<R: Read>(pipe: Option<R>) -> Vec<String> {
    match pipe {
        Some(pipe) => BufReader::new(pipe)
            .lines()
            .map_while(|line| line.ok())
            .collect(),
        None => Vec::new(),
    }
}

fn render_command_line(program: &str, base_args: &[String], args: &ArgSpec) -> String {
    let mut parts = vec![shell::quote_arg(program)];
    parts.extend(base_args.iter().map(|arg| shell::quote_arg(arg)));
    if !args.is_empty() {
        parts.push(args.render());
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arg_spec_renders_value_then_bare_flag() {
        let spec = ArgSpec::new().value("env", "prod").flag("verbose");
        assert_eq!(spec.render(), "--env=prod --verbose");
        assert_eq!(spec.tokens(), vec!["--env=prod", "--verbose"]);
    }

    #[test]
    fn arg_spec_preserves_insertion_order() {
        let spec = ArgSpec::new().flag("no-dev").flag("optimize-autoloader").value("env", "dev");
        assert_eq!(spec.render(), "--no-dev --optimize-autoloader --env=dev");
    }

    #[test]
    fn arg_spec_custom_prefix_and_separator() {
        let spec = ArgSpec::new().with_prefix("-").with_separator(":").value("level", "3");
        assert_eq!(spec.render(), "-level:3");
    }

    #[test]
    fn arg_spec_escapes_values_for_display_only() {
        let spec = ArgSpec::new().value("message", "two words");
        assert_eq!(spec.render(), "--message='two words'");
        assert_eq!(spec.tokens(), vec!["--message=two words"]);
    }

    #[test]
    fn execute_captures_stdout_lines() {
        let result = execute(
            "echo",
            &["hello".to_string()],
            &ArgSpec::new(),
            Path::new("."),
            &[],
        );
        assert!(result.success());
        assert_eq!(result.stdout_lines, vec!["hello"]);
        assert!(result.stderr_lines.is_empty());
        assert!(result.duration_secs >= 0.0);
    }

    #[test]
    fn execute_captures_both_streams_and_exit_code() {
        let result = execute(
            "sh",
            &[
                "-c".to_string(),
                "echo out; echo err 1>&2; exit 3".to_string(),
            ],
            &ArgSpec::new(),
            Path::new("."),
            &[],
        );
        assert!(!result.success());
        assert_eq!(result.status, ProcessStatus::Exited { code: 3 });
        assert_eq!(result.stdout_lines, vec!["out"]);
        assert_eq!(result.stderr_lines, vec!["err"]);
    }

    #[test]
    fn execute_reports_spawn_failure_distinctly() {
        let result = execute(
            "stagehand-no-such-binary",
            &[],
            &ArgSpec::new(),
            Path::new("."),
            &[],
        );
        assert!(matches!(result.status, ProcessStatus::SpawnFailed { .. }));
        assert_eq!(result.status.exit_code(), 127);
        assert!(result.stdout_lines.is_empty());
        assert!(result.stderr_lines.is_empty());
    }

    #[test]
    fn execute_applies_environment_overrides() {
        let result = execute(
            "sh",
            &["-c".to_string(), "echo \"$STAGEHAND_TEST_HOME\"".to_string()],
            &ArgSpec::new(),
            Path::new("."),
            &[("STAGEHAND_TEST_HOME".to_string(), "/tmp/composer".to_string())],
        );
        assert_eq!(result.stdout_lines, vec!["/tmp/composer"]);
    }

    #[test]
    fn command_line_includes_rendered_arguments() {
        let spec = ArgSpec::new().value("env", "prod");
        let result = execute("echo", &["run".to_string()], &spec, Path::new("."), &[]);
        assert_eq!(result.command_line, "echo run --env=prod");
    }
}
