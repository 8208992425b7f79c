//! Hook registration and sequential execution.
//!
//! A registry is an ordered list of operations bound at registration time.
//! The runner executes them in order, streaming each result to the renderer
//! as it is produced, and stops at the first failure unless errors are
//! ignored. One registry serves exactly one run.

use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::render::TerminalRenderer;
use crate::steps::{Operation, StepResult, Toolchain};

/// Ordered list of operations for one run.
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    steps: Vec<Operation>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation; registration order is execution order.
    /// No de-duplication, no reordering.
    pub fn register(&mut self, operation: Operation) {
        self.steps.push(operation);
    }

    pub fn operations(&self) -> &[Operation] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Aggregate result of a full run.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    /// True iff every attempted step succeeded.
    pub overall_success: bool,
    /// Steps actually invoked before stopping.
    pub steps_executed: usize,
}

impl RunOutcome {
    /// Process exit code for callers: all steps succeeded maps to zero.
    pub fn exit_code(&self) -> i32 {
        if self.overall_success {
            0
        } else {
            1
        }
    }
}

/// Executes a registry against a toolchain, rendering as it goes.
pub struct HookRunner<W: Write> {
    toolchain: Toolchain,
    renderer: TerminalRenderer<W>,
}

impl<W: Write> HookRunner<W> {
    pub fn new(toolchain: Toolchain, renderer: TerminalRenderer<W>) -> Self {
        Self {
            toolchain,
            renderer,
        }
    }

    /// Run every registered step in registration order.
    ///
    /// Overall success is the logical AND across attempted steps. With
    /// `ignore_errors` the run continues past failures but still reports
    /// them in the outcome.
    pub fn run(&mut self, registry: &HookRegistry, ignore_errors: bool) -> Result<RunOutcome> {
        self.renderer.begin()?;

        let toolchain = &self.toolchain;
        let outcome = run_steps(
            registry.operations(),
            ignore_errors,
            |operation| toolchain.run_step(operation),
            &mut self.renderer,
        )?;

        self.renderer.finish()?;
        Ok(outcome)
    }

    /// Consume the runner and hand back its renderer (and thus the sink).
    pub fn into_renderer(self) -> TerminalRenderer<W> {
        self.renderer
    }
}

/// Low-level sequential driver, parameterized over step execution.
///
/// `HookRunner::run` is the full toolchain-backed flow; this seam exists so
/// the fail-fast accounting can be exercised without spawning processes.
pub fn run_steps<W, F>(
    operations: &[Operation],
    ignore_errors: bool,
    mut run_step: F,
    renderer: &mut TerminalRenderer<W>,
) -> Result<RunOutcome>
where
    W: Write,
    F: FnMut(&Operation) -> StepResult,
{
    let mut overall_success = true;
    let mut steps_executed = 0usize;

    for operation in operations {
        log_status!("run", "Running {}", operation.name());

        let step = run_step(operation);
        steps_executed += 1;
        overall_success = overall_success && step.success;

        // Streamed, not batched: each result reaches the sink before the
        // next step starts.
        renderer.render(&step.result)?;

        if !step.success {
            log_status!(
                "run",
                "Step {} failed (exit {})",
                operation.name(),
                step.result.status.exit_code()
            );
        }

        if !ignore_errors && !overall_success {
            break;
        }
    }

    Ok(RunOutcome {
        overall_success,
        steps_executed,
    })
}
