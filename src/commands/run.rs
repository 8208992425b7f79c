use std::io;

use clap::Args;

use stagehand::hooks::HookRunner;
use stagehand::render::{RenderMode, TerminalRenderer};
use stagehand::steps::Toolchain;

use super::CmdResult;

#[derive(Args)]
pub struct RunArgs {
    /// Target environment for console steps (eg. dev, prod)
    #[arg(long)]
    pub env: Option<String>,

    /// Continue running remaining steps after a failure
    #[arg(long)]
    pub ignore_errors: bool,

    /// Emit an HTML terminal fragment instead of ANSI text
    #[arg(long)]
    pub html: bool,

    /// Pass --verbose to the underlying tools
    #[arg(short, long)]
    pub verbose: bool,

    /// Working directory containing the application (defaults to CWD)
    #[arg(long)]
    pub working_dir: Option<String>,

    /// Explicit config file (defaults to stagehand.json in the working dir)
    #[arg(long)]
    pub config: Option<String>,

    /// Step to run instead of the configured pipeline (repeatable, in order)
    #[arg(long = "step")]
    pub steps: Vec<String>,
}

pub fn run(args: RunArgs) -> CmdResult {
    let work_dir = super::resolve_work_dir(args.working_dir.as_deref())?;
    let config = super::load_config_for(&work_dir, args.config.as_deref())?;

    let registry = super::build_registry(&config, &args.steps, args.env.as_deref())?;
    let toolchain = Toolchain::resolve(&work_dir, &config.defaults.toolchain, args.verbose);

    let mode = if args.html {
        RenderMode::Html
    } else {
        RenderMode::Ansi
    };
    let renderer = TerminalRenderer::new(
        mode,
        super::identity(),
        config.defaults.terminal.clone(),
        io::stdout(),
    );

    let mut runner = HookRunner::new(toolchain, renderer);
    let outcome = runner.run(&registry, args.ignore_errors)?;

    stagehand::log_status!(
        "run",
        "{} step(s) executed, overall success: {}",
        outcome.steps_executed,
        outcome.overall_success
    );

    Ok(outcome.exit_code())
}
