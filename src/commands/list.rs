use clap::Args;

use super::CmdResult;

#[derive(Args)]
pub struct ListArgs {
    /// Target environment for console steps (eg. dev, prod)
    #[arg(long)]
    pub env: Option<String>,

    /// Working directory containing the application (defaults to CWD)
    #[arg(long)]
    pub working_dir: Option<String>,

    /// Explicit config file (defaults to stagehand.json in the working dir)
    #[arg(long)]
    pub config: Option<String>,

    /// Step to list instead of the configured pipeline (repeatable)
    #[arg(long = "step")]
    pub steps: Vec<String>,
}

pub fn run(args: ListArgs) -> CmdResult {
    let work_dir = super::resolve_work_dir(args.working_dir.as_deref())?;
    let config = super::load_config_for(&work_dir, args.config.as_deref())?;
    let registry = super::build_registry(&config, &args.steps, args.env.as_deref())?;

    for operation in registry.operations() {
        println!("{}", operation);
    }

    Ok(0)
}
