use std::io;
use std::path::PathBuf;

use clap::Args;

use stagehand::config::TerminalConfig;
use stagehand::copy::run_copy;
use stagehand::render::{RenderMode, TerminalRenderer};

use super::CmdResult;

#[derive(Args)]
pub struct CopyArgs {
    /// Source directory
    pub source: String,

    /// Destination directory
    pub dest: String,

    /// Emit an HTML terminal fragment instead of ANSI text
    #[arg(long)]
    pub html: bool,
}

pub fn run(args: CopyArgs) -> CmdResult {
    let source = PathBuf::from(shellexpand::tilde(&args.source).to_string());
    let dest = PathBuf::from(shellexpand::tilde(&args.dest).to_string());

    let result = run_copy(&source, &dest);

    let mode = if args.html {
        RenderMode::Html
    } else {
        RenderMode::Ansi
    };
    let mut renderer = TerminalRenderer::new(
        mode,
        super::identity(),
        TerminalConfig::default(),
        io::stdout(),
    );

    renderer.begin()?;
    renderer.render(&result)?;
    renderer.finish()?;

    Ok(if result.success() { 0 } else { 1 })
}
