use clap::{Parser, Subcommand};

mod commands;

use commands::{copy, list, run};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "stagehand")]
#[command(version = VERSION)]
#[command(about = "Run post-deploy hook pipelines without shell access")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured hook pipeline
    Run(run::RunArgs),
    /// Show the pipeline that would run, without executing it
    List(list::ListArgs),
    /// Copy a vendor asset tree and render the result
    Copy(copy::CopyArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => run::run(args),
        Commands::List(args) => list::run(args),
        Commands::Copy(args) => copy::run(args),
    };

    match result {
        Ok(exit_code) => std::process::ExitCode::from(exit_code_to_u8(exit_code)),
        Err(err) => {
            commands::print_error(&err);
            std::process::ExitCode::from(2)
        }
    }
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
