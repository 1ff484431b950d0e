use clap::{Parser, Subcommand};

mod commands;
mod tty;

use commands::{context, declare, exec, patch, setup};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "groundwork")]
#[command(version = VERSION)]
#[command(about = "CLI for turning a freshly generated Rails skeleton into a configured project")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full setup sequence against a skeleton
    Setup(setup::SetupArgs),
    /// Apply a single patch operation to a file
    Patch(patch::PatchArgs),
    /// Append dependency declarations to a manifest
    Declare(declare::DeclareArgs),
    /// Run a shell command in a target directory
    Exec(exec::ExecArgs),
    /// Show context for a target directory
    Context(context::ContextArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let (json_result, exit_code) = commands::run_json(cli.command);

    if groundwork::output::print_result(json_result).is_err() {
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
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
