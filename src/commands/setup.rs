use clap::Args;
use std::path::Path;

use groundwork::context::RunContext;
use groundwork::prompt::{ScriptedPrompter, TerminalPrompter};
use groundwork::setup::{self, SetupOptions, SetupReport};
use groundwork::Error;

use super::CmdResult;

#[derive(Args)]
pub struct SetupArgs {
    /// Path to the freshly generated Rails skeleton
    pub path: String,

    /// JSON answers file for a non-interactive run
    #[arg(long, value_name = "FILE")]
    pub answers: Option<String>,

    /// Run even when the target is already configured (duplicates content)
    #[arg(long)]
    pub force: bool,

    /// Skip the GitHub repository step
    #[arg(long)]
    pub skip_github: bool,
}

pub fn run_json(args: SetupArgs) -> CmdResult<SetupReport> {
    let ctx = RunContext::new(&args.path)?;
    let opts = SetupOptions {
        force: args.force,
        skip_github: args.skip_github,
    };

    let report = match &args.answers {
        Some(file) => {
            let prompter = ScriptedPrompter::from_file(Path::new(file))?;
            setup::run(&ctx, &prompter, &opts)?
        }
        None => {
            if !crate::tty::require_tty_for_interactive() {
                return Err(Error::prompt_not_interactive());
            }
            let prompter = TerminalPrompter::new();
            setup::run(&ctx, &prompter, &opts)?
        }
    };

    Ok((report, 0))
}
