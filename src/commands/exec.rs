use clap::Args;
use serde::Serialize;

use groundwork::context::RunContext;
use groundwork::process::{CommandOutput, Runner};

use super::CmdResult;

#[derive(Args)]
pub struct ExecArgs {
    /// Target directory
    pub path: String,

    /// Command to run through the shell
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecOutput {
    pub command: String,
    #[serde(flatten)]
    pub output: CommandOutput,
}

pub fn run_json(args: ExecArgs) -> CmdResult<ExecOutput> {
    let ctx = RunContext::new(&args.path)?;
    let runner = Runner::new(&ctx.target);

    let command = args.command.join(" ");
    let output = runner.run(&command);

    // The command's own exit status becomes ours; failure is reported,
    // not raised.
    let exit_code = if output.success {
        0
    } else if output.exit_code > 0 {
        output.exit_code
    } else {
        1
    };

    Ok((ExecOutput { command, output }, exit_code))
}
