pub mod context;
pub mod declare;
pub mod exec;
pub mod patch;
pub mod setup;

/// Command results carry their payload plus the process exit code.
pub type CmdResult<T> = groundwork::Result<(T, i32)>;

/// Dispatch a parsed command and flatten its output for the JSON envelope.
pub fn run_json(command: crate::Commands) -> (groundwork::Result<serde_json::Value>, i32) {
    use groundwork::output::map_cmd_result_to_json;

    match command {
        crate::Commands::Setup(args) => map_cmd_result_to_json(setup::run_json(args)),
        crate::Commands::Patch(args) => map_cmd_result_to_json(patch::run_json(args)),
        crate::Commands::Declare(args) => map_cmd_result_to_json(declare::run_json(args)),
        crate::Commands::Exec(args) => map_cmd_result_to_json(exec::run_json(args)),
        crate::Commands::Context(args) => map_cmd_result_to_json(context::run_json(args)),
    }
}
