use clap::Args;
use serde::Serialize;

use groundwork::context::RunContext;
use groundwork::git;
use groundwork::setup::SetupStamp;

use super::CmdResult;

#[derive(Args)]
pub struct ContextArgs {
    /// Target directory
    pub path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextOutput {
    pub target: String,
    pub app_name: String,
    pub manifest_present: bool,
    pub git_repo: bool,
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configured_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

pub fn run_json(args: ContextArgs) -> CmdResult<ContextOutput> {
    let ctx = RunContext::new(&args.path)?;

    let manifest_present = ctx.has_manifest();
    let configured = ctx.is_configured();
    let configured_by =
        SetupStamp::load(&ctx).map(|s| format!("{} {}", s.tool, s.version));

    let suggestion = if !manifest_present {
        Some("No Gemfile found; this does not look like a Rails skeleton.".to_string())
    } else if configured {
        Some("Already configured; `groundwork setup` will refuse without --force.".to_string())
    } else {
        Some(format!("Run `groundwork setup {}` to configure.", args.path))
    };

    Ok((
        ContextOutput {
            target: ctx.target.display().to_string(),
            app_name: ctx.app_name.clone(),
            manifest_present,
            git_repo: git::is_git_repo(&ctx.target),
            configured,
            configured_by,
            remote_origin: git::remote_origin_url(&ctx.target),
            suggestion,
        },
        0,
    ))
}
