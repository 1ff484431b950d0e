use clap::Args;
use std::path::Path;

use groundwork::manifest::{self, DeclareOutcome, Dependency};
use groundwork::Error;

use super::CmdResult;

#[derive(Args)]
pub struct DeclareArgs {
    /// Manifest file (Gemfile)
    pub file: String,

    /// Dependency names, declared in order
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Version requirement (single dependency only)
    #[arg(long, value_name = "REQ")]
    pub requirement: Option<String>,

    /// Emit the dependencies under a group header
    #[arg(long, value_name = "GROUP")]
    pub group: Option<String>,

    /// Gemfile option as key=value (e.g. require=false)
    #[arg(long = "opt", value_name = "KEY=VALUE")]
    pub options: Vec<String>,
}

pub fn run_json(args: DeclareArgs) -> CmdResult<DeclareOutcome> {
    if args.requirement.is_some() && args.names.len() > 1 {
        return Err(Error::validation_invalid_argument(
            "requirement",
            "applies to a single dependency",
        ));
    }
    if !args.options.is_empty() && args.names.len() > 1 {
        return Err(Error::validation_invalid_argument(
            "opt",
            "applies to a single dependency",
        ));
    }

    let mut deps = Vec::with_capacity(args.names.len());
    for name in &args.names {
        let mut dep = Dependency::new(name);
        if let Some(req) = &args.requirement {
            dep = dep.with_requirement(req);
        }
        for opt in &args.options {
            let (key, value) = opt.split_once('=').ok_or_else(|| {
                Error::validation_invalid_argument("opt", format!("'{}' is not key=value", opt))
            })?;
            dep = dep.with_option(key, value);
        }
        deps.push(dep);
    }

    let file = Path::new(&args.file);

    let outcome = match &args.group {
        Some(group) => manifest::declare_group(file, group, &deps)?,
        None => {
            let mut entries = Vec::with_capacity(deps.len());
            for dep in &deps {
                entries.extend(manifest::declare(file, dep)?.entries);
            }
            DeclareOutcome {
                path: file.display().to_string(),
                entries,
                group: None,
            }
        }
    };

    Ok((outcome, 0))
}
