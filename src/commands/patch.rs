use clap::{Args, Subcommand};
use std::path::Path;

use groundwork::anchor::{Anchor, Placement};
use groundwork::patch::{self, PatchOutcome};

use super::CmdResult;

#[derive(Args)]
pub struct PatchArgs {
    #[command(subcommand)]
    pub command: PatchCommand,
}

#[derive(Subcommand)]
pub enum PatchCommand {
    /// Insert text relative to the first line matching an anchor
    Insert {
        file: String,
        text: String,

        /// Anchor pattern (regex unless --literal)
        #[arg(long)]
        anchor: String,

        /// Treat the anchor as a literal substring
        #[arg(long)]
        literal: bool,

        /// Insert after the matched line instead of before
        #[arg(long)]
        after: bool,

        /// Append at end of file when the anchor is absent
        #[arg(long)]
        force: bool,
    },
    /// Replace every match of a pattern
    Substitute {
        file: String,
        pattern: String,
        replacement: String,
    },
    /// Remove every line matching a pattern
    Strip { file: String, pattern: String },
    /// Append text at end of file (creating it when absent)
    Append { file: String, text: String },
    /// Replace the entire file content
    Overwrite { file: String, text: String },
}

pub fn run_json(args: PatchArgs) -> CmdResult<PatchOutcome> {
    let outcome = match args.command {
        PatchCommand::Insert {
            file,
            text,
            anchor,
            literal,
            after,
            force,
        } => {
            let anchor = if literal {
                Anchor::literal(anchor)
            } else {
                Anchor::regex(anchor)
            };
            let placement = if after {
                Placement::After
            } else {
                Placement::Before
            };
            patch::insert(Path::new(&file), &text, &anchor, placement, force)?
        }
        PatchCommand::Substitute {
            file,
            pattern,
            replacement,
        } => patch::substitute(Path::new(&file), &pattern, &replacement)?,
        PatchCommand::Strip { file, pattern } => patch::strip_lines(Path::new(&file), &pattern)?,
        PatchCommand::Append { file, text } => patch::append(Path::new(&file), &text)?,
        PatchCommand::Overwrite { file, text } => patch::overwrite(Path::new(&file), &text)?,
    };

    Ok((outcome, 0))
}
