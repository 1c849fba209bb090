use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use monthshift::defaults;
use monthshift::input::{resolve_spec, ArgsInput, PromptInput};
use monthshift::replace::replace_in_directory;
use monthshift::substitution::SubstitutionSpec;
use monthshift::BatchResult;

use super::CmdResult;

#[derive(Args, Debug)]
pub struct ReplaceArgs {
    /// Directory to scan recursively (defaults to the current directory)
    #[arg(long, short = 'p', default_value = ".")]
    pub path: String,

    /// Month to replace (1-12)
    #[arg(long)]
    pub from_month: Option<u8>,

    /// Replacement month (1-12)
    #[arg(long)]
    pub to_month: Option<u8>,

    /// Year to replace
    #[arg(long)]
    pub from_year: Option<i32>,

    /// Replacement year
    #[arg(long)]
    pub to_year: Option<i32>,

    /// Report what would change without touching any file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceOutput {
    command: String,
    path: String,
    spec: SubstitutionSpec,
    summary: BatchResult,
}

pub fn run(args: ReplaceArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<ReplaceOutput> {
    let root = PathBuf::from(shellexpand::tilde(&args.path).to_string());

    let mut flags = ArgsInput {
        from_month: args.from_month,
        to_month: args.to_month,
        from_year: args.from_year,
        to_year: args.to_year,
    };

    let spec = if should_prompt(&flags, crate::tty::is_interactive()) {
        let mut prompt = PromptInput::new(crate::tty::prompt);
        resolve_spec(&mut prompt)?
    } else {
        resolve_spec(&mut flags)?
    };

    let summary = replace_in_directory(&root, &spec, &defaults::load_defaults(), args.dry_run)?;
    let exit_code = crate::output::exit_code_for_batch(&summary);

    Ok((
        ReplaceOutput {
            command: "replace".to_string(),
            path: root.display().to_string(),
            spec,
            summary,
        },
        exit_code,
    ))
}

/// Ask interactively only when no substitution flag was given. Partial flags
/// are never silently dropped in favour of prompts; they fail validation.
fn should_prompt(flags: &ArgsInput, interactive: bool) -> bool {
    interactive && flags.is_empty()
}
