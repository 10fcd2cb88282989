use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use tagswap::swap::{self, BatchOptions, BatchReport};

use super::{expand_path_args, read_path_list, CmdResult, GlobalArgs};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Source files to rewrite (glob patterns are expanded)
    pub files: Vec<String>,

    /// Read more paths from a file (@path) or stdin (-), one per line
    #[arg(long, value_name = "@FILE|-")]
    pub list: Option<String>,

    /// Discover .js/.jsx/.ts/.tsx/.mjs files under a directory
    #[arg(long, value_name = "DIR")]
    pub path: Option<String>,

    /// Write changed files (default is a dry run)
    #[arg(long)]
    pub write: bool,

    /// Stop at the first unit that fails
    #[arg(long)]
    pub stop_on_error: bool,
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<String>,
    invocation: String,
    #[serde(flatten)]
    report: BatchReport,
}

pub fn run(args: RunArgs, global: &GlobalArgs) -> CmdResult<RunOutput> {
    let loaded = global.load_config()?;
    let paths = resolve_units(&args, &loaded)?;

    let options = BatchOptions {
        write: args.write,
        stop_on_error: args.stop_on_error,
    };
    let spec = &loaded.config.swap;
    let report = swap::run_batch(&paths, spec, &options)?;

    let exit_code = if report.has_errors() { 1 } else { 0 };

    Ok((
        RunOutput {
            command: "run",
            config: loaded.path.clone(),
            invocation: spec.canonical_invocation(),
            report,
        },
        exit_code,
    ))
}

/// Units from positional args, `--list` and `--path`, in that order. Falls back
/// to the config file's `files` when none of them is given.
fn resolve_units(args: &RunArgs, loaded: &tagswap::config::LoadedConfig) -> tagswap::Result<Vec<PathBuf>> {
    let mut paths = expand_path_args(&args.files)?;

    if let Some(list) = &args.list {
        paths.extend(expand_path_args(&read_path_list(list)?)?);
    }

    if let Some(dir) = &args.path {
        let root = PathBuf::from(shellexpand::tilde(dir).as_ref());
        paths.extend(swap::discover_files(&root, &loaded.config.exclude)?);
    }

    if args.files.is_empty() && args.list.is_none() && args.path.is_none() {
        paths = loaded.files();
    }

    if paths.is_empty() {
        return Err(tagswap::Error::validation_missing_argument(vec![
            "files".to_string(),
        ])
        .with_hint("Pass files, --list <@file|->, --path <dir>, or set \"files\" in tagswap.json"));
    }

    Ok(paths)
}
