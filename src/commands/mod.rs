use std::io::Read;
use std::path::{Path, PathBuf};

use tagswap::config::LoadedConfig;

pub type CmdResult<T> = tagswap::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    /// Explicit config file (`--config`).
    pub config: Option<String>,
}

impl GlobalArgs {
    pub fn load_config(&self) -> tagswap::Result<LoadedConfig> {
        tagswap::config::load_config(self.config.as_deref())
    }
}

/// Read a path list from a file (@path) or stdin (-), one path per line.
///
/// Blank lines and `#` comments are skipped.
pub(crate) fn read_path_list(spec: &str) -> tagswap::Result<Vec<String>> {
    let raw = if spec.trim() == "-" {
        let mut buf = String::new();
        if crate::tty::is_stdin_tty() {
            return Err(tagswap::Error::validation_invalid_argument(
                "list",
                "Cannot read the path list from stdin when stdin is a TTY",
                None,
                None,
            ));
        }
        std::io::stdin().read_to_string(&mut buf).map_err(|e| {
            tagswap::Error::internal_io(e.to_string(), Some("read stdin".to_string()))
        })?;
        buf
    } else if let Some(path) = spec.strip_prefix('@') {
        if path.trim().is_empty() {
            return Err(tagswap::Error::validation_invalid_argument(
                "list",
                "Invalid list spec '@' (missing file path)",
                None,
                None,
            ));
        }
        let expanded = shellexpand::tilde(path.trim()).to_string();
        tagswap::utils::io::read_file(Path::new(&expanded), &format!("read {}", expanded))?
    } else {
        return Err(tagswap::Error::validation_invalid_argument(
            "list",
            "Expected @<file> or - for stdin",
            Some(spec.to_string()),
            None,
        ));
    };

    Ok(parse_path_list(&raw))
}

fn parse_path_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Expand path arguments. Arguments with glob metacharacters are expanded;
/// a pattern matching nothing is kept as given so the unit reports `not_found`.
pub(crate) fn expand_path_args(args: &[String]) -> tagswap::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for arg in args {
        let expanded = shellexpand::tilde(arg).to_string();
        if !expanded.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(expanded));
            continue;
        }

        let entries = glob::glob(&expanded).map_err(|e| {
            tagswap::Error::validation_invalid_argument(
                "files",
                format!("Invalid glob pattern: {}", e),
                Some(arg.clone()),
                None,
            )
        })?;
        let mut matched: Vec<PathBuf> = entries.flatten().filter(|p| p.is_file()).collect();
        if matched.is_empty() {
            paths.push(PathBuf::from(expanded));
        } else {
            matched.sort();
            paths.append(&mut matched);
        }
    }

    Ok(paths)
}

pub mod config;
pub mod run;
pub mod show;

pub(crate) fn run_raw(
    command: crate::Commands,
    global: &GlobalArgs,
) -> tagswap::Result<(String, i32)> {
    match command {
        crate::Commands::Show(args) => show::run_raw(args, global),
        _ => Err(tagswap::Error::validation_invalid_argument(
            "output_mode",
            "Command does not support raw output",
            None,
            None,
        )),
    }
}

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (tagswap::Result<serde_json::Value>, i32) {
    crate::tty::status("tagswap is working...");

    match command {
        crate::Commands::Run(args) => dispatch!(args, global, run),
        crate::Commands::Config(args) => dispatch!(args, global, config),

        // Raw output mode
        crate::Commands::Show(_) => {
            let err = tagswap::Error::validation_invalid_argument(
                "output_mode",
                "Show command uses raw output mode",
                None,
                None,
            );
            crate::output::map_cmd_result_to_json::<serde_json::Value>(Err(err))
        }
    }
}
