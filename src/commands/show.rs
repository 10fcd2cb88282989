use clap::Args;
use std::path::PathBuf;

use tagswap::swap;
use tagswap::utils::io;

use super::GlobalArgs;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Source file to transform; the result is printed, never written
    pub file: String,
}

/// Print the transformed text of one unit. Warnings go to stderr.
pub fn run_raw(args: ShowArgs, global: &GlobalArgs) -> tagswap::Result<(String, i32)> {
    let loaded = global.load_config()?;
    let spec = &loaded.config.swap;
    spec.validate()?;

    let path = PathBuf::from(shellexpand::tilde(&args.file).as_ref());
    let content = io::read_file(&path, &format!("read {}", path.display()))?;
    let result = swap::transform(&content, spec);

    for warning in &result.warnings {
        tagswap::log_status!(
            "show",
            "warning {}:{} {}",
            path.display(),
            warning.line,
            warning.message
        );
    }

    Ok((result.text, 0))
}
