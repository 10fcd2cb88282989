use clap::Args;
use serde::Serialize;

use tagswap::config::{self, TagswapConfig};

use super::CmdResult;

#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Show only built-in defaults (ignore tagswap.json)
    #[arg(long)]
    builtin: bool,
}

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    config: TagswapConfig,
    /// Tag written at every rewritten usage site.
    invocation: String,
    /// Import line added when the replacement is not yet imported.
    import: String,
}

pub fn run(args: ConfigArgs, global: &crate::commands::GlobalArgs) -> CmdResult<ConfigOutput> {
    let (config, path) = if args.builtin {
        (config::builtin_config(), None)
    } else {
        let loaded = global.load_config()?;
        (loaded.config, loaded.path)
    };

    Ok((
        ConfigOutput {
            command: "config",
            path,
            invocation: config.swap.canonical_invocation(),
            import: config.swap.import_line('"', true),
            config,
        },
        0,
    ))
}
