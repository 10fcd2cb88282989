use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::swap::SwapSpec;
use crate::utils::io;

/// Config file looked up in the working directory when none is named.
pub const CONFIG_FILE: &str = "tagswap.json";

/// Root configuration structure for tagswap.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TagswapConfig {
    #[serde(default)]
    pub swap: SwapSpec,

    /// Units to process when none are given on the command line.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,

    /// Glob patterns excluded from directory discovery.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

/// Where the effective config came from.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedConfig {
    pub config: TagswapConfig,
    /// Path of the file read, `None` for built-in defaults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl LoadedConfig {
    /// Config file entries, relative ones resolved against the file's directory.
    pub fn files(&self) -> Vec<PathBuf> {
        let base = self
            .path
            .as_deref()
            .and_then(|p| Path::new(p).parent())
            .map(Path::to_path_buf)
            .unwrap_or_default();

        self.config
            .files
            .iter()
            .map(|f| {
                let expanded = PathBuf::from(shellexpand::tilde(f).as_ref());
                if expanded.is_absolute() {
                    expanded
                } else {
                    base.join(expanded)
                }
            })
            .collect()
    }
}

/// Load the effective configuration.
///
/// With `explicit`, the named file must exist and parse. Without it,
/// `tagswap.json` in the working directory is used when present and the
/// built-in defaults otherwise.
pub fn load_config(explicit: Option<&str>) -> Result<LoadedConfig> {
    match explicit {
        Some(raw) => {
            let path = PathBuf::from(shellexpand::tilde(raw).as_ref());
            if !path.is_file() {
                return Err(Error::config_missing_file(path.display().to_string()));
            }
            load_config_from_file(&path)
        }
        None => {
            let path = PathBuf::from(CONFIG_FILE);
            if path.is_file() {
                load_config_from_file(&path)
            } else {
                Ok(LoadedConfig {
                    config: TagswapConfig::default(),
                    path: None,
                })
            }
        }
    }
}

fn load_config_from_file(path: &Path) -> Result<LoadedConfig> {
    let display = path.display().to_string();
    let content = io::read_file(path, &format!("read {}", display))?;

    let config: TagswapConfig = serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(display.clone(), e))?;
    config.swap.validate()?;

    Ok(LoadedConfig {
        config,
        path: Some(display),
    })
}

/// Built-in configuration (ignoring any file config)
pub fn builtin_config() -> TagswapConfig {
    TagswapConfig::default()
}
