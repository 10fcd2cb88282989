//! Batch driver: runs the transform over a list of units.
//!
//! Units are processed one at a time. A failing unit is recorded and the batch
//! moves on unless `stop_on_error` is set, in which case it stops before the
//! next unit starts.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::spec::SwapSpec;
use super::transform::{transform, TransformResult};
use super::usages::ShapeCounts;
use super::warnings::{SwapWarning, WarningKind};
use crate::error::{Error, ErrorCode, Result};
use crate::output::{BatchResult, ItemStatus};
use crate::utils::io;
use crate::utils::text::count_lines;

/// Directories never descended into.
const ALWAYS_SKIP_DIRS: &[&str] = &["node_modules", ".git", ".next"];

/// Build output directories, skipped only directly under the root.
const ROOT_ONLY_SKIP_DIRS: &[&str] = &["build", "dist"];

const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs"];

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Persist changed units. Without it the batch is a dry run.
    pub write: bool,
    pub stop_on_error: bool,
}

/// Per-unit detail attached to changed and unchanged items.
#[derive(Debug, Clone, Serialize)]
pub struct UnitDetail {
    pub rules: Vec<&'static str>,
    pub usages: ShapeCounts,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SwapWarning>,
    pub lines_before: usize,
    pub lines_after: usize,
    pub written: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    #[serde(flatten)]
    pub result: BatchResult<UnitDetail>,
    /// True when changed units were written back.
    pub applied: bool,
    /// Path of the failing unit when `stop_on_error` cut the batch short.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<String>,
}

impl BatchReport {
    pub fn has_errors(&self) -> bool {
        self.result.summary.errors > 0
    }
}

/// Transform a single unit, writing it back when `write` is set and the text
/// changed.
pub fn process_unit(path: &Path, spec: &SwapSpec, write: bool) -> Result<(TransformResult, UnitDetail)> {
    let original = io::read_file(path, &format!("read {}", path.display()))?;
    let result = transform(&original, spec);

    let written = write && result.changed;
    if written {
        io::write_file_atomic(path, &result.text, &format!("write {}", path.display()))?;
    }

    let detail = UnitDetail {
        rules: result.rules.clone(),
        usages: result.usages,
        warnings: result.warnings.clone(),
        lines_before: count_lines(&original),
        lines_after: count_lines(&result.text),
        written,
    };

    Ok((result, detail))
}

/// Run the swap over every path. Duplicate paths are processed once.
pub fn run_batch(paths: &[PathBuf], spec: &SwapSpec, options: &BatchOptions) -> Result<BatchReport> {
    spec.validate()?;

    let mut result = BatchResult::new();
    let mut seen: HashSet<&PathBuf> = HashSet::new();
    let mut stopped_at = None;

    for path in paths {
        if !seen.insert(path) {
            continue;
        }
        let display = path.display().to_string();

        match process_unit(path, spec, options.write) {
            Ok((outcome, detail)) => {
                log_unit_warnings(&display, &detail.warnings);
                if outcome.changed {
                    log_status!(
                        "swap",
                        "{} {} ({} usage(s), {} -> {} lines)",
                        ItemStatus::Changed.marker(),
                        display,
                        detail.usages.total(),
                        detail.lines_before,
                        detail.lines_after
                    );
                    result.record_changed(display, detail);
                } else {
                    log_status!("swap", "{} {}", ItemStatus::Unchanged.marker(), display);
                    result.record_unchanged(display, detail);
                }
            }
            Err(err) if err.code == ErrorCode::FileNotFound => {
                log_status!("swap", "{} {}", ItemStatus::NotFound.marker(), display);
                result.record_not_found(display);
            }
            Err(err) => {
                log_status!("swap", "{} {}: {}", ItemStatus::Error.marker(), display, err.summary());
                result.record_error(display.clone(), err.summary());
                if options.stop_on_error {
                    stopped_at = Some(display);
                    break;
                }
            }
        }
    }

    Ok(BatchReport {
        result,
        applied: options.write,
        stopped_at,
    })
}

fn log_unit_warnings(path: &str, warnings: &[SwapWarning]) {
    for warning in warnings {
        if warning.kind == WarningKind::DroppedAttributes {
            log_status!("swap", "warning {}:{} {}", path, warning.line, warning.message);
        }
    }
}

/// Find candidate source units under `root`, sorted.
///
/// `exclude` holds glob patterns matched against paths relative to `root`.
pub fn discover_files(root: &Path, exclude: &[String]) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::file_not_found(root.display().to_string()));
    }

    let mut files = Vec::new();
    walk_recursive(root, root, &mut files);

    files.retain(|path| {
        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        !exclude
            .iter()
            .any(|pattern| glob_match::glob_match(pattern, &relative))
    });
    files.sort();

    Ok(files)
}

fn walk_recursive(dir: &Path, root: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    let is_root = dir == root;

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let name = entry.file_name().to_string_lossy().to_string();
            if ALWAYS_SKIP_DIRS.contains(&name.as_str()) {
                continue;
            }
            if is_root && ROOT_ONLY_SKIP_DIRS.contains(&name.as_str()) {
                continue;
            }
            walk_recursive(&path, root, files);
        } else if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if SOURCE_EXTENSIONS.contains(&ext) {
                files.push(path);
            }
        }
    }
}
