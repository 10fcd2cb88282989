//! Import rewriter. Drops the target from its import list and guarantees one
//! import of the replacement.

use regex::Regex;

use super::scan::{parse_imports, ImportStatement, NamedList};
use super::spec::{ImportStyle, SwapSpec};
use crate::utils::text::{apply_edits, line_end_inclusive, line_ending};

type Edit = (usize, usize, String);

/// Outcome of removing the target symbol from import lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRemoval {
    pub text: String,
    /// Number of import entries removed.
    pub removed: usize,
}

/// How the replacement import was guaranteed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// An import of the replacement module already binds the symbol.
    Present,
    /// An existing import of the replacement module gained the binding.
    Extended(String),
    /// A new import statement was inserted.
    Inserted(String),
}

/// Quote character and trailing semicolon of an import line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStyle {
    pub quote: char,
    pub semicolon: bool,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            quote: '"',
            semicolon: true,
        }
    }
}

impl LineStyle {
    /// Style of the first import statement in `text`.
    pub fn of_first_import(text: &str) -> Option<Self> {
        parse_imports(text).first().map(|s| Self {
            quote: s.quote,
            semicolon: s.semicolon,
        })
    }
}

/// Local names the target is bound under by braced import lists, in any
/// module: `Loader2`, or `Spinner` for `Loader2 as Spinner`.
pub fn target_bindings(text: &str, spec: &SwapSpec) -> Vec<String> {
    let mut names = Vec::new();
    for stmt in parse_imports(text) {
        let Some(list) = &stmt.named else {
            continue;
        };
        for entry in list.entries.iter().filter(|e| e.imported == spec.target.symbol) {
            let local = entry.local().to_string();
            if !names.contains(&local) {
                names.push(local);
            }
        }
    }
    names
}

/// Remove the target from every import list that names it, whatever the
/// module. Entries whose local name is in `keep` stay.
///
/// Which comma goes depends on the entry's position: a leading or middle
/// entry takes the separator after it, a trailing entry takes the one before
/// it. A list left empty is dropped, and so is a statement left empty.
pub fn remove_symbol(text: &str, spec: &SwapSpec, keep: &[String]) -> ImportRemoval {
    let statements = parse_imports(text);
    let mut edits = Vec::new();

    for stmt in &statements {
        let Some(list) = &stmt.named else {
            continue;
        };
        let Some(idx) = list.entries.iter().position(|e| {
            e.imported == spec.target.symbol && !keep.iter().any(|k| k == e.local())
        }) else {
            continue;
        };

        edits.push(removal_edit(text, stmt, list, idx));
    }

    ImportRemoval {
        text: apply_edits(text, &edits),
        removed: edits.len(),
    }
}

fn removal_edit(text: &str, stmt: &ImportStatement, list: &NamedList, idx: usize) -> Edit {
    let entries = &list.entries;

    if entries.len() == 1 {
        // `import D, { X } from "m"` keeps its default binding.
        if let Some(default) = &stmt.default_binding {
            return (default.span.end, list.span.end, String::new());
        }
        let span = if stmt.owns_lines(text) {
            stmt.line_span(text)
        } else {
            stmt.span.clone()
        };
        return (span.start, span.end, String::new());
    }

    if idx + 1 < entries.len() {
        (entries[idx].span.start, entries[idx + 1].span.start, String::new())
    } else {
        (entries[idx - 1].span.end, entries[idx].span.end, String::new())
    }
}

/// Make sure exactly one import binds the replacement symbol from its module.
///
/// Detection is structural: an import statement whose module equals the
/// replacement module and which binds the replacement name. Text that merely
/// mentions the module or the symbol elsewhere does not count.
///
/// A new statement copies the style of the first import in `text`, or
/// `fallback` when `text` has none left.
pub fn ensure_replacement(text: &str, spec: &SwapSpec, fallback: LineStyle) -> EnsureOutcome {
    let statements = parse_imports(text);
    let symbol = spec.replacement.symbol.as_str();

    let from_module: Vec<&ImportStatement> = statements
        .iter()
        .filter(|s| s.module == spec.replacement.module && !s.type_only)
        .collect();

    if from_module.iter().any(|s| s.bindings().contains(&symbol)) {
        return EnsureOutcome::Present;
    }

    for stmt in &from_module {
        if let Some(edit) = extension_edit(stmt, spec) {
            return EnsureOutcome::Extended(apply_edits(text, &[edit]));
        }
    }

    EnsureOutcome::Inserted(insert_statement(text, &statements, spec, fallback))
}

/// Add the replacement binding to an existing import of its module.
/// Returns `None` when the statement cannot carry it (namespace imports).
fn extension_edit(stmt: &ImportStatement, spec: &SwapSpec) -> Option<Edit> {
    let symbol = &spec.replacement.symbol;
    let side_effect =
        stmt.default_binding.is_none() && stmt.namespace.is_none() && stmt.named.is_none();
    let at = stmt.clause_start;

    if spec.replacement.import_style == ImportStyle::Default && stmt.default_binding.is_none() {
        let insert = if side_effect {
            format!("{} from ", symbol)
        } else {
            format!("{}, ", symbol)
        };
        return Some((at, at, insert));
    }

    // Named style, or the default slot is taken by another local name.
    let entry = match spec.replacement.import_style {
        ImportStyle::Default => format!("default as {}", symbol),
        ImportStyle::Named => symbol.clone(),
    };

    if let Some(list) = &stmt.named {
        return Some(match list.entries.last() {
            Some(last) => (last.span.end, last.span.end, format!(", {}", entry)),
            None => (list.span.start + 1, list.span.end - 1, format!(" {} ", entry)),
        });
    }
    if stmt.namespace.is_some() {
        return None;
    }
    if let Some(default) = &stmt.default_binding {
        return Some((
            default.span.end,
            default.span.end,
            format!(", {{ {} }}", entry),
        ));
    }
    Some((at, at, format!("{{ {} }} from ", entry)))
}

/// Insert a new import line right after the first import statement, or after
/// the directive prologue when the unit has no imports.
fn insert_statement(
    text: &str,
    statements: &[ImportStatement],
    spec: &SwapSpec,
    fallback: LineStyle,
) -> String {
    let eol = line_ending(text);

    let (at, line) = match statements.first() {
        Some(first) => (
            line_end_inclusive(text, first.span.end),
            spec.import_line(first.quote, first.semicolon),
        ),
        None => (
            prologue_end(text),
            spec.import_line(fallback.quote, fallback.semicolon),
        ),
    };

    let mut result = String::with_capacity(text.len() + line.len() + 2);
    result.push_str(&text[..at]);
    if at > 0 && !text[..at].ends_with('\n') {
        result.push_str(eol);
        result.push_str(&line);
    } else {
        result.push_str(&line);
        result.push_str(eol);
    }
    result.push_str(&text[at..]);
    result
}

/// Byte offset just past leading `"use client";`-style directive lines.
fn prologue_end(text: &str) -> usize {
    let re = match Regex::new(r#"^\s*(?:"use [a-z ]+"|'use [a-z ]+');?\s*$"#) {
        Ok(r) => r,
        Err(_) => return 0,
    };

    let mut end = 0;
    while end < text.len() {
        let next = line_end_inclusive(text, end);
        if !re.is_match(&text[end..next]) {
            break;
        }
        end = next;
    }
    end
}
