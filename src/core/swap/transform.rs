//! Transform engine for one source unit.
//!
//! Passes run strictly in order over an owned copy of the text:
//! import removal, replacement import, usage rewrite. The result is compared
//! with the input by exact equality; nothing else decides `changed`.

use serde::Serialize;

use super::imports::{self, EnsureOutcome, LineStyle};
use super::scan::{find_references, find_usages, UsageSite};
use super::spec::SwapSpec;
use super::usages::{self, ShapeCounts};
use super::warnings::{SwapWarning, WarningKind};
use crate::utils::text::line_of;

/// Names of the passes that fired, in order.
pub mod rules {
    pub const IMPORT_REMOVE: &str = "import.remove";
    pub const IMPORT_INSERT: &str = "import.insert";
    pub const IMPORT_EXTEND: &str = "import.extend";
    pub const USAGE_ATTRIBUTED: &str = "usage.attributed";
    pub const USAGE_BARE_SPACED: &str = "usage.bare_spaced";
    pub const USAGE_BARE_TIGHT: &str = "usage.bare_tight";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformResult {
    pub changed: bool,
    #[serde(skip)]
    pub text: String,
    pub rules: Vec<&'static str>,
    pub usages: ShapeCounts,
    pub warnings: Vec<SwapWarning>,
}

impl TransformResult {
    fn unchanged(text: &str, warnings: Vec<SwapWarning>) -> Self {
        Self {
            changed: false,
            text: text.to_string(),
            rules: Vec::new(),
            usages: ShapeCounts::default(),
            warnings,
        }
    }
}

/// Run the full rewrite over `text`.
pub fn transform(text: &str, spec: &SwapSpec) -> TransformResult {
    let bindings = imports::target_bindings(text, spec);
    let imported = !bindings.is_empty();
    let mut names = vec![spec.target.symbol.clone()];
    for binding in &bindings {
        if !names.contains(binding) {
            names.push(binding.clone());
        }
    }

    let sites = find_usages(text, &names);
    let rewritable = sites.iter().filter(|s| s.is_self_closing()).count();
    let mut warnings = usages::usage_warnings(&sites, spec);

    if !imported && rewritable == 0 {
        return TransformResult::unchanged(text, warnings);
    }

    let residual = residual_references(text, &names, &sites);

    // A binding still needed by an open tag or a plain reference keeps its entry.
    let keep: Vec<String> = bindings
        .into_iter()
        .filter(|b| {
            sites.iter().any(|s| !s.is_self_closing() && &s.name == b)
                || residual.iter().any(|(name, _)| name == b)
        })
        .collect();

    let removal = imports::remove_symbol(text, spec, &keep);
    let mut applied = Vec::new();
    let mut current = removal.text;
    if removal.removed > 0 {
        applied.push(rules::IMPORT_REMOVE);
    }

    if removal.removed > 0 || rewritable > 0 {
        let style = LineStyle::of_first_import(text).unwrap_or_default();
        match imports::ensure_replacement(&current, spec, style) {
            EnsureOutcome::Present => {}
            EnsureOutcome::Extended(next) => {
                current = next;
                applied.push(rules::IMPORT_EXTEND);
            }
            EnsureOutcome::Inserted(next) => {
                current = next;
                applied.push(rules::IMPORT_INSERT);
            }
        }
    }

    let rewrite = usages::rewrite_usages(&current, &names, spec);
    current = rewrite.text;
    if rewrite.counts.attributed > 0 {
        applied.push(rules::USAGE_ATTRIBUTED);
    }
    if rewrite.counts.bare_spaced > 0 {
        applied.push(rules::USAGE_BARE_SPACED);
    }
    if rewrite.counts.bare_tight > 0 {
        applied.push(rules::USAGE_BARE_TIGHT);
    }

    warnings.extend(residual.into_iter().map(|(name, pos)| {
        let message = if keep.contains(&name) {
            format!("'{}' is still referenced outside a tag, so its import was kept", name)
        } else {
            format!("'{}' is referenced outside a tag and was left as is", name)
        };
        SwapWarning {
            kind: WarningKind::ResidualReference,
            line: line_of(text, pos),
            message,
        }
    }));
    warnings.sort_by_key(|w| w.line);

    TransformResult {
        changed: current != text,
        text: current,
        rules: applied,
        usages: rewrite.counts,
        warnings,
    }
}

/// References to the target that are neither import entries nor tag usages,
/// as `(name, offset)` pairs.
fn residual_references(text: &str, names: &[String], sites: &[UsageSite]) -> Vec<(String, usize)> {
    let mut found = Vec::new();

    for name in names {
        for pos in find_references(text, name) {
            // `<Name` of a usage site, or `</Name` closing an open one.
            let in_site = sites.iter().any(|s| s.span.contains(&pos));
            let closing_tag = pos >= 2 && &text.as_bytes()[pos - 2..pos] == b"</";
            if in_site || closing_tag {
                continue;
            }
            found.push((name.clone(), pos));
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str = r#"<MorphingLoader size="small" showThemeText={false} />"#;
    const REPLACEMENT_IMPORT: &str = r#"import MorphingLoader from "@/app/components/ui/loading";"#;

    fn run(text: &str) -> TransformResult {
        transform(text, &SwapSpec::default())
    }

    #[test]
    fn scenario_a_import_and_attributed_usage() {
        let text = "import { Loader2, Foo } from \"lib\";\n";
        let result = run(text);
        assert!(result.changed);
        assert_eq!(
            result.text,
            format!("import {{ Foo }} from \"lib\";\n{}\n", REPLACEMENT_IMPORT)
        );
        assert_eq!(result.rules, vec![rules::IMPORT_REMOVE, rules::IMPORT_INSERT]);

        let text = "import React from \"react\";\nimport { Loader2, Foo } from \"lucide-react\";\n\nexport function Button() {\n  return <Loader2 className=\"h-4 w-4\" />;\n}\n";
        let result = run(text);
        assert!(result.changed);
        assert_eq!(
            result.text,
            format!(
                "import React from \"react\";\n{}\nimport {{ Foo }} from \"lucide-react\";\n\nexport function Button() {{\n  return {};\n}}\n",
                REPLACEMENT_IMPORT, CANONICAL
            )
        );
        assert_eq!(
            result.rules,
            vec![rules::IMPORT_REMOVE, rules::IMPORT_INSERT, rules::USAGE_ATTRIBUTED]
        );
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::DroppedAttributes);
        assert_eq!(result.warnings[0].line, 5);
    }

    #[test]
    fn scenario_b_usage_without_import_and_existing_replacement() {
        let text = format!("{}\n\nconst a = <Loader2/>;\n", REPLACEMENT_IMPORT);
        let result = run(&text);
        assert!(result.changed);
        assert_eq!(result.text, format!("{}\n\nconst a = {};\n", REPLACEMENT_IMPORT, CANONICAL));
        assert_eq!(result.text.matches("import MorphingLoader").count(), 1);
        assert_eq!(result.rules, vec![rules::USAGE_BARE_TIGHT]);
    }

    #[test]
    fn scenario_c_two_shapes_then_stable() {
        let text = "import { Loader2 } from \"lucide-react\";\nimport { Button } from \"@/components/ui/button\";\n\nexport default function Save({ busy }) {\n  return (\n    <Button>\n      {busy ? <Loader2 className=\"mr-2 h-4 w-4 animate-spin\" /> : null}\n      {busy && <Loader2 />}\n    </Button>\n  );\n}\n";
        let first = run(text);
        assert!(first.changed);
        assert_eq!(first.usages.total(), 2);
        assert!(!first.text.contains("Loader2"));
        assert_eq!(first.text.matches(CANONICAL).count(), 2);
        assert_eq!(first.text.matches(REPLACEMENT_IMPORT).count(), 1);

        let second = run(&first.text);
        assert!(!second.changed);
        assert_eq!(second.text, first.text);
        assert!(second.rules.is_empty());
    }

    #[test]
    fn no_target_is_byte_identical() {
        let text = "import { Plus } from \"lucide-react\";\r\nconst Loader2Icon = 1;\r\n";
        let result = run(text);
        assert!(!result.changed);
        assert_eq!(result.text, text);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn unused_import_is_swapped_for_replacement_import() {
        let text = "import { Loader2, Foo } from \"lucide-react\";\nexport const a = <Foo />;\n";
        let result = run(text);
        assert!(result.changed);
        assert_eq!(
            result.text,
            format!(
                "import {{ Foo }} from \"lucide-react\";\n{}\nexport const a = <Foo />;\n",
                REPLACEMENT_IMPORT
            )
        );
        assert_eq!(result.rules, vec![rules::IMPORT_REMOVE, rules::IMPORT_INSERT]);
        assert_eq!(result.usages.total(), 0);
    }

    #[test]
    fn residual_reference_keeps_import_and_rewrites_tags() {
        let text = "import { Loader2 } from \"lucide-react\";\nconst icons = { spin: Loader2 };\nexport const a = <Loader2 />;\n";
        let result = run(text);
        assert!(result.changed);
        assert_eq!(
            result.text,
            format!(
                "import {{ Loader2 }} from \"lucide-react\";\n{}\nconst icons = {{ spin: Loader2 }};\nexport const a = {};\n",
                REPLACEMENT_IMPORT, CANONICAL
            )
        );
        assert_eq!(result.rules, vec![rules::IMPORT_INSERT, rules::USAGE_BARE_SPACED]);
        let residual: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::ResidualReference)
            .collect();
        assert_eq!(residual.len(), 1);
        assert_eq!(residual[0].line, 2);
        assert!(residual[0].message.contains("kept"));
    }

    #[test]
    fn open_tag_keeps_its_import() {
        let text = "import { Loader2 } from \"lucide-react\";\nexport const a = <Loader2 className=\"x\">hi</Loader2>;\n";
        let result = run(text);
        assert!(!result.changed);
        assert_eq!(result.text, text);
        assert!(result.rules.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::UnsupportedUsage);
    }

    #[test]
    fn open_tag_keeps_import_while_self_closing_tags_are_rewritten() {
        let text = "import { Loader2, X } from \"lucide-react\";\nexport const a = <Loader2>hi</Loader2>;\nexport const b = <Loader2 />;\n";
        let result = run(text);
        assert!(result.changed);
        assert!(result.text.starts_with("import { Loader2, X } from \"lucide-react\";\n"));
        assert!(result.text.contains("<Loader2>hi</Loader2>"));
        assert!(result.text.contains(&format!("export const b = {};", CANONICAL)));
        assert_eq!(result.text.matches(REPLACEMENT_IMPORT).count(), 1);
        assert!(!result.rules.contains(&rules::IMPORT_REMOVE));
    }

    #[test]
    fn aliased_import_rewrites_alias_usages() {
        let text = "import { Loader2 as Spinner } from \"lucide-react\";\nexport const a = <Spinner />;\n";
        let result = run(text);
        assert_eq!(
            result.text,
            format!("{}\nexport const a = {};\n", REPLACEMENT_IMPORT, CANONICAL)
        );
    }

    #[test]
    fn open_only_usage_is_left_alone_with_warning() {
        let text = "const a = <Loader2>x</Loader2>;\n";
        let result = run(text);
        assert!(!result.changed);
        assert_eq!(result.text, text);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::UnsupportedUsage);
    }
}
