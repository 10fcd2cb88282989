//! Occurrence matcher: a small structural scan over import statements and
//! JSX tag boundaries.
//!
//! Nothing here edits text. Every located item carries byte spans into the
//! scanned text so the rewrite passes can edit without re-deriving positions.

use std::ops::Range;

use regex::Regex;
use serde::Serialize;

use crate::utils::text::{find_word_matches, is_ident_byte, line_end_inclusive, line_of, line_start};

// ============================================================================
// Types
// ============================================================================

/// One `name` or `name as alias` entry of a braced import list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub span: Range<usize>,
    pub imported: String,
    pub alias: Option<String>,
}

impl ImportEntry {
    /// The name this entry binds in the importing file.
    pub fn local(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.imported)
    }
}

/// The `{ ... }` part of an import statement, braces included in `span`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedList {
    pub span: Range<usize>,
    pub entries: Vec<ImportEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultBinding {
    pub span: Range<usize>,
    pub name: String,
}

/// A parsed `import ... from "module"` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    /// From the `import` keyword through the closing quote or semicolon.
    pub span: Range<usize>,
    /// Offset of the first token after `import` (and `type`, if present).
    pub clause_start: usize,
    pub default_binding: Option<DefaultBinding>,
    pub namespace: Option<String>,
    pub named: Option<NamedList>,
    pub module: String,
    pub quote: char,
    pub semicolon: bool,
    /// `import type ...` (TypeScript); binds no runtime values.
    pub type_only: bool,
}

impl ImportStatement {
    /// Every local name bound by this statement.
    pub fn bindings(&self) -> Vec<&str> {
        let mut names = Vec::new();
        if let Some(default) = &self.default_binding {
            names.push(default.name.as_str());
        }
        if let Some(ns) = &self.namespace {
            names.push(ns.as_str());
        }
        if let Some(list) = &self.named {
            names.extend(list.entries.iter().map(|e| e.local()));
        }
        names
    }

    /// Whether the statement is the only thing on its lines, so deleting it
    /// means deleting the lines.
    pub fn owns_lines(&self, text: &str) -> bool {
        let start = line_start(text, self.span.start);
        let end = line_end_inclusive(text, self.span.end);
        text[start..self.span.start].trim().is_empty() && text[self.span.end..end].trim().is_empty()
    }

    /// Whole-line span of the statement, including its line break.
    pub fn line_span(&self, text: &str) -> Range<usize> {
        line_start(text, self.span.start)..line_end_inclusive(text, self.span.end)
    }
}

/// Lexical shape of a tag usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageShape {
    /// `<Name attr="..." />`
    Attributed,
    /// `<Name />`
    BareSpaced,
    /// `<Name/>`
    BareTight,
    /// `<Name ...>` with children; never rewritten.
    Open,
}

/// One located occurrence of a target tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageSite {
    /// From `<` through `/>` (or `>` for open tags).
    pub span: Range<usize>,
    pub name: String,
    /// Attribute text between the tag name and the tag close, trimmed.
    pub attributes: String,
    pub shape: UsageShape,
    pub line: usize,
}

impl UsageSite {
    pub fn is_self_closing(&self) -> bool {
        self.shape != UsageShape::Open
    }
}

// ============================================================================
// Cursor
// ============================================================================

struct Cursor<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, pos: usize) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Remaining bytes. The cursor may sit inside a multi-byte character, so
    /// lookahead works on bytes, never on `&str` slices.
    fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos.min(self.bytes.len())..]
    }

    /// Skip whitespace and `//` / `/* */` comments.
    fn skip_trivia(&mut self) {
        loop {
            while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
                self.pos += 1;
            }
            let rest = self.rest();
            if rest.starts_with(b"//") {
                self.pos = match rest.iter().position(|&b| b == b'\n') {
                    Some(p) => self.pos + p + 1,
                    None => self.bytes.len(),
                };
            } else if rest.starts_with(b"/*") {
                self.pos = match rest[2..].windows(2).position(|w| w == b"*/") {
                    Some(p) => self.pos + 2 + p + 2,
                    None => self.bytes.len(),
                };
            } else {
                return;
            }
        }
    }

    /// Skip spaces and tabs only; never crosses a line break.
    fn skip_inline_space(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\t')) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<(Range<usize>, String)> {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if is_ident_byte(b)) {
            self.pos += 1;
        }
        if self.pos == start || self.bytes[start].is_ascii_digit() {
            self.pos = start;
            return None;
        }
        Some((start..self.pos, self.text[start..self.pos].to_string()))
    }

    /// Consume `keyword` when it is followed by a non-identifier byte.
    fn keyword(&mut self, keyword: &str) -> bool {
        if !self.rest().starts_with(keyword.as_bytes()) {
            return false;
        }
        let end = self.pos + keyword.len();
        if matches!(self.bytes.get(end), Some(&b) if is_ident_byte(b)) {
            return false;
        }
        self.pos = end;
        true
    }

    /// Consume a single- or double-quoted string, returning its contents.
    fn string(&mut self) -> Option<(char, String)> {
        let quote = self.peek()?;
        if quote != b'"' && quote != b'\'' {
            return None;
        }
        let start = self.pos + 1;
        let mut i = start;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 2,
                b'\n' => return None,
                b if b == quote => {
                    self.pos = i + 1;
                    return Some((quote as char, self.text[start..i].to_string()));
                }
                _ => i += 1,
            }
        }
        None
    }

    /// Skip a JS string or template literal starting at the cursor.
    fn skip_literal(&mut self) {
        let Some(quote) = self.peek() else {
            return;
        };
        self.pos += 1;
        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'\\' {
                self.pos += 1;
            } else if b == quote {
                return;
            }
        }
    }

    /// Skip a balanced `{ ... }` expression starting at the cursor.
    fn skip_braces(&mut self) {
        let mut depth = 0usize;
        while let Some(b) = self.peek() {
            match b {
                b'"' | b'\'' | b'`' => {
                    self.skip_literal();
                    continue;
                }
                b'{' => depth += 1,
                b'}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.pos += 1;
                        return;
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
    }
}

// ============================================================================
// Import statements
// ============================================================================

/// Find every import statement that begins a line.
pub fn parse_imports(text: &str) -> Vec<ImportStatement> {
    let re = match Regex::new(r"(?m)^[ \t]*import\b") {
        Ok(r) => r,
        Err(_) => return Vec::new(),
    };

    re.find_iter(text)
        .filter_map(|m| {
            let keyword_start = m.end() - "import".len();
            parse_statement(text, keyword_start)
        })
        .collect()
}

fn parse_statement(text: &str, start: usize) -> Option<ImportStatement> {
    let mut c = Cursor::new(text, start + "import".len());
    c.skip_trivia();

    // Dynamic `import(...)` and `import.meta` are expressions, not statements.
    if matches!(c.peek(), Some(b'(') | Some(b'.')) {
        return None;
    }

    let type_start = c.pos;
    let mut clause = Clause::empty();
    if c.keyword("type") {
        c.skip_trivia();
        // `import type from "x"` binds a default named `type`.
        if c.rest().starts_with(b"from") {
            c.pos = type_start;
        } else {
            clause.type_only = true;
        }
    }
    let clause_start = c.pos;

    if matches!(c.peek(), Some(b'"') | Some(b'\'')) {
        let (quote, module) = c.string()?;
        return Some(finish_statement(c, start, clause_start, clause, quote, module));
    }

    if let Some((span, name)) = c.ident() {
        clause.default_binding = Some(DefaultBinding { span, name });
        c.skip_trivia();
        if c.eat(b',') {
            c.skip_trivia();
        }
    }

    match c.peek() {
        Some(b'{') => clause.named = Some(parse_named_list(&mut c)?),
        Some(b'*') => {
            c.pos += 1;
            c.skip_trivia();
            if !c.keyword("as") {
                return None;
            }
            c.skip_trivia();
            clause.namespace = Some(c.ident()?.1);
        }
        _ => {}
    }

    if clause.default_binding.is_none() && clause.named.is_none() && clause.namespace.is_none() {
        return None;
    }

    c.skip_trivia();
    if !c.keyword("from") {
        return None;
    }
    c.skip_trivia();
    let (quote, module) = c.string()?;

    Some(finish_statement(c, start, clause_start, clause, quote, module))
}

struct Clause {
    default_binding: Option<DefaultBinding>,
    namespace: Option<String>,
    named: Option<NamedList>,
    type_only: bool,
}

impl Clause {
    fn empty() -> Self {
        Self {
            default_binding: None,
            namespace: None,
            named: None,
            type_only: false,
        }
    }
}

fn finish_statement(
    mut c: Cursor<'_>,
    start: usize,
    clause_start: usize,
    clause: Clause,
    quote: char,
    module: String,
) -> ImportStatement {
    let mut end = c.pos;
    let checkpoint = c.pos;

    // Import attributes: `with { type: "json" }`.
    c.skip_inline_space();
    let mut has_attributes = false;
    if c.keyword("with") || c.keyword("assert") {
        c.skip_inline_space();
        if c.peek() == Some(b'{') {
            c.skip_braces();
            end = c.pos;
            has_attributes = true;
        }
    }
    if !has_attributes {
        c.pos = checkpoint;
    }

    c.skip_inline_space();
    let semicolon = c.eat(b';');
    if semicolon {
        end = c.pos;
    }

    ImportStatement {
        span: start..end,
        clause_start,
        default_binding: clause.default_binding,
        namespace: clause.namespace,
        named: clause.named,
        module,
        quote,
        semicolon,
        type_only: clause.type_only,
    }
}

fn parse_named_list(c: &mut Cursor<'_>) -> Option<NamedList> {
    let open = c.pos;
    c.pos += 1;
    let mut entries = Vec::new();

    loop {
        c.skip_trivia();
        if c.eat(b'}') {
            return Some(NamedList {
                span: open..c.pos,
                entries,
            });
        }

        let entry_start = c.pos;
        if c.keyword("type") {
            c.skip_trivia();
            // `{ type }` imports a binding literally named `type`.
            if matches!(c.peek(), Some(b',') | Some(b'}')) {
                c.pos = entry_start;
            }
        }

        let imported = if matches!(c.peek(), Some(b'"') | Some(b'\'')) {
            c.string()?.1
        } else {
            c.ident()?.1
        };

        let mut entry_end = c.pos;
        let mut alias = None;
        let before_as = c.pos;
        c.skip_trivia();
        if c.keyword("as") {
            c.skip_trivia();
            alias = Some(c.ident()?.1);
            entry_end = c.pos;
        } else {
            c.pos = before_as;
        }

        entries.push(ImportEntry {
            span: entry_start..entry_end,
            imported,
            alias,
        });

        c.skip_trivia();
        if c.eat(b',') {
            continue;
        }
        c.skip_trivia();
        if c.peek() != Some(b'}') {
            return None;
        }
    }
}

// ============================================================================
// Tag usages
// ============================================================================

/// Find every `<Name ...>` occurrence of any of `names`.
///
/// Sites are returned in text order. A tag name must be followed by
/// whitespace, `/` or `>` (so `<Loader2.Item>` and `<Loader2Icon />` are not
/// usages of `Loader2`).
pub fn find_usages(text: &str, names: &[String]) -> Vec<UsageSite> {
    let mut sites = Vec::new();

    for name in names {
        if name.is_empty() {
            continue;
        }
        let needle = format!("<{}", name);
        let mut from = 0;
        while let Some(pos) = text[from..].find(&needle) {
            let abs = from + pos;
            from = abs + needle.len();

            if let Some(site) = read_tag(text, abs, name) {
                from = site.span.end;
                sites.push(site);
            }
        }
    }

    sites.sort_by_key(|s| s.span.start);
    sites.dedup_by_key(|s| s.span.start);
    sites
}

fn read_tag(text: &str, lt: usize, name: &str) -> Option<UsageSite> {
    let name_end = lt + 1 + name.len();
    match text.as_bytes().get(name_end) {
        Some(&b) if b.is_ascii_whitespace() || b == b'/' || b == b'>' => {}
        _ => return None,
    }

    let mut c = Cursor::new(text, name_end);
    while let Some(b) = c.peek() {
        match b {
            b'"' | b'\'' => c.skip_literal(),
            b'{' => c.skip_braces(),
            b'/' if c.rest().starts_with(b"/>") => {
                let raw = &text[name_end..c.pos];
                let attributes = raw.trim().to_string();
                let shape = if !attributes.is_empty() {
                    UsageShape::Attributed
                } else if raw.is_empty() {
                    UsageShape::BareTight
                } else {
                    UsageShape::BareSpaced
                };
                return Some(UsageSite {
                    span: lt..c.pos + 2,
                    name: name.to_string(),
                    attributes,
                    shape,
                    line: line_of(text, lt),
                });
            }
            b'>' => {
                return Some(UsageSite {
                    span: lt..c.pos + 1,
                    name: name.to_string(),
                    attributes: text[name_end..c.pos].trim().to_string(),
                    shape: UsageShape::Open,
                    line: line_of(text, lt),
                });
            }
            // A stray `<` means this was never a tag (e.g. a comparison).
            b'<' => return None,
            _ => c.pos += 1,
        }
    }

    None
}

/// Attribute names in raw attribute text, in order. Spread attributes
/// (`{...props}`) are reported as `...`.
pub fn attribute_names(attributes: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut c = Cursor::new(attributes, 0);

    loop {
        c.skip_trivia();
        match c.peek() {
            None => break,
            Some(b'{') => {
                c.skip_braces();
                names.push("...".to_string());
            }
            Some(b'"') | Some(b'\'') | Some(b'`') => c.skip_literal(),
            Some(b) if is_ident_byte(b) => {
                let start = c.pos;
                while matches!(c.peek(), Some(b) if is_ident_byte(b) || b == b'-' || b == b':') {
                    c.pos += 1;
                }
                names.push(attributes[start..c.pos].to_string());
                c.skip_trivia();
                if c.eat(b'=') {
                    c.skip_trivia();
                    match c.peek() {
                        Some(b'{') => c.skip_braces(),
                        Some(b'"') | Some(b'\'') => c.skip_literal(),
                        _ => {}
                    }
                }
            }
            Some(_) => c.pos += 1,
        }
    }

    names
}

// ============================================================================
// Residual references
// ============================================================================

/// Word-boundary occurrences of `name` outside import statements and
/// outside `//` line comments, as byte offsets.
pub fn find_references(text: &str, name: &str) -> Vec<usize> {
    let statements = parse_imports(text);

    find_word_matches(text, name)
        .into_iter()
        .filter(|&pos| !statements.iter().any(|s| s.span.contains(&pos)))
        .filter(|&pos| !in_line_comment(text.as_bytes(), line_start(text, pos), pos))
        .collect()
}

/// Whether a `//` outside string literals opens between `start` and `pos`.
fn in_line_comment(bytes: &[u8], start: usize, pos: usize) -> bool {
    let mut quote: Option<u8> = None;
    let mut i = start;
    while i < pos {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' || b == b'`' => quote = Some(b),
            None if b == b'/' && bytes.get(i + 1) == Some(&b'/') => return true,
            None => {}
        }
        i += 1;
    }
    false
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_named_import_list() {
        let text = "import { X, Loader2, Trash2 } from \"lucide-react\";\n";
        let stmts = parse_imports(text);
        assert_eq!(stmts.len(), 1);
        let stmt = &stmts[0];
        assert_eq!(stmt.module, "lucide-react");
        assert_eq!(stmt.quote, '"');
        assert!(stmt.semicolon);
        assert_eq!(&text[stmt.span.clone()], text.trim_end());

        let entries = &stmt.named.as_ref().unwrap().entries;
        let imported: Vec<&str> = entries.iter().map(|e| e.imported.as_str()).collect();
        assert_eq!(imported, vec!["X", "Loader2", "Trash2"]);
        assert_eq!(&text[entries[1].span.clone()], "Loader2");
    }

    #[test]
    fn parses_default_and_named_with_alias() {
        let text = "import React, { useState as useS } from 'react'\n";
        let stmt = &parse_imports(text)[0];
        assert_eq!(stmt.default_binding.as_ref().unwrap().name, "React");
        assert_eq!(stmt.quote, '\'');
        assert!(!stmt.semicolon);
        let entry = &stmt.named.as_ref().unwrap().entries[0];
        assert_eq!(entry.imported, "useState");
        assert_eq!(entry.local(), "useS");
        assert_eq!(&text[entry.span.clone()], "useState as useS");
        assert_eq!(stmt.bindings(), vec!["React", "useS"]);
    }

    #[test]
    fn parses_multiline_list() {
        let text = "import {\n  Plus,\n  Loader2,\n} from \"lucide-react\";\nconst a = 1;\n";
        let stmts = parse_imports(text);
        assert_eq!(stmts.len(), 1);
        let entries = &stmts[0].named.as_ref().unwrap().entries;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].imported, "Loader2");
        assert!(stmts[0].owns_lines(text));
    }

    #[test]
    fn parses_namespace_side_effect_and_type_imports() {
        let text = "import * as Icons from \"lucide-react\";\nimport \"./globals.css\";\nimport type { Props } from \"./types\";\n";
        let stmts = parse_imports(text);
        assert_eq!(stmts.len(), 3);
        assert_eq!(stmts[0].namespace.as_deref(), Some("Icons"));
        assert!(stmts[1].named.is_none());
        assert_eq!(stmts[1].module, "./globals.css");
        assert_eq!(stmts[2].named.as_ref().unwrap().entries[0].imported, "Props");
        assert!(stmts[2].type_only);
        assert!(!stmts[0].type_only);
    }

    #[test]
    fn ignores_dynamic_import_and_mid_line_text() {
        let text = "const m = await import(\"x\");\nimport(\"y\");\nconst s = \"import { A } from 'b'\";\n";
        assert!(parse_imports(text).is_empty());
    }

    #[test]
    fn finds_all_three_self_closing_shapes() {
        let text = r#"<Loader2 className="h-4 w-4 animate-spin" /> <Loader2 /> <Loader2/>"#;
        let sites = find_usages(text, &names(&["Loader2"]));
        let shapes: Vec<UsageShape> = sites.iter().map(|s| s.shape).collect();
        assert_eq!(
            shapes,
            vec![UsageShape::Attributed, UsageShape::BareSpaced, UsageShape::BareTight]
        );
        assert_eq!(sites[0].attributes, r#"className="h-4 w-4 animate-spin""#);
        assert_eq!(&text[sites[2].span.clone()], "<Loader2/>");
    }

    #[test]
    fn attributed_expression_with_gt_does_not_end_tag() {
        let text = "<Loader2 className={count > 1 ? \"a\" : \"b\"} />";
        let sites = find_usages(text, &names(&["Loader2"]));
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].span, 0..text.len());
        assert_eq!(sites[0].shape, UsageShape::Attributed);
    }

    #[test]
    fn multiline_attributes() {
        let text = "<Loader2\n  className=\"h-4 w-4\"\n  aria-hidden\n/>";
        let sites = find_usages(text, &names(&["Loader2"]));
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].shape, UsageShape::Attributed);
        assert_eq!(sites[0].line, 1);
    }

    #[test]
    fn word_boundary_on_tag_names() {
        let text = "<Loader2Icon /> <Loader2.Item /> <MyLoader2 /> <Loader2-x />";
        assert!(find_usages(text, &names(&["Loader2"])).is_empty());
    }

    #[test]
    fn open_tag_is_reported_not_self_closing() {
        let text = "<Loader2 className=\"x\">child</Loader2>";
        let sites = find_usages(text, &names(&["Loader2"]));
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].shape, UsageShape::Open);
        assert!(!sites[0].is_self_closing());
    }

    #[test]
    fn no_usages_is_not_an_error() {
        assert!(find_usages("const a = 1;", &names(&["Loader2"])).is_empty());
    }

    #[test]
    fn attribute_names_in_order() {
        assert_eq!(
            attribute_names(r#"className="h-4 w-4" size={16} aria-hidden {...rest}"#),
            vec!["className", "size", "aria-hidden", "..."]
        );
        assert!(attribute_names("").is_empty());
    }

    #[test]
    fn references_skip_imports_and_comments() {
        let text = "import { Loader2 } from \"lucide-react\";\n// Loader2 here\nconst icon = Loader2;\n";
        let refs = find_references(text, "Loader2");
        assert_eq!(refs.len(), 1);
        assert_eq!(line_of(text, refs[0]), 3);
    }

    #[test]
    fn references_after_url_string_are_found() {
        let text = "const u = \"https://x\"; const i = Loader2;\nconst v = 'a//b'; // Loader2\n";
        let refs = find_references(text, "Loader2");
        assert_eq!(refs.len(), 1);
        assert_eq!(line_of(text, refs[0]), 1);
    }
}
