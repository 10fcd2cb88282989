//! Swap specification: which symbol goes out, what comes in.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::text::is_identifier;

/// An imported symbol and the module it is imported from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRef {
    pub symbol: String,
    pub module: String,
}

/// How the replacement symbol is bound by its import statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStyle {
    /// `import Symbol from "module";`
    Default,
    /// `import { Symbol } from "module";`
    Named,
}

/// A fixed attribute on the canonical invocation.
///
/// `value` is the raw attribute value as it appears in source, quotes or
/// braces included: `"small"`, `{false}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub symbol: String,
    pub module: String,
    #[serde(default = "default_import_style")]
    pub import_style: ImportStyle,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

/// One symbol pair per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapSpec {
    #[serde(default = "default_target")]
    pub target: SymbolRef,
    #[serde(default = "default_replacement")]
    pub replacement: Replacement,
}

impl Default for SwapSpec {
    fn default() -> Self {
        Self {
            target: default_target(),
            replacement: default_replacement(),
        }
    }
}

fn default_import_style() -> ImportStyle {
    ImportStyle::Default
}

fn default_target() -> SymbolRef {
    SymbolRef {
        symbol: "Loader2".to_string(),
        module: "lucide-react".to_string(),
    }
}

fn default_replacement() -> Replacement {
    Replacement {
        symbol: "MorphingLoader".to_string(),
        module: "@/app/components/ui/loading".to_string(),
        import_style: ImportStyle::Default,
        attributes: vec![
            Attribute {
                name: "size".to_string(),
                value: "\"small\"".to_string(),
            },
            Attribute {
                name: "showThemeText".to_string(),
                value: "{false}".to_string(),
            },
        ],
    }
}

impl SwapSpec {
    /// Reject specs the rewrite passes cannot honor.
    pub fn validate(&self) -> Result<()> {
        check_symbol("swap.target.symbol", &self.target.symbol)?;
        check_module("swap.target.module", &self.target.module)?;
        check_symbol("swap.replacement.symbol", &self.replacement.symbol)?;
        check_module("swap.replacement.module", &self.replacement.module)?;

        if self.target.symbol == self.replacement.symbol {
            return Err(Error::config_invalid_value(
                "swap.replacement.symbol",
                Some(self.replacement.symbol.clone()),
                "Replacement symbol must differ from the target symbol",
            ));
        }

        for attr in &self.replacement.attributes {
            let name_ok = !attr.name.is_empty()
                && attr
                    .name
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':');
            if !name_ok {
                return Err(Error::config_invalid_value(
                    "swap.replacement.attributes",
                    Some(attr.name.clone()),
                    "Attribute names must be non-empty JSX attribute names",
                ));
            }
            if !is_attribute_value(&attr.value) {
                return Err(Error::config_invalid_value(
                    "swap.replacement.attributes",
                    Some(attr.value.clone()),
                    "Attribute values must be quoted strings or {expressions}",
                ));
            }
        }

        Ok(())
    }

    /// The replacement tag written at every usage site.
    pub fn canonical_invocation(&self) -> String {
        let mut out = format!("<{}", self.replacement.symbol);
        for attr in &self.replacement.attributes {
            out.push(' ');
            out.push_str(&attr.name);
            out.push('=');
            out.push_str(&attr.value);
        }
        out.push_str(" />");
        out
    }

    /// The replacement import statement, without a line ending.
    pub fn import_line(&self, quote: char, semicolon: bool) -> String {
        let binding = match self.replacement.import_style {
            ImportStyle::Default => self.replacement.symbol.clone(),
            ImportStyle::Named => format!("{{ {} }}", self.replacement.symbol),
        };
        format!(
            "import {} from {q}{}{q}{}",
            binding,
            self.replacement.module,
            if semicolon { ";" } else { "" },
            q = quote,
        )
    }
}

fn check_symbol(key: &str, symbol: &str) -> Result<()> {
    if is_identifier(symbol) {
        Ok(())
    } else {
        Err(Error::config_invalid_value(
            key,
            Some(symbol.to_string()),
            "Must be a plain identifier",
        ))
    }
}

fn check_module(key: &str, module: &str) -> Result<()> {
    if module.is_empty() || module.contains(['"', '\'', '`', '\n']) {
        Err(Error::config_invalid_value(
            key,
            Some(module.to_string()),
            "Module specifier must be non-empty and contain no quotes or newlines",
        ))
    } else {
        Ok(())
    }
}

fn is_attribute_value(value: &str) -> bool {
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    let expression = value.len() >= 2 && value.starts_with('{') && value.ends_with('}');
    quoted || expression
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_invocation_matches_loader_component() {
        let spec = SwapSpec::default();
        assert_eq!(
            spec.canonical_invocation(),
            r#"<MorphingLoader size="small" showThemeText={false} />"#
        );
    }

    #[test]
    fn import_line_default_and_named() {
        let mut spec = SwapSpec::default();
        assert_eq!(
            spec.import_line('"', true),
            r#"import MorphingLoader from "@/app/components/ui/loading";"#
        );

        spec.replacement.import_style = ImportStyle::Named;
        assert_eq!(
            spec.import_line('\'', false),
            "import { MorphingLoader } from '@/app/components/ui/loading'"
        );
    }

    #[test]
    fn default_spec_is_valid() {
        assert!(SwapSpec::default().validate().is_ok());
    }

    #[test]
    fn rejects_identical_symbols() {
        let mut spec = SwapSpec::default();
        spec.replacement.symbol = "Loader2".to_string();
        let err = spec.validate().unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
    }

    #[test]
    fn rejects_non_identifier_symbol() {
        let mut spec = SwapSpec::default();
        spec.target.symbol = "Loader 2".to_string();
        assert!(spec.validate().is_err());
    }

    #[test]
    fn rejects_bare_attribute_value() {
        let mut spec = SwapSpec::default();
        spec.replacement.attributes[0].value = "small".to_string();
        assert!(spec.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let spec: SwapSpec =
            serde_json::from_str(r#"{"target": {"symbol": "Spinner", "module": "icons"}}"#)
                .unwrap();
        assert_eq!(spec.target.symbol, "Spinner");
        assert_eq!(spec.replacement.symbol, "MorphingLoader");
        assert_eq!(spec.replacement.attributes.len(), 2);
    }
}
