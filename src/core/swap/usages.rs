//! Usage rewriter: every self-closing target tag becomes the canonical
//! invocation.

use serde::Serialize;

use super::scan::{attribute_names, find_usages, UsageShape, UsageSite};
use super::spec::SwapSpec;
use super::warnings::{SwapWarning, WarningKind};
use crate::utils::text::apply_edits;

/// Rewritten sites per shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShapeCounts {
    pub attributed: usize,
    pub bare_spaced: usize,
    pub bare_tight: usize,
}

impl ShapeCounts {
    pub fn total(&self) -> usize {
        self.attributed + self.bare_spaced + self.bare_tight
    }

    fn record(&mut self, shape: UsageShape) {
        match shape {
            UsageShape::Attributed => self.attributed += 1,
            UsageShape::BareSpaced => self.bare_spaced += 1,
            UsageShape::BareTight => self.bare_tight += 1,
            UsageShape::Open => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRewrite {
    pub text: String,
    pub counts: ShapeCounts,
}

/// Replace every self-closing usage of `names` with the canonical invocation.
///
/// Original attributes are not carried over. Open tags are left as they are.
pub fn rewrite_usages(text: &str, names: &[String], spec: &SwapSpec) -> UsageRewrite {
    let invocation = spec.canonical_invocation();
    let mut counts = ShapeCounts::default();

    let edits: Vec<(usize, usize, String)> = find_usages(text, names)
        .into_iter()
        .filter(UsageSite::is_self_closing)
        .map(|site| {
            counts.record(site.shape);
            (site.span.start, site.span.end, invocation.clone())
        })
        .collect();

    UsageRewrite {
        text: apply_edits(text, &edits),
        counts,
    }
}

/// Warnings for sites whose original form does not survive the rewrite:
/// attributed sites lose their attributes, open tags are not rewritten.
pub fn usage_warnings(sites: &[UsageSite], spec: &SwapSpec) -> Vec<SwapWarning> {
    sites
        .iter()
        .filter_map(|site| match site.shape {
            UsageShape::Attributed => Some(SwapWarning {
                kind: WarningKind::DroppedAttributes,
                line: site.line,
                message: format!(
                    "<{}> attributes [{}] dropped in favor of <{}> defaults: {}",
                    site.name,
                    attribute_names(&site.attributes).join(", "),
                    spec.replacement.symbol,
                    site.attributes
                ),
            }),
            UsageShape::Open => Some(SwapWarning {
                kind: WarningKind::UnsupportedUsage,
                line: site.line,
                message: format!(
                    "<{}> with children is not rewritten; convert it by hand",
                    site.name
                ),
            }),
            UsageShape::BareSpaced | UsageShape::BareTight => None,
        })
        .collect()
}
