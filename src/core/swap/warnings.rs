use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A rewritten usage carried attributes that the canonical invocation drops.
    DroppedAttributes,
    /// A usage shape the rewriter leaves alone (tag with children).
    UnsupportedUsage,
    /// The target is still referenced after its import was removed.
    ResidualReference,
}

/// A warning-level outcome of a transform. Never fails the unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapWarning {
    pub kind: WarningKind,
    /// Line in the original text (1-indexed).
    pub line: usize,
    pub message: String,
}
