//! Symbol swap codemod.
//!
//! Rewrites one imported symbol to a replacement component across a set of
//! source units:
//!
//! - `spec` - the symbol pair and the canonical invocation
//! - `scan` - import statements, tag usage sites, bare references
//! - `imports` - target removal and replacement import
//! - `usages` - usage site rewrite
//! - `transform` - the ordered passes over one unit
//! - `batch` - per-unit driver and file discovery

pub mod batch;
pub mod imports;
pub mod scan;
pub mod spec;
pub mod transform;
pub mod usages;
pub mod warnings;

pub use batch::{discover_files, process_unit, run_batch, BatchOptions, BatchReport, UnitDetail};
pub use spec::{Attribute, ImportStyle, Replacement, SwapSpec, SymbolRef};
pub use transform::{transform, TransformResult};
pub use usages::ShapeCounts;
pub use warnings::{SwapWarning, WarningKind};
