// Public modules
pub mod config;
pub mod error;
pub mod output;
pub mod swap;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use output::{BatchResult, BatchResultItem, BatchSummary, ItemStatus};
