//! Generic utility primitives with zero domain knowledge.
//!
//! - `io` - File I/O with consistent error handling
//! - `text` - Identifier boundaries, line math, span edits

pub mod io;
pub mod text;
