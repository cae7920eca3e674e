//! pathway-text
//!
//! Keyword fallback search: case-insensitive substring matching over stored
//! titles and contents.

pub mod index;

pub use index::MemoryTextIndex;
