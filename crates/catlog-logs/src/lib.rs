//! Log normalization for catlog
//!
//! This crate provides timestamp normalization, per-subsystem extraction
//! rules, line parsing, and the filter/sort stage.

mod filter;
mod parser;
mod patterns;
mod timestamp;

pub use filter::{FilterPipeline, apply};
pub use parser::EventParser;
pub use patterns::{Extracted, PatternRegistry, PatternRule};
pub use timestamp::{CANONICAL_FORMAT, LineHeader, OffsetPolicy, TimestampNormalizer};

// Re-export types used in our public API
pub use catlog_types::{Event, EventKind, FilterCriteria, KindSelector, Subsystem};
