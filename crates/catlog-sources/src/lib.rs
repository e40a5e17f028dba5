//! Log collection for catlog
//!
//! This crate provides the journal and auth-log channels, the collection
//! policy between them, and the `EventSource` adapters the pipeline drains.

mod authlog;
mod collector;
mod journal;
mod source;
pub mod windows;

pub use authlog::{AuthLogFile, DEFAULT_AUTH_LOG_PATHS};
pub use collector::{Channel, RawLine, SourceCollector};
pub use journal::{Journalctl, LiveQuery, QueryOutcome};
pub use source::{EventSource, LinuxAuthSource, SourceError, UnavailableSource, drain};
pub use windows::{RecordSource, SecurityRecord, WindowsEventTranslator};
