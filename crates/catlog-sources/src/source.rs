use tracing::{debug, info};

use catlog_logs::EventParser;
use catlog_types::{CollectionRequest, Event};

use crate::collector::SourceCollector;
use crate::journal::{Journalctl, LiveQuery};

/// Error type for event sources
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The platform's collector is not implemented in this build
    #[error("{0} collector is not available")]
    Unavailable(&'static str),
}

/// A producer of normalized events
///
/// The pipeline only ever drains sources through this trait, so it does not
/// depend on any particular OS log API.
pub trait EventSource {
    /// Next batch of events, or `None` once the source is exhausted
    fn next_batch(&mut self) -> Result<Option<Vec<Event>>, SourceError>;
}

/// Pull every batch from a source, preserving order
pub fn drain(source: &mut dyn EventSource) -> Result<Vec<Event>, SourceError> {
    let mut events = Vec::new();
    while let Some(batch) = source.next_batch()? {
        events.extend(batch);
    }
    Ok(events)
}

/// Linux journal/auth-log events, produced as a single batch
pub struct LinuxAuthSource<Q = Journalctl> {
    collector: SourceCollector<Q>,
    parser: EventParser,
    request: CollectionRequest,
    done: bool,
}

impl<Q: LiveQuery> LinuxAuthSource<Q> {
    pub fn new(collector: SourceCollector<Q>, parser: EventParser, request: CollectionRequest) -> Self {
        Self {
            collector,
            parser,
            request,
            done: false,
        }
    }
}

impl<Q: LiveQuery> EventSource for LinuxAuthSource<Q> {
    fn next_batch(&mut self) -> Result<Option<Vec<Event>>, SourceError> {
        if self.done {
            return Ok(None);
        }
        self.done = true;

        let parser = &self.parser;
        let events = self.collector.collect(&self.request, |lines| {
            let events = parser.parse_lines(lines.iter().map(|line| line.text.as_str()));
            debug!(lines = lines.len(), events = events.len(), "Parsed channel lines");
            events
        });

        info!(
            mode = self.request.mode.label(),
            events = events.len(),
            "Collected events"
        );
        Ok(Some(events))
    }
}

/// Stand-in for a platform whose native collector is not built in
#[derive(Clone, Copy, Debug)]
pub struct UnavailableSource {
    name: &'static str,
}

impl UnavailableSource {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl EventSource for UnavailableSource {
    fn next_batch(&mut self) -> Result<Option<Vec<Event>>, SourceError> {
        Err(SourceError::Unavailable(self.name))
    }
}
