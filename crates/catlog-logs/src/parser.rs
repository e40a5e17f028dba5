use tracing::trace;

use catlog_types::{Event, Subsystem};

use crate::patterns::PatternRegistry;
use crate::timestamp::TimestampNormalizer;

/// Turns raw log lines into normalized events
///
/// Lines that match neither timestamp grammar, come from an untracked
/// program, or match none of their subsystem's rules yield nothing. That is
/// the expected outcome for most of a host's log volume.
#[derive(Debug)]
pub struct EventParser {
    normalizer: TimestampNormalizer,
    registry: PatternRegistry,
}

impl EventParser {
    pub fn new(normalizer: TimestampNormalizer) -> Result<Self, regex::Error> {
        Ok(Self {
            normalizer,
            registry: PatternRegistry::new()?,
        })
    }

    /// Parse one raw line
    pub fn parse(&self, line: &str) -> Option<Event> {
        let header = self.normalizer.normalize(line)?;
        let subsystem = Subsystem::from_program(header.program)?;

        match self.registry.extract(subsystem, header.message) {
            Some(extracted) => Some(Event::new(
                header.timestamp,
                header.host,
                extracted.kind,
                extracted.actor,
                extracted.detail,
            )),
            None => {
                trace!(subsystem = subsystem.label(), msg = header.message, "No rule matched");
                None
            }
        }
    }

    /// Parse every line, keeping input order
    pub fn parse_lines<I, S>(&self, lines: I) -> Vec<Event>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines
            .into_iter()
            .filter_map(|line| self.parse(line.as_ref()))
            .collect()
    }
}
