//! Translation of Windows Security log records into catlog events.
//!
//! Reading the log itself needs the native event-log API, which lives
//! outside this crate. Whatever reads it hands over [`SecurityRecord`]s;
//! this module turns them into [`Event`]s.

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use catlog_logs::CANONICAL_FORMAT;
use catlog_types::{Event, EventKind};

use crate::source::{EventSource, SourceError};

/// Successful logon
pub const LOGON_SUCCESS: u32 = 4624;
/// Failed logon
pub const LOGON_FAILURE: u32 = 4625;
/// Special privileges assigned to a new logon
pub const PRIVILEGED_LOGON: u32 = 4672;

/// Built-in service accounts, hidden unless asked for
const SYSTEM_ACCOUNTS: [&str; 3] = ["SYSTEM", "LOCAL SERVICE", "NETWORK SERVICE"];

/// One record as supplied by the native Security log reader
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecurityRecord {
    pub event_id: u32,
    pub time_generated: DateTime<FixedOffset>,
    pub computer: String,
    /// Positional insertion strings of the event
    pub string_inserts: Vec<String>,
}

/// Maps Security log records to events
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowsEventTranslator {
    include_system: bool,
}

impl WindowsEventTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep logons of built-in service accounts
    pub fn with_system_accounts(mut self, include: bool) -> Self {
        self.include_system = include;
        self
    }

    /// Translate one record; unsupported IDs and short records yield `None`
    pub fn translate(&self, record: &SecurityRecord) -> Option<Event> {
        let inserts: &[String] = &record.string_inserts;
        let field = move |i: usize| inserts.get(i).map(String::as_str);

        let (kind, user, domain, detail) = match record.event_id {
            LOGON_SUCCESS => (
                EventKind::WinLogon,
                field(5)?,
                field(6)?,
                format!(
                    "from {} (logon type {})",
                    address(field(18)?),
                    field(8)?
                ),
            ),
            LOGON_FAILURE => (
                EventKind::WinLogonFailed,
                field(5)?,
                field(6)?,
                format!(
                    "from {} (status {}, sub-status {})",
                    address(field(19)?),
                    field(7)?,
                    field(9)?
                ),
            ),
            PRIVILEGED_LOGON => (
                EventKind::WinPrivileged,
                field(1)?,
                field(2)?,
                format!(
                    "privileges {}",
                    field(4)?.split_whitespace().collect::<Vec<_>>().join(", ")
                ),
            ),
            _ => return None,
        };

        if !self.include_system && is_system_account(user) {
            debug!(event_id = record.event_id, user, "Skipping system account");
            return None;
        }

        Some(Event::new(
            record.time_generated.format(CANONICAL_FORMAT).to_string(),
            record.computer.as_str(),
            kind,
            qualified(domain, user),
            detail,
        ))
    }
}

fn is_system_account(user: &str) -> bool {
    SYSTEM_ACCOUNTS
        .iter()
        .any(|account| account.eq_ignore_ascii_case(user.trim()))
}

fn qualified(domain: &str, user: &str) -> String {
    match domain.trim() {
        "" | "-" => user.to_string(),
        domain => format!("{domain}\\{user}"),
    }
}

fn address(ip: &str) -> &str {
    match ip.trim() {
        "" => Event::UNKNOWN_HOST,
        ip => ip,
    }
}

/// Adapts batches of native records into an [`EventSource`]
pub struct RecordSource<I> {
    batches: I,
    translator: WindowsEventTranslator,
}

impl<I> RecordSource<I>
where
    I: Iterator<Item = Vec<SecurityRecord>>,
{
    pub fn new(batches: impl IntoIterator<IntoIter = I>, translator: WindowsEventTranslator) -> Self {
        Self {
            batches: batches.into_iter(),
            translator,
        }
    }
}

impl<I> EventSource for RecordSource<I>
where
    I: Iterator<Item = Vec<SecurityRecord>>,
{
    fn next_batch(&mut self) -> Result<Option<Vec<Event>>, SourceError> {
        Ok(self.batches.next().map(|records| {
            let events: Vec<Event> = records
                .iter()
                .filter_map(|record| self.translator.translate(record))
                .collect();
            debug!(records = records.len(), events = events.len(), "Translated record batch");
            events
        }))
    }
}
