use tracing::{debug, info, warn};

use catlog_types::{CollectionRequest, SourceMode, Subsystem};

use crate::authlog::AuthLogFile;
use crate::journal::{Journalctl, LiveQuery, QueryOutcome};

/// Collection channel that produced a line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Journal,
    AuthLog,
}

/// An unparsed line and where it came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawLine {
    pub text: String,
    pub channel: Channel,
}

impl RawLine {
    fn new(text: String, channel: Channel) -> Self {
        Self { text, channel }
    }
}

/// Gathers raw lines from the live journal and/or the static auth log
///
/// In `auto` mode the auth log is read only when the journal's lines yielded
/// no events. A journal that ran fine but had nothing relevant in range looks
/// the same as one that is missing, so that case also falls back.
pub struct SourceCollector<Q = Journalctl> {
    live: Q,
    authlog: AuthLogFile,
}

impl SourceCollector<Journalctl> {
    pub fn new() -> Self {
        Self::with_parts(Journalctl::new(), AuthLogFile::new())
    }
}

impl Default for SourceCollector<Journalctl> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q: LiveQuery> SourceCollector<Q> {
    pub fn with_parts(live: Q, authlog: AuthLogFile) -> Self {
        Self { live, authlog }
    }

    /// Collect lines for one request and turn them into items with `parse`
    ///
    /// Never fails. Each channel's lines are parsed as one slice.
    pub fn collect<T, F>(&self, request: &CollectionRequest, parse: F) -> Vec<T>
    where
        F: Fn(&[RawLine]) -> Vec<T>,
    {
        match request.mode {
            SourceMode::Journal => parse(&self.collect_journal(request)),
            SourceMode::AuthLog => parse(&self.collect_authlog()),
            SourceMode::Auto => {
                let items = parse(&self.collect_journal(request));
                if !items.is_empty() {
                    return items;
                }
                info!("Journal yielded no events, falling back to auth log");
                parse(&self.collect_authlog())
            }
        }
    }

    /// One query per subsystem, run in sequence
    fn collect_journal(&self, request: &CollectionRequest) -> Vec<RawLine> {
        let mut lines = Vec::new();

        for subsystem in Subsystem::ALL {
            match self.live.query(subsystem, request) {
                QueryOutcome::Lines(found) => {
                    lines.extend(found.into_iter().map(|l| RawLine::new(l, Channel::Journal)));
                }
                QueryOutcome::Unavailable => {
                    debug!(subsystem = subsystem.label(), "Journal unavailable");
                }
                QueryOutcome::Failed { status, diagnostic } => {
                    warn!(subsystem = subsystem.label(), ?status, %diagnostic, "Journal query failed");
                }
            }
        }

        info!(lines = lines.len(), "Collected from journal");
        lines
    }

    fn collect_authlog(&self) -> Vec<RawLine> {
        let lines: Vec<RawLine> = self
            .authlog
            .read_lines()
            .into_iter()
            .map(|l| RawLine::new(l, Channel::AuthLog))
            .collect();

        info!(lines = lines.len(), "Collected from auth log");
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::Path;

    /// Scripted journal: per-subsystem outcomes, recording every call
    struct FakeJournal {
        outcomes: HashMap<Subsystem, QueryOutcome>,
        calls: RefCell<Vec<(Subsystem, Option<String>)>>,
    }

    impl FakeJournal {
        fn new(outcomes: impl IntoIterator<Item = (Subsystem, QueryOutcome)>) -> Self {
            Self {
                outcomes: outcomes.into_iter().collect(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn empty() -> Self {
            Self::new(Vec::new())
        }
    }

    impl LiveQuery for FakeJournal {
        fn query(&self, subsystem: Subsystem, request: &CollectionRequest) -> QueryOutcome {
            self.calls
                .borrow_mut()
                .push((subsystem, request.since.clone()));
            self.outcomes
                .get(&subsystem)
                .cloned()
                .unwrap_or(QueryOutcome::Lines(Vec::new()))
        }
    }

    fn authlog_with(dir: &Path, content: &str) -> AuthLogFile {
        let path = dir.join("auth.log");
        std::fs::write(&path, content).unwrap();
        AuthLogFile::with_candidates([path])
    }

    fn raw(lines: &[RawLine]) -> Vec<RawLine> {
        lines.to_vec()
    }

    fn texts(lines: &[RawLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_journal_mode_queries_every_subsystem_in_order() {
        let journal = FakeJournal::new([
            (Subsystem::Sudo, QueryOutcome::Lines(vec!["s1".into()])),
            (Subsystem::Pkexec, QueryOutcome::Lines(vec!["p1".into(), "p2".into()])),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let collector = SourceCollector::with_parts(journal, authlog_with(dir.path(), "file\n"));

        let request = CollectionRequest::new(SourceMode::Journal).with_since("today");
        let lines = collector.collect(&request, raw);
        assert_eq!(texts(&lines), ["s1", "p1", "p2"]);
        assert!(lines.iter().all(|l| l.channel == Channel::Journal));

        let calls = collector.live.calls.borrow();
        let order: Vec<_> = calls.iter().map(|(s, _)| *s).collect();
        assert_eq!(order, Subsystem::ALL);
        assert!(calls.iter().all(|(_, since)| since.as_deref() == Some("today")));
    }

    #[test]
    fn test_failed_subsystem_only_drops_its_own_lines() {
        let journal = FakeJournal::new([
            (Subsystem::Sudo, QueryOutcome::Unavailable),
            (
                Subsystem::Sshd,
                QueryOutcome::Failed {
                    status: Some(1),
                    diagnostic: "boom".into(),
                },
            ),
            (Subsystem::Su, QueryOutcome::Lines(vec!["su line".into()])),
        ]);
        let collector = SourceCollector::with_parts(journal, AuthLogFile::with_candidates(Vec::<&str>::new()));
        let lines = collector.collect(&CollectionRequest::new(SourceMode::Auto), raw);
        assert_eq!(texts(&lines), ["su line"]);
    }

    #[test]
    fn test_auto_falls_back_when_journal_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let collector = SourceCollector::with_parts(
            FakeJournal::empty(),
            authlog_with(dir.path(), "line one\nline two\n"),
        );
        let lines = collector.collect(&CollectionRequest::new(SourceMode::Auto), raw);
        assert_eq!(texts(&lines), ["line one", "line two"]);
        assert!(lines.iter().all(|l| l.channel == Channel::AuthLog));
    }

    #[test]
    fn test_auto_fallback_without_auth_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let collector = SourceCollector::with_parts(
            Journalctl::with_program("catlog-test-no-such-journalctl"),
            AuthLogFile::with_candidates([dir.path().join("missing")]),
        );
        assert!(collector.collect(&CollectionRequest::new(SourceMode::Auto), raw).is_empty());
    }

    #[test]
    fn test_auto_falls_back_when_journal_lines_yield_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let journal = FakeJournal::new([(
            Subsystem::Sshd,
            QueryOutcome::Lines(vec!["noise".into(), "more noise".into()]),
        )]);
        let collector = SourceCollector::with_parts(journal, authlog_with(dir.path(), "noise\nmatch\n"));

        let keep_matches = |lines: &[RawLine]| -> Vec<String> {
            lines
                .iter()
                .filter(|l| l.text == "match")
                .map(|l| l.text.clone())
                .collect()
        };
        assert_eq!(collector.collect(&CollectionRequest::new(SourceMode::Auto), keep_matches), ["match"]);
        assert!(collector.collect(&CollectionRequest::new(SourceMode::Journal), keep_matches).is_empty());
    }

    #[test]
    fn test_auto_never_merges_channels() {
        let dir = tempfile::tempdir().unwrap();
        let journal = FakeJournal::new([(Subsystem::Sshd, QueryOutcome::Lines(vec!["j".into()]))]);
        let collector = SourceCollector::with_parts(journal, authlog_with(dir.path(), "f\n"));
        let lines = collector.collect(&CollectionRequest::new(SourceMode::Auto), raw);
        assert_eq!(texts(&lines), ["j"]);
    }

    #[test]
    fn test_forced_modes_ignore_the_other_channel() {
        let dir = tempfile::tempdir().unwrap();
        let journal = FakeJournal::empty();
        let collector = SourceCollector::with_parts(journal, authlog_with(dir.path(), "f\n"));

        assert!(collector.collect(&CollectionRequest::new(SourceMode::Journal), raw).is_empty());

        let lines = collector.collect(&CollectionRequest::new(SourceMode::AuthLog), raw);
        assert_eq!(texts(&lines), ["f"]);
        // authlog mode does not touch the journal
        assert_eq!(collector.live.calls.borrow().len(), Subsystem::ALL.len());
    }
}
