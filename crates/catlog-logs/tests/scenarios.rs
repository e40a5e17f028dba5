//! End-to-end checks of the parse → filter stages on realistic log excerpts.

use catlog_logs::{
    Event, EventKind, EventParser, FilterCriteria, FilterPipeline, KindSelector, OffsetPolicy,
    TimestampNormalizer,
};

const JOURNAL_EXCERPT: &str = "\
2024-01-05T10:15:32+00:00 myhost sshd[1234]: Failed password for invalid user admin from 203.0.113.5 port 51515 ssh2
2024-01-05T10:15:40+00:00 myhost sshd[1234]: Disconnected from invalid user admin 203.0.113.5 port 51515 [preauth]
2024-01-05T10:16:00+00:00 myhost sudo[2222]: alice : TTY=pts/0 ; PWD=/home/alice ; USER=root ; COMMAND=/usr/bin/apt update
2024-01-05T10:16:00+00:00 myhost sudo[2222]: pam_unix(sudo:session): session opened for user root(uid=0) by alice(uid=1000)
2024-01-05T10:16:09+00:00 myhost sudo[2222]: pam_unix(sudo:session): session closed for user root
2024-01-05T10:14:00+00:00 myhost systemd[1]: Started Session 4 of User alice.
2024-01-05T10:17:30+00:00 otherhost su[3030]: pam_unix(su:session): session opened for user postgres(uid=114) by bob(uid=1001)
2024-01-05T10:18:00+00:00 myhost pkexec[4040]: alice: Executing command [USER=root] [TTY=/dev/pts/0] [CWD=/home/alice] [COMMAND=/usr/bin/gparted]
";

fn parser() -> EventParser {
    let normalizer = TimestampNormalizer::new()
        .unwrap()
        .with_year(2024)
        .with_offset(OffsetPolicy::utc());
    EventParser::new(normalizer).unwrap()
}

#[test]
fn test_excerpt_yields_expected_kinds() {
    let events = parser().parse_lines(JOURNAL_EXCERPT.lines());
    let kinds: Vec<_> = events.iter().map(Event::kind).collect();
    assert_eq!(
        kinds,
        [
            EventKind::SshFailed,
            EventKind::SshDisconnect,
            EventKind::SudoCmd,
            EventKind::SudoOpen,
            EventKind::SudoClose,
            EventKind::SuOpen,
            EventKind::Pkexec,
        ]
    );
}

#[test]
fn test_iso_lines_keep_literal_time() {
    let parser = parser();
    for line in JOURNAL_EXCERPT.lines() {
        if let Some(event) = parser.parse(line) {
            assert!(line.starts_with(event.time()), "{line}");
            assert!(EventKind::ALL.contains(&event.kind()));
        }
    }
}

#[test]
fn test_classic_auth_log_matches_journal_output() {
    let auth_log = "\
Jan  5 10:15:32 myhost sshd[1234]: Failed password for invalid user admin from 203.0.113.5 port 51515 ssh2
Jan  5 10:16:00 myhost sudo[2222]: alice : TTY=pts/0 ; PWD=/home/alice ; USER=root ; COMMAND=/usr/bin/apt update
";
    let parser = parser();
    let classic = parser.parse_lines(auth_log.lines());
    let journal: Vec<_> = parser
        .parse_lines(JOURNAL_EXCERPT.lines())
        .into_iter()
        .filter(|e| matches!(e.kind(), EventKind::SshFailed | EventKind::SudoCmd))
        .collect();
    assert_eq!(classic, journal);
}

#[test]
fn test_filter_pipeline_on_parsed_events() {
    let events = parser().parse_lines(JOURNAL_EXCERPT.lines());

    let sudo_on_myhost = FilterPipeline::new(
        FilterCriteria::new()
            .with_kinds(&[KindSelector::Sudo])
            .with_host("myhost"),
    )
    .apply(events.clone());
    assert_eq!(sudo_on_myhost.len(), 3);
    // Equal timestamps: the command line stays ahead of the session line.
    assert_eq!(sudo_on_myhost[0].kind(), EventKind::SudoCmd);
    assert_eq!(sudo_on_myhost[1].kind(), EventKind::SudoOpen);

    let bob = FilterPipeline::new(FilterCriteria::new().with_actor("bob")).apply(events.clone());
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].host(), "otherhost");
    assert_eq!(bob[0].detail(), "as postgres");

    let first_two = FilterPipeline::new(FilterCriteria::new().with_limit(2)).apply(events);
    assert_eq!(first_two.len(), 2);
    assert_eq!(first_two[0].time(), "2024-01-05T10:15:32+00:00");
}
