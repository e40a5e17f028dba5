use chrono::{
    DateTime, Datelike, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    Offset, TimeZone, Utc,
};
use regex::Regex;

/// Canonical timestamp layout, e.g. `2024-01-05T10:15:32+00:00`
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// How year-less local timestamps acquire a UTC offset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OffsetPolicy {
    /// The host's local zone at that instant
    #[default]
    Local,
    /// A caller-chosen fixed offset
    Fixed(FixedOffset),
}

impl OffsetPolicy {
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }
}

/// Header fields split from one raw line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineHeader<'a> {
    /// Canonical offset-aware timestamp
    pub timestamp: String,
    pub host: &'a str,
    /// Program token, e.g. `sshd[1234]`
    pub program: &'a str,
    pub message: &'a str,
}

/// Recognizes the ISO-8601 and classic syslog line grammars
///
/// Classic syslog lines carry no year. The normalizer uses the year it was
/// configured with, which defaults to the current local year. Entries
/// written before a year boundary and read after it get the wrong year
/// unless the caller passes the right one via [`with_year`](Self::with_year).
#[derive(Clone, Debug)]
pub struct TimestampNormalizer {
    iso: Regex,
    classic: Regex,
    year: i32,
    offset: OffsetPolicy,
}

impl TimestampNormalizer {
    /// Create a normalizer for the current local year and the local zone
    pub fn new() -> Result<Self, regex::Error> {
        let iso = Regex::new(
            r"^(?P<ts>\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2})(?:\.\d+)?(?P<off>[+-]\d{2}:?\d{2})\s+(?P<host>\S+)\s+(?P<prog>\S+):\s+(?P<msg>.*)$",
        )?;
        let classic = Regex::new(&format!(
            r"^(?P<mon>{})\s+(?P<day>\d{{1,2}})\s+(?P<time>\d{{2}}:\d{{2}}:\d{{2}})\s+(?P<host>\S+)\s+(?P<prog>\S+):\s+(?P<msg>.*)$",
            MONTHS.join("|")
        ))?;

        Ok(Self {
            iso,
            classic,
            year: Local::now().year(),
            offset: OffsetPolicy::Local,
        })
    }

    /// Use an explicit year for classic syslog lines
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    pub fn with_offset(mut self, offset: OffsetPolicy) -> Self {
        self.offset = offset;
        self
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn offset(&self) -> OffsetPolicy {
        self.offset
    }

    /// Split a raw line into its header fields, or `None` if neither
    /// grammar matches
    pub fn normalize<'a>(&self, line: &'a str) -> Option<LineHeader<'a>> {
        let line = line.trim_end_matches(['\r', '\n']);
        self.parse_iso(line).or_else(|| self.parse_classic(line))
    }

    fn parse_iso<'a>(&self, line: &'a str) -> Option<LineHeader<'a>> {
        let caps = self.iso.captures(line)?;
        let offset = caps.name("off")?.as_str();
        let timestamp = if offset.contains(':') {
            format!("{}{}", &caps["ts"], offset)
        } else {
            // Compact `+0000` offsets from older journalctl builds
            let (hours, minutes) = offset.split_at(3);
            format!("{}{}:{}", &caps["ts"], hours, minutes)
        };

        Some(LineHeader {
            timestamp,
            host: caps.name("host")?.as_str(),
            program: caps.name("prog")?.as_str(),
            message: caps.name("msg")?.as_str(),
        })
    }

    fn parse_classic<'a>(&self, line: &'a str) -> Option<LineHeader<'a>> {
        let caps = self.classic.captures(line)?;
        let month = MONTHS.iter().position(|m| *m == &caps["mon"])? as u32 + 1;
        let day: u32 = caps["day"].parse().ok()?;
        let time = NaiveTime::parse_from_str(&caps["time"], "%H:%M:%S").ok()?;
        let naive = NaiveDate::from_ymd_opt(self.year, month, day)?.and_time(time);
        let resolved = self.localize(naive)?;

        Some(LineHeader {
            timestamp: resolved.format(CANONICAL_FORMAT).to_string(),
            host: caps.name("host")?.as_str(),
            program: caps.name("prog")?.as_str(),
            message: caps.name("msg")?.as_str(),
        })
    }

    /// Attach an offset to a naive local time
    ///
    /// Ambiguous local times resolve to the earlier instant. Times inside a
    /// DST gap take the offset in force at that wall-clock time read as UTC.
    fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self.offset {
            OffsetPolicy::Fixed(offset) => offset.from_local_datetime(&naive).single(),
            OffsetPolicy::Local => match Local.from_local_datetime(&naive) {
                LocalResult::Single(t) => Some(t.fixed_offset()),
                LocalResult::Ambiguous(earliest, _) => Some(earliest.fixed_offset()),
                LocalResult::None => {
                    let offset = Local.offset_from_utc_datetime(&naive).fix();
                    offset.from_local_datetime(&naive).single()
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc_normalizer(year: i32) -> TimestampNormalizer {
        TimestampNormalizer::new()
            .unwrap()
            .with_year(year)
            .with_offset(OffsetPolicy::utc())
    }

    #[test]
    fn test_iso_timestamp_is_verbatim() {
        let normalizer = utc_normalizer(2024);
        let header = normalizer
            .normalize("2024-01-05T10:15:32-05:00 myhost sshd[1234]: Accepted password for bob")
            .unwrap();
        assert_eq!(header.timestamp, "2024-01-05T10:15:32-05:00");
        assert_eq!(header.host, "myhost");
        assert_eq!(header.program, "sshd[1234]");
        assert_eq!(header.message, "Accepted password for bob");
    }

    #[test]
    fn test_fractional_seconds_are_truncated() {
        let normalizer = utc_normalizer(2024);
        let header = normalizer
            .normalize("2024-01-05T10:15:32.123456+00:00 myhost sshd[1]: Accepted password for bob")
            .unwrap();
        assert_eq!(header.timestamp, "2024-01-05T10:15:32+00:00");
        assert_eq!(header.program, "sshd[1]");

        let compact = normalizer
            .normalize("2024-01-05T10:15:32.5-0300 myhost sudo[1]: x")
            .unwrap();
        assert_eq!(compact.timestamp, "2024-01-05T10:15:32-03:00");
    }

    #[test]
    fn test_compact_offset_is_canonicalized() {
        let normalizer = utc_normalizer(2024);
        let header = normalizer
            .normalize("2024-01-05T10:15:32+0100 myhost sudo[1]: hello")
            .unwrap();
        assert_eq!(header.timestamp, "2024-01-05T10:15:32+01:00");
    }

    #[test]
    fn test_classic_timestamp_uses_year_and_offset() {
        let normalizer = utc_normalizer(2024);
        let header = normalizer
            .normalize("Jan  5 10:15:32 myhost sshd[1234]: Accepted password for bob")
            .unwrap();
        assert_eq!(header.timestamp, "2024-01-05T10:15:32+00:00");
        assert_eq!(header.host, "myhost");
        assert_eq!(header.program, "sshd[1234]");

        let plus_two = TimestampNormalizer::new()
            .unwrap()
            .with_year(2023)
            .with_offset(OffsetPolicy::Fixed(FixedOffset::east_opt(2 * 3600).unwrap()));
        let header = plus_two
            .normalize("Dec 31 23:59:59 box su[9]: x")
            .unwrap();
        assert_eq!(header.timestamp, "2023-12-31T23:59:59+02:00");
    }

    #[test]
    fn test_local_offset_produces_canonical_shape() {
        let normalizer = TimestampNormalizer::new().unwrap().with_year(2024);
        let header = normalizer
            .normalize("Jun 15 12:00:00 myhost sudo[1]: x")
            .unwrap();
        assert!(header.timestamp.starts_with("2024-06-15T12:00:00"));
        assert_eq!(header.timestamp.len(), "2024-06-15T12:00:00+00:00".len());
    }

    #[test]
    fn test_default_year_is_current_year() {
        let normalizer = TimestampNormalizer::new().unwrap();
        assert_eq!(normalizer.year(), Local::now().year());
        assert_eq!(normalizer.offset(), OffsetPolicy::Local);
    }

    #[test]
    fn test_invalid_dates_do_not_match() {
        let normalizer = utc_normalizer(2023);
        assert!(normalizer.normalize("Feb 29 10:00:00 h sshd[1]: x").is_none());
        assert!(utc_normalizer(2024).normalize("Feb 29 10:00:00 h sshd[1]: x").is_some());
        assert!(normalizer.normalize("Jan 32 10:00:00 h sshd[1]: x").is_none());
    }

    #[test]
    fn test_unrecognized_lines() {
        let normalizer = utc_normalizer(2024);
        assert!(normalizer.normalize("").is_none());
        assert!(normalizer.normalize("-- Boot 1234 --").is_none());
        assert!(normalizer.normalize("2024-01-05 10:15:32 myhost sshd[1]: x").is_none());
        assert!(normalizer.normalize("Foo  5 10:15:32 myhost sshd[1]: x").is_none());
    }

    #[test]
    fn test_trailing_newline_is_ignored() {
        let normalizer = utc_normalizer(2024);
        let header = normalizer
            .normalize("Jan  5 10:15:32 myhost sshd[1]: done\r\n")
            .unwrap();
        assert_eq!(header.message, "done");
    }
}
