//! Shared types for catlog
//!
//! This crate contains the event model and the per-invocation request types
//! used across the catlog crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Event Types
// ============================================================================

/// Normalized event type tag
///
/// The set is closed: every tag a parser or adapter can emit is listed here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "sudo-cmd")]
    SudoCmd,
    #[serde(rename = "sudo-open")]
    SudoOpen,
    #[serde(rename = "sudo-close")]
    SudoClose,
    #[serde(rename = "ssh-accepted")]
    SshAccepted,
    #[serde(rename = "ssh-failed")]
    SshFailed,
    #[serde(rename = "ssh-disconnect")]
    SshDisconnect,
    #[serde(rename = "su-open")]
    SuOpen,
    #[serde(rename = "pkexec")]
    Pkexec,
    /// Windows 4624
    #[serde(rename = "win-logon")]
    WinLogon,
    /// Windows 4625
    #[serde(rename = "win-logon-failed")]
    WinLogonFailed,
    /// Windows 4672
    #[serde(rename = "win-privileged")]
    WinPrivileged,
}

impl EventKind {
    pub const ALL: [EventKind; 11] = [
        Self::SudoCmd,
        Self::SudoOpen,
        Self::SudoClose,
        Self::SshAccepted,
        Self::SshFailed,
        Self::SshDisconnect,
        Self::SuOpen,
        Self::Pkexec,
        Self::WinLogon,
        Self::WinLogonFailed,
        Self::WinPrivileged,
    ];

    /// The literal tag used in output and in kind-prefix filters
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SudoCmd => "sudo-cmd",
            Self::SudoOpen => "sudo-open",
            Self::SudoClose => "sudo-close",
            Self::SshAccepted => "ssh-accepted",
            Self::SshFailed => "ssh-failed",
            Self::SshDisconnect => "ssh-disconnect",
            Self::SuOpen => "su-open",
            Self::Pkexec => "pkexec",
            Self::WinLogon => "win-logon",
            Self::WinLogonFailed => "win-logon-failed",
            Self::WinPrivileged => "win-privileged",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single normalized security event
///
/// Field order is the output column order: `time, host, type, actor, detail`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    time: String,
    host: String,
    #[serde(rename = "type")]
    kind: EventKind,
    actor: String,
    detail: String,
}

impl Event {
    /// Placeholder host for events whose origin is unknown
    pub const UNKNOWN_HOST: &'static str = "-";

    pub fn new(
        time: impl Into<String>,
        host: impl Into<String>,
        kind: EventKind,
        actor: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        let host = host.into();
        Self {
            time: time.into(),
            host: if host.is_empty() {
                Self::UNKNOWN_HOST.to_string()
            } else {
                host
            },
            kind,
            actor: actor.into(),
            detail: detail.into(),
        }
    }

    /// Canonical offset-aware timestamp
    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Cell values in column order
    pub fn cells(&self) -> [&str; 5] {
        [
            &self.time,
            &self.host,
            self.kind.as_str(),
            &self.actor,
            &self.detail,
        ]
    }
}

/// Output column names, in order
pub const COLUMNS: [&str; 5] = ["time", "host", "type", "actor", "detail"];

// ============================================================================
// Subsystems
// ============================================================================

/// A program whose messages are parsed by a dedicated rule set
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subsystem {
    Sudo,
    Sshd,
    Su,
    /// pkexec and the polkit daemon share one rule set
    Pkexec,
}

impl Subsystem {
    pub const ALL: [Subsystem; 4] = [Self::Sudo, Self::Sshd, Self::Su, Self::Pkexec];

    /// Syslog identifiers logged by this subsystem
    pub fn identifiers(&self) -> &'static [&'static str] {
        match self {
            Self::Sudo => &["sudo"],
            Self::Sshd => &["sshd"],
            Self::Su => &["su"],
            Self::Pkexec => &["pkexec", "polkitd"],
        }
    }

    /// Map a program token such as `sshd[1234]` to its subsystem
    ///
    /// Matching is by literal `<identifier>[` prefix only.
    pub fn from_program(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|subsystem| {
            subsystem.identifiers().iter().any(|ident| {
                token
                    .strip_prefix(ident)
                    .is_some_and(|rest| rest.starts_with('['))
            })
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sudo => "sudo",
            Self::Sshd => "sshd",
            Self::Su => "su",
            Self::Pkexec => "pkexec",
        }
    }
}

// ============================================================================
// Request Types
// ============================================================================

/// Error for selector strings that name no known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {what} '{value}' (expected one of: {expected})")]
pub struct ParseSelectorError {
    what: &'static str,
    value: String,
    expected: &'static str,
}

impl ParseSelectorError {
    fn new(what: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            what,
            value: value.to_string(),
            expected,
        }
    }
}

/// Friendly name accepted by `--only`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KindSelector {
    Sudo,
    Ssh,
    Su,
    Pkexec,
    Win,
}

impl KindSelector {
    /// Literal type prefixes this selector expands to
    pub fn prefixes(&self) -> &'static [&'static str] {
        match self {
            Self::Sudo => &["sudo-"],
            Self::Ssh => &["ssh-"],
            Self::Su => &["su-"],
            Self::Pkexec => &["pkexec"],
            Self::Win => &["win-"],
        }
    }
}

impl FromStr for KindSelector {
    type Err = ParseSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sudo" => Ok(Self::Sudo),
            "ssh" => Ok(Self::Ssh),
            "su" => Ok(Self::Su),
            "pkexec" => Ok(Self::Pkexec),
            "win" => Ok(Self::Win),
            _ => Err(ParseSelectorError::new(
                "kind",
                s,
                "sudo, ssh, su, pkexec, win",
            )),
        }
    }
}

/// Selection criteria applied to the collected events
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Exact actor match
    pub actor: Option<String>,

    /// Exact host match
    pub host: Option<String>,

    /// Type prefixes, any of which must match (None = all kinds)
    pub kind_prefixes: Option<Vec<&'static str>>,

    /// Row cap after sorting; non-positive means unlimited
    pub limit: Option<i64>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Expand friendly selectors into type prefixes
    ///
    /// An empty selector list leaves the kind filter unset.
    pub fn with_kinds(mut self, selectors: &[KindSelector]) -> Self {
        if selectors.is_empty() {
            return self;
        }
        let mut prefixes: Vec<&'static str> = Vec::new();
        for prefix in selectors.iter().flat_map(|s| s.prefixes()) {
            if !prefixes.contains(prefix) {
                prefixes.push(prefix);
            }
        }
        self.kind_prefixes = Some(prefixes);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Effective row cap, if any
    pub fn effective_limit(&self) -> Option<usize> {
        self.limit
            .filter(|n| *n > 0)
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
    }
}

/// Which collection channel(s) to read
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Journal first, auth log only if the journal yielded nothing
    #[default]
    Auto,
    Journal,
    #[serde(rename = "authlog")]
    AuthLog,
}

impl SourceMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Journal => "journal",
            Self::AuthLog => "authlog",
        }
    }
}

impl FromStr for SourceMode {
    type Err = ParseSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "journal" => Ok(Self::Journal),
            "authlog" => Ok(Self::AuthLog),
            _ => Err(ParseSelectorError::new(
                "source",
                s,
                "auto, journal, authlog",
            )),
        }
    }
}

/// Output strategy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = ParseSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(ParseSelectorError::new("format", s, "table, json, csv")),
        }
    }
}

/// Parameters for one collection pass
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectionRequest {
    pub mode: SourceMode,

    /// Lower time bound, passed to the journal only
    pub since: Option<String>,

    /// Upper time bound, passed to the journal only
    pub until: Option<String>,
}

impl CollectionRequest {
    pub fn new(mode: SourceMode) -> Self {
        Self {
            mode,
            since: None,
            until: None,
        }
    }

    pub fn with_since(mut self, since: impl Into<String>) -> Self {
        self.since = Some(since.into());
        self
    }

    pub fn with_until(mut self, until: impl Into<String>) -> Self {
        self.until = Some(until.into());
        self
    }
}
