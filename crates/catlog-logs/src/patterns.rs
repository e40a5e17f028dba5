use regex::{Captures, Regex};

use catlog_types::{EventKind, Subsystem};

/// User-name characters accepted in sudo, su and polkit messages
const USER: &str = r"[\w.@$-]+";

/// Fields pulled out of a matching message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extracted {
    pub kind: EventKind,
    pub actor: String,
    pub detail: String,
}

impl Extracted {
    fn new(kind: EventKind, actor: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            actor: actor.into(),
            detail: detail.into(),
        }
    }
}

type Build = fn(&Captures<'_>) -> Extracted;

/// One extraction rule: a message regex and the constructor for its captures
pub struct PatternRule {
    regex: Regex,
    build: Build,
}

impl PatternRule {
    fn new(pattern: &str, build: Build) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            build,
        })
    }

    /// Run this rule against a message
    pub fn apply(&self, message: &str) -> Option<Extracted> {
        self.regex.captures(message).map(|caps| (self.build)(&caps))
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

impl std::fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternRule")
            .field("pattern", &self.regex.as_str())
            .finish()
    }
}

/// Named capture, or empty when the group did not participate
fn group<'h>(caps: &Captures<'h>, name: &str) -> &'h str {
    caps.name(name).map_or("", |m| m.as_str())
}

/// The fixed, ordered extraction rules for every subsystem
///
/// Within a subsystem the first matching rule wins, so more specific
/// message shapes are declared before the ones they overlap with.
#[derive(Debug)]
pub struct PatternRegistry {
    sudo: Vec<PatternRule>,
    sshd: Vec<PatternRule>,
    su: Vec<PatternRule>,
    pkexec: Vec<PatternRule>,
}

impl PatternRegistry {
    pub fn new() -> Result<Self, regex::Error> {
        // Command lines come before the pam_unix session lines.
        let sudo = vec![
            PatternRule::new(
                &format!(
                    r"^(?P<user>{USER})\s*:\s*TTY=.*;\s*PWD=.*;\s*USER=(?P<as>{USER})\s*;.*?COMMAND=(?P<cmd>.*)$"
                ),
                |c| {
                    Extracted::new(
                        EventKind::SudoCmd,
                        group(c, "user"),
                        format!("as {} → {}", group(c, "as"), group(c, "cmd")),
                    )
                },
            )?,
            PatternRule::new(
                &format!(
                    r"pam_unix\(sudo(?:-i)?:session\): session opened for user (?P<as>{USER}).*? by (?P<by>{USER})\(uid=\d+\)"
                ),
                |c| {
                    Extracted::new(
                        EventKind::SudoOpen,
                        group(c, "by"),
                        format!("as {}", group(c, "as")),
                    )
                },
            )?,
            PatternRule::new(
                &format!(r"pam_unix\(sudo(?:-i)?:session\): session closed for user (?P<as>{USER})"),
                |c| {
                    Extracted::new(
                        EventKind::SudoClose,
                        "sudo",
                        format!("closed for {}", group(c, "as")),
                    )
                },
            )?,
        ];

        let sshd = vec![
            PatternRule::new(
                r"Accepted (?:password|publickey|keyboard-interactive(?:/pam)?|hostbased|gssapi-with-mic) for (?P<user>\S+) from (?P<ip>\S+)",
                |c| {
                    Extracted::new(
                        EventKind::SshAccepted,
                        group(c, "user"),
                        format!("from {}", group(c, "ip")),
                    )
                },
            )?,
            PatternRule::new(
                r"Failed (?:password|publickey|none|keyboard-interactive(?:/pam)?) for (?:invalid user )?(?P<user>\S+) from (?P<ip>\S+)",
                |c| {
                    Extracted::new(
                        EventKind::SshFailed,
                        group(c, "user"),
                        format!("from {}", group(c, "ip")),
                    )
                },
            )?,
            PatternRule::new(
                r"Disconnected from (?:(?:invalid|authenticating) )?(?:user (?P<user>\S+) )?(?P<ip>\S+)(?: port \d+)?",
                |c| {
                    let user = match group(c, "user") {
                        "" => "?",
                        user => user,
                    };
                    Extracted::new(
                        EventKind::SshDisconnect,
                        user,
                        format!("from {}", group(c, "ip")),
                    )
                },
            )?,
        ];

        let su = vec![PatternRule::new(
            &format!(
                r"pam_unix\(su(?:-l)?:session\): session opened for user (?P<as>{USER}).*? by (?P<by>{USER})\(uid=\d+\)"
            ),
            |c| {
                Extracted::new(
                    EventKind::SuOpen,
                    group(c, "by"),
                    format!("as {}", group(c, "as")),
                )
            },
        )?];

        // The COMMAND= form carries the most precise command text.
        let pkexec = vec![
            PatternRule::new(
                &format!(
                    r"^(?P<user>{USER})\s*:\s*(?i:executing)\s+command\s+.*\[COMMAND=(?P<cmd>.+)\]\s*$"
                ),
                |c| Extracted::new(EventKind::Pkexec, group(c, "user"), group(c, "cmd")),
            )?,
            PatternRule::new(
                &format!(r"^(?P<user>{USER})\s*:\s*(?i:executing)\s+command\s*\[(?P<cmd>.+)\]"),
                |c| Extracted::new(EventKind::Pkexec, group(c, "user"), group(c, "cmd")),
            )?,
        ];

        Ok(Self {
            sudo,
            sshd,
            su,
            pkexec,
        })
    }

    /// Ordered rules for one subsystem
    pub fn rules(&self, subsystem: Subsystem) -> &[PatternRule] {
        match subsystem {
            Subsystem::Sudo => &self.sudo,
            Subsystem::Sshd => &self.sshd,
            Subsystem::Su => &self.su,
            Subsystem::Pkexec => &self.pkexec,
        }
    }

    /// Result of the first rule that matches, if any
    pub fn extract(&self, subsystem: Subsystem, message: &str) -> Option<Extracted> {
        self.rules(subsystem)
            .iter()
            .find_map(|rule| rule.apply(message))
    }
}
