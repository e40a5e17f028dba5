use std::io;
use std::process::Command;

use tracing::debug;

use catlog_types::{CollectionRequest, Subsystem};

/// Result of one live query
///
/// Both failure variants degrade to zero lines during collection. They are
/// kept apart so a caller can tell a missing facility from one that ran and
/// complained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryOutcome {
    Lines(Vec<String>),
    /// The facility could not be found
    Unavailable,
    /// The facility ran (or tried to) and reported an error
    Failed {
        status: Option<i32>,
        diagnostic: String,
    },
}

/// A structured-log facility that can be queried per subsystem
pub trait LiveQuery {
    fn query(&self, subsystem: Subsystem, request: &CollectionRequest) -> QueryOutcome;
}

/// `journalctl` invoked as a subprocess
#[derive(Clone, Debug)]
pub struct Journalctl {
    program: String,
}

impl Default for Journalctl {
    fn default() -> Self {
        Self::new()
    }
}

impl Journalctl {
    pub const DEFAULT_PROGRAM: &'static str = "journalctl";

    pub fn new() -> Self {
        Self::with_program(Self::DEFAULT_PROGRAM)
    }

    /// Use a different executable name or path
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments for one subsystem's query
    ///
    /// Each syslog identifier of the subsystem becomes a `-t` match; journalctl
    /// ORs repeated matches on the same field.
    pub fn args(subsystem: Subsystem, request: &CollectionRequest) -> Vec<String> {
        let mut args: Vec<String> = ["--no-pager", "--quiet", "--output", "short-iso"]
            .into_iter()
            .map(String::from)
            .collect();

        if let Some(since) = &request.since {
            args.push("--since".to_string());
            args.push(since.clone());
        }
        if let Some(until) = &request.until {
            args.push("--until".to_string());
            args.push(until.clone());
        }
        for ident in subsystem.identifiers() {
            args.push("-t".to_string());
            args.push((*ident).to_string());
        }

        args
    }
}

impl LiveQuery for Journalctl {
    fn query(&self, subsystem: Subsystem, request: &CollectionRequest) -> QueryOutcome {
        let output = match Command::new(&self.program)
            .args(Self::args(subsystem, request))
            .output()
        {
            Ok(output) => output,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(program = %self.program, "Journal query facility not found");
                return QueryOutcome::Unavailable;
            }
            Err(e) => {
                debug!(program = %self.program, error = %e, "Failed to run journal query");
                return QueryOutcome::Failed {
                    status: None,
                    diagnostic: e.to_string(),
                };
            }
        };

        if !output.status.success() {
            let diagnostic = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(
                subsystem = subsystem.label(),
                status = ?output.status.code(),
                %diagnostic,
                "Journal query failed"
            );
            return QueryOutcome::Failed {
                status: output.status.code(),
                diagnostic,
            };
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let lines: Vec<String> = stdout
            .lines()
            .filter(|line| !line.is_empty() && !is_boundary_marker(line))
            .map(str::to_string)
            .collect();

        debug!(subsystem = subsystem.label(), lines = lines.len(), "Journal query finished");
        QueryOutcome::Lines(lines)
    }
}

/// journalctl separators such as `-- Boot 3f2a... --`
fn is_boundary_marker(line: &str) -> bool {
    line.starts_with("-- ") && line.ends_with(" --")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_include_bounds_and_identifiers() {
        let request = CollectionRequest::default()
            .with_since("2024-01-01")
            .with_until("yesterday");
        let args = Journalctl::args(Subsystem::Pkexec, &request);
        assert_eq!(
            args,
            [
                "--no-pager",
                "--quiet",
                "--output",
                "short-iso",
                "--since",
                "2024-01-01",
                "--until",
                "yesterday",
                "-t",
                "pkexec",
                "-t",
                "polkitd",
            ]
        );

        let plain = Journalctl::args(Subsystem::Sshd, &CollectionRequest::default());
        assert_eq!(plain[plain.len() - 2..], ["-t", "sshd"]);
        assert!(!plain.contains(&"--since".to_string()));
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let journal = Journalctl::with_program("catlog-test-no-such-journalctl");
        let outcome = journal.query(Subsystem::Sudo, &CollectionRequest::default());
        assert_eq!(outcome, QueryOutcome::Unavailable);
    }

    #[test]
    fn test_boundary_markers() {
        assert!(is_boundary_marker("-- Boot 3f2a9c --"));
        assert!(is_boundary_marker("-- No entries --"));
        assert!(!is_boundary_marker("2024-01-05T10:15:32+00:00 h sshd[1]: x"));
    }

    #[cfg(unix)]
    mod subprocess {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::path::Path;

        fn script(dir: &Path, name: &str, body: &str) -> String {
            let path = dir.join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().into_owned()
        }

        #[test]
        fn test_successful_query_returns_lines() {
            let dir = tempfile::tempdir().unwrap();
            let program = script(
                dir.path(),
                "journalctl",
                "echo '-- Boot abc --'\necho '2024-01-05T10:15:32+00:00 h sshd[1]: Accepted password for bob from 1.2.3.4 port 22 ssh2'\necho ''",
            );
            let outcome =
                Journalctl::with_program(program).query(Subsystem::Sshd, &CollectionRequest::default());
            assert_eq!(
                outcome,
                QueryOutcome::Lines(vec![
                    "2024-01-05T10:15:32+00:00 h sshd[1]: Accepted password for bob from 1.2.3.4 port 22 ssh2".to_string()
                ])
            );
        }

        #[test]
        fn test_non_zero_exit_is_failed_with_diagnostic() {
            let dir = tempfile::tempdir().unwrap();
            let program = script(dir.path(), "journalctl", "echo 'Failed to parse timestamp' >&2\nexit 1");
            let outcome = Journalctl::with_program(program)
                .query(Subsystem::Sudo, &CollectionRequest::default().with_since("garbage"));
            assert_eq!(
                outcome,
                QueryOutcome::Failed {
                    status: Some(1),
                    diagnostic: "Failed to parse timestamp".to_string(),
                }
            );
        }
    }
}
