use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Well-known auth log locations, in lookup order
pub const DEFAULT_AUTH_LOG_PATHS: [&str; 2] = [
    "/var/log/auth.log", // Debian/Ubuntu
    "/var/log/secure",   // RHEL/Fedora
];

/// The static auth log file channel
#[derive(Clone, Debug)]
pub struct AuthLogFile {
    candidates: Vec<PathBuf>,
}

impl Default for AuthLogFile {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthLogFile {
    pub fn new() -> Self {
        Self::with_candidates(DEFAULT_AUTH_LOG_PATHS)
    }

    pub fn with_candidates<I, P>(candidates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// First candidate that exists
    pub fn locate(&self) -> Option<&Path> {
        self.candidates
            .iter()
            .map(PathBuf::as_path)
            .find(|path| path.exists())
    }

    /// Read the located file whole
    ///
    /// A missing or unreadable file yields no lines. Invalid UTF-8 is
    /// replaced rather than rejected.
    pub fn read_lines(&self) -> Vec<String> {
        let Some(path) = self.locate() else {
            debug!(candidates = ?self.candidates, "No auth log found");
            return Vec::new();
        };

        match fs::read(path) {
            Ok(bytes) => {
                let lines: Vec<String> = String::from_utf8_lossy(&bytes)
                    .lines()
                    .map(str::to_string)
                    .collect();
                debug!(path = %path.display(), lines = lines.len(), "Read auth log");
                lines
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read auth log");
                Vec::new()
            }
        }
    }
}
