use catlog_sources::SourceError;

/// Failures that end the process with a dedicated exit code
///
/// Anything else is a runtime error and exits with 1.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("operating system not supported: {0} (catlog supports Linux and Windows)")]
    UnsupportedOs(String),

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Source(SourceError::Unavailable(_)) => 2,
            Self::UnsupportedOs(_) => 3,
        }
    }
}

/// Exit code for an error returned from `run`
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<AppError>().map_or(1, AppError::exit_code)
}
