use std::io;
use std::path::PathBuf;

/// Error type for output rendering
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("cannot write output")]
    Io(#[from] io::Error),

    #[error("cannot serialize events")]
    Json(#[from] serde_json::Error),

    #[error("cannot write CSV file {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
