use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use tracing::{debug, info};

use catlog_types::{COLUMNS, Event};

use crate::error::RenderError;

/// `catlog-events-<timestamp>.csv` in the current directory
pub fn default_csv_path(now: &DateTime<FixedOffset>) -> PathBuf {
    PathBuf::from(format!("catlog-events-{}.csv", now.format("%Y%m%dT%H%M%S%z")))
}

/// Write events as CSV, replacing `path` atomically
///
/// Rows go to a hidden sibling file that is renamed over `path` once
/// complete. On any failure the sibling is removed and `path` is untouched.
pub fn write_csv(events: &[Event], path: &Path) -> Result<(), RenderError> {
    let tmp = temp_path(path);

    let result = write_rows(events, path, &tmp).and_then(|()| {
        fs::rename(&tmp, path).map_err(|source| RenderError::Write {
            path: path.to_path_buf(),
            source,
        })
    });

    match &result {
        Ok(()) => info!(path = %path.display(), rows = events.len(), "CSV written"),
        Err(_) => {
            if fs::remove_file(&tmp).is_ok() {
                debug!(tmp = %tmp.display(), "Removed partial CSV");
            }
        }
    }
    result
}

fn write_rows(events: &[Event], path: &Path, tmp: &Path) -> Result<(), RenderError> {
    let csv_error = |source| RenderError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(tmp)
        .map_err(csv_error)?;

    writer.write_record(COLUMNS).map_err(csv_error)?;
    for event in events {
        writer.write_record(event.cells()).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "catlog-events.csv".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}
