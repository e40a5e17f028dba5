//! Output rendering for catlog
//!
//! Events reach this crate already filtered and sorted. Each output format
//! is a [`Renderer`]; [`create_renderer`] picks one from the CLI/config
//! choice.

mod csv_file;
mod error;
mod json;
mod table;
mod theme;

use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use catlog_types::{Event, OutputFormat};

pub use csv_file::{default_csv_path, write_csv};
pub use error::RenderError;
pub use json::write_json;
pub use table::{EMPTY_TABLE, TableRenderer};
pub use theme::{RenderConfig, Theme};

/// Where a renderer put its output
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rendered {
    Stdout,
    File(PathBuf),
}

/// An output strategy over the final event list
pub trait Renderer {
    fn render(&self, events: &[Event], out: &mut dyn Write) -> Result<Rendered, RenderError>;
}

impl Renderer for TableRenderer {
    fn render(&self, events: &[Event], out: &mut dyn Write) -> Result<Rendered, RenderError> {
        self.write_table(events, out)?;
        Ok(Rendered::Stdout)
    }
}

/// JSON document on stdout
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, events: &[Event], out: &mut dyn Write) -> Result<Rendered, RenderError> {
        write_json(events, out)?;
        Ok(Rendered::Stdout)
    }
}

/// CSV file; never touches stdout
#[derive(Clone, Debug, Default)]
pub struct CsvRenderer {
    path: Option<PathBuf>,
}

impl CsvRenderer {
    /// `None` writes to a timestamped file in the current directory
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl Renderer for CsvRenderer {
    fn render(&self, events: &[Event], _out: &mut dyn Write) -> Result<Rendered, RenderError> {
        let path = self
            .path
            .clone()
            .unwrap_or_else(|| default_csv_path(&Local::now().fixed_offset()));
        write_csv(events, &path)?;
        Ok(Rendered::File(path))
    }
}

/// Create the renderer for an output format
///
/// `output` only matters for CSV.
pub fn create_renderer(
    format: OutputFormat,
    config: RenderConfig,
    output: Option<PathBuf>,
) -> Box<dyn Renderer> {
    match format {
        OutputFormat::Table => Box::new(TableRenderer::new(config)),
        OutputFormat::Json => Box::new(JsonRenderer),
        OutputFormat::Csv => Box::new(CsvRenderer::new(output)),
    }
}
