use std::io::Write;

use catlog_types::Event;

use crate::error::RenderError;

/// Pretty JSON array, keys in column order
pub fn write_json(events: &[Event], out: &mut dyn Write) -> Result<(), RenderError> {
    serde_json::to_writer_pretty(&mut *out, events)?;
    writeln!(out)?;
    Ok(())
}
