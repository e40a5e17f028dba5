use std::io::{self, Write};

use crossterm::style::Stylize;
use unicode_width::UnicodeWidthStr;

use catlog_types::{COLUMNS, Event};

use crate::theme::{RenderConfig, Theme};

const SEPARATOR: &str = "  ";
const TYPE_COLUMN: usize = 2;
const LAST_COLUMN: usize = COLUMNS.len() - 1;

/// Line printed instead of an empty table
pub const EMPTY_TABLE: &str = "No matching events.";

/// Aligned plain-text table
#[derive(Clone, Copy, Debug)]
pub struct TableRenderer {
    config: RenderConfig,
}

impl TableRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn write_table(&self, events: &[Event], out: &mut dyn Write) -> io::Result<()> {
        if events.is_empty() {
            return writeln!(out, "{EMPTY_TABLE}");
        }

        let widths = column_widths(events);

        let header: Vec<String> = COLUMNS
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let cell = fit(&name.to_uppercase(), i, &widths);
                if self.config.color {
                    cell.bold().to_string()
                } else {
                    cell
                }
            })
            .collect();
        writeln!(out, "{}", header.join(SEPARATOR))?;

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(out, "{}", rule.join(SEPARATOR))?;

        for event in events {
            let row: Vec<String> = event
                .cells()
                .iter()
                .enumerate()
                .map(|(i, value)| {
                    let cell = fit(value, i, &widths);
                    match Theme::kind(event.kind()) {
                        Some(color) if i == TYPE_COLUMN && self.config.color => {
                            cell.with(color).to_string()
                        }
                        _ => cell,
                    }
                })
                .collect();
            writeln!(out, "{}", row.join(SEPARATOR))?;
        }
        Ok(())
    }
}

/// Display width per column: widest of header and cells
fn column_widths(events: &[Event]) -> [usize; 5] {
    let mut widths = COLUMNS.map(str::width);
    for event in events {
        for (width, cell) in widths.iter_mut().zip(event.cells()) {
            *width = (*width).max(cell.width());
        }
    }
    widths
}

/// Left-align to the column width; the last column is left as is
fn fit(value: &str, column: usize, widths: &[usize; 5]) -> String {
    if column == LAST_COLUMN {
        return value.to_string();
    }
    let pad = widths[column].saturating_sub(value.width());
    format!("{value}{}", " ".repeat(pad))
}
