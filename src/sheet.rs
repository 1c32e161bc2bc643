//! Spreadsheet rendering: dumping the sheets of a [SpreadsheetSource] either
//! through the layout engine (one page per sheet) or to a plain-text stream.
//!
//! Binary workbook formats are out of scope; the bundled
//! [DelimitedWorkbook] reads a simple text format so the pipeline runs end
//! to end:
//!
//! ```text
//! == first sheet
//! alpha\tbeta
//! \tgamma
//! # B2 a comment on cell B2
//! @ text inside a shape
//! ```

use std::fmt;
use std::io::Write;

use log::{debug, info};

use crate::engine::LayoutEngine;
use crate::metrics::FontMetrics;
use crate::sink::PageSink;
use crate::Error;

/// A cell position, formatted `A1`-style: column letters followed by the
/// 1-based row number. Both fields are 0-based internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub column: u32,
    pub row: u32,
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // bijective base 26: A..Z, AA..AZ, BA..
        let mut letters = Vec::new();
        let mut n = self.column + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(char::from(b'A' + rem as u8));
            n = (n - 1) / 26;
        }
        for letter in letters.iter().rev() {
            write!(f, "{}", letter)?;
        }
        write!(f, "{}", self.row + 1)
    }
}

impl CellRef {
    /// Parse an `A1`-style reference. Returns [None] for anything that is
    /// not letters followed by a positive number.
    pub fn parse(text: &str) -> Option<CellRef> {
        let letters: String = text.chars().take_while(|ch| ch.is_ascii_alphabetic()).collect();
        let digits = &text[letters.len()..];
        if letters.is_empty() || digits.is_empty() {
            return None;
        }

        let mut column: u32 = 0;
        for ch in letters.chars() {
            let value = (ch.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
            column = column.checked_mul(26)?.checked_add(value)?;
        }

        let row: u32 = digits.parse().ok()?;
        if row == 0 {
            return None;
        }
        Some(CellRef {
            column: column - 1,
            row: row - 1,
        })
    }
}

/// One sheet of a workbook: sparse cells plus cell comments and the text of
/// any drawing shapes
#[derive(Debug, Default, Clone)]
pub struct Sheet {
    pub name: String,
    pub cells: Vec<(CellRef, String)>,
    pub comments: Vec<(CellRef, String)>,
    pub shapes: Vec<String>,
}

impl Sheet {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.comments.is_empty() && self.shapes.is_empty()
    }

    /// The largest 0-based row index of any cell
    pub fn max_row(&self) -> u32 {
        self.cells.iter().map(|(r, _)| r.row).max().unwrap_or(0)
    }

    /// The largest 0-based column index of any cell
    pub fn max_column(&self) -> u32 {
        self.cells.iter().map(|(r, _)| r.column).max().unwrap_or(0)
    }
}

/// A workbook of sheets, however it was read
pub trait SpreadsheetSource {
    fn sheets(&self) -> &[Sheet];
}

/// Render every non-empty sheet of `source` through the engine, one sheet
/// per page. Empty sheets are skipped with a log line.
pub fn render_pdf<M: FontMetrics, S: PageSink>(
    source: &impl SpreadsheetSource,
    engine: &mut LayoutEngine<M, S>,
) -> Result<(), Error> {
    for sheet in source.sheets() {
        if sheet.is_empty() {
            info!("{}: empty, skipping", sheet.name);
            continue;
        }
        info!("{}: {} cells", sheet.name, sheet.cells.len());

        for line in sheet_lines(sheet) {
            engine.print(&line)?;
            engine.new_line()?;
        }
        engine.new_page();
    }
    Ok(())
}

/// Write every non-empty sheet of `source` as plain text, sheets separated
/// by a dashed line
pub fn write_text(source: &impl SpreadsheetSource, out: &mut impl Write) -> Result<(), Error> {
    for sheet in source.sheets() {
        if sheet.is_empty() {
            info!("{}: empty, skipping", sheet.name);
            continue;
        }
        for line in sheet_lines(sheet) {
            writeln!(out, "{}", line)?;
        }
        writeln!(out, "--------")?;
    }
    Ok(())
}

/// The text lines describing one sheet, shared between the PDF and the
/// plain-text renderers
fn sheet_lines(sheet: &Sheet) -> Vec<String> {
    let mut lines = Vec::with_capacity(3 + sheet.cells.len() + sheet.comments.len());
    lines.push(format!("sheet name: {}", sheet.name));
    lines.push(format!("max row index: {}", sheet.max_row()));
    lines.push(format!("max column index: {}", sheet.max_column()));
    for (cell, value) in sheet.cells.iter() {
        lines.push(format!("[{}] {}", cell, value));
    }
    for (cell, text) in sheet.comments.iter() {
        lines.push(format!("[comment {}] {}", cell, text));
    }
    for text in sheet.shapes.iter() {
        lines.push(format!("[shape text] {}", text));
    }
    lines
}

/// A workbook parsed from the delimited text format described in the module
/// docs. Parsing never fails; malformed lines are logged and skipped.
#[derive(Debug, Default)]
pub struct DelimitedWorkbook {
    sheets: Vec<Sheet>,
}

impl DelimitedWorkbook {
    pub fn parse(text: &str) -> DelimitedWorkbook {
        let mut sheets: Vec<Sheet> = Vec::new();
        let mut row: u32 = 0;

        for line in text.lines() {
            if let Some(name) = line.strip_prefix("== ") {
                sheets.push(Sheet {
                    name: name.trim().to_string(),
                    ..Sheet::default()
                });
                row = 0;
                continue;
            }

            let sheet = match sheets.last_mut() {
                Some(sheet) => sheet,
                None => {
                    debug!("ignoring line before any sheet header: {:?}", line);
                    continue;
                }
            };

            if let Some(rest) = line.strip_prefix("# ") {
                match rest.split_once(' ').and_then(|(cell, text)| {
                    CellRef::parse(cell).map(|cell| (cell, text.to_string()))
                }) {
                    Some(comment) => sheet.comments.push(comment),
                    None => debug!("ignoring malformed comment line: {:?}", line),
                }
            } else if let Some(text) = line.strip_prefix("@ ") {
                sheet.shapes.push(text.to_string());
            } else {
                // a data row: tab-separated cells, empty cells skipped.
                // blank lines still advance the row counter so the grid
                // keeps its shape
                for (column, value) in line.split('\t').enumerate() {
                    if !value.is_empty() {
                        sheet.cells.push((
                            CellRef {
                                column: column as u32,
                                row,
                            },
                            value.to_string(),
                        ));
                    }
                }
                row += 1;
            }
        }

        DelimitedWorkbook { sheets }
    }
}

impl SpreadsheetSource for DelimitedWorkbook {
    fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }
}
