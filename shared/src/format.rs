//! Plain text save format: one line per row, each cell written as `0` or `1`
//! followed by a comma.
//!
//! ```text
//! 0,1,0,
//! 0,1,0,
//! 0,1,0,
//! ```

use std::io::{Read, Write};

use crate::error::{FormatError, Result};
use crate::grid::{Grid, MAX_GENERATIONS};

pub fn serialize(grid: &Grid) -> String {
    let mut text = String::with_capacity(grid.size() * (grid.size() * 2 + 1));
    for row in grid.rows() {
        for &age in row {
            text.push(if age > 0 { '1' } else { '0' });
            text.push(',');
        }
        text.push('\n');
    }
    text
}

pub fn deserialize(text: &str) -> std::result::Result<Grid, FormatError> {
    let mut rows: Vec<Vec<u8>> = Vec::new();

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_number = index + 1;
        let row = parse_row(line, line_number)?;
        if let Some(first) = rows.first() {
            if row.len() != first.len() {
                return Err(FormatError::RaggedRow {
                    line: line_number,
                    expected: first.len(),
                    found: row.len(),
                });
            }
        }
        rows.push(row);
    }

    let Some(first) = rows.first() else {
        return Err(FormatError::Empty);
    };
    if first.len() != rows.len() {
        return Err(FormatError::NotSquare {
            rows: rows.len(),
            columns: first.len(),
        });
    }

    Ok(Grid::from_rows(rows))
}

fn parse_row(line: &str, line_number: usize) -> std::result::Result<Vec<u8>, FormatError> {
    // The writer ends every cell with a comma, so the last field is empty.
    let line = line.trim_end();
    let line = line.strip_suffix(',').unwrap_or(line);

    line.split(',')
        .enumerate()
        .map(|(index, token)| {
            let token = token.trim();
            let column = index + 1;
            let value: i64 = token.parse().map_err(|_| FormatError::InvalidToken {
                line: line_number,
                column,
                token: token.to_string(),
            })?;
            u8::try_from(value)
                .ok()
                .filter(|&age| age < MAX_GENERATIONS)
                .ok_or(FormatError::AgeOutOfRange {
                    line: line_number,
                    column,
                    value,
                    max: MAX_GENERATIONS,
                })
        })
        .collect()
}

pub fn write_grid<W: Write>(mut writer: W, grid: &Grid) -> Result<()> {
    writer.write_all(serialize(grid).as_bytes())?;
    writer.flush()?;
    Ok(())
}

pub fn read_grid<R: Read>(mut reader: R) -> Result<Grid> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(deserialize(&text)?)
}
