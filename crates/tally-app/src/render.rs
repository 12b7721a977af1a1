//! Renders command output to the terminal.
//!
//! Scalars and lists print through their `Display` form; tables print as an
//! aligned ASCII grid with a header separator. Signals render nothing: the
//! console materializes `Help` before it reaches here, and the loop handles
//! `Stop`.

use std::io::{self, Write};

use tally_console::{CommandOutput, Value};

/// Render one command output. Multi-results render element by element.
pub fn render(out: &mut impl Write, output: &CommandOutput) -> io::Result<()> {
    match output {
        CommandOutput::None | CommandOutput::Stop | CommandOutput::Help(_) => Ok(()),
        CommandOutput::One(value) => render_value(out, value),
        CommandOutput::Many(values) => {
            for value in values {
                render_value(out, value)?;
            }
            Ok(())
        },
    }
}

fn render_value(out: &mut impl Write, value: &Value) -> io::Result<()> {
    match value {
        Value::Table { headers, rows } => render_table(out, headers, rows),
        other => writeln!(out, "{other}"),
    }
}

/// Aligned grid: column widths from the widest cell, `-` separator under the
/// header.
fn render_table(out: &mut impl Write, headers: &[String], rows: &[Vec<String>]) -> io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(String::len).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    write_row(out, headers, &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(out, &rule, &widths)?;
    for row in rows {
        write_row(out, row, &widths)?;
    }
    Ok(())
}

fn write_row(out: &mut impl Write, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        let width = widths.get(i).copied().unwrap_or(cell.len());
        line.push_str(&format!("{cell:<width$}"));
    }
    writeln!(out, "{}", line.trim_end())
}
