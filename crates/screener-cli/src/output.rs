use std::io::{self, Write};

use crate::cli::OutputFormat;
use crate::commands::{CommandResult, Table};
use crate::error::CliError;

const TRILLION: f64 = 1e12;
const BILLION: f64 = 1e9;
const MILLION: f64 = 1e6;

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(&result.data)?
            } else {
                serde_json::to_string(&result.data)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => write_table(&mut out, &result.table)?,
    }
    Ok(())
}

fn write_table(out: &mut impl Write, table: &Table) -> Result<(), CliError> {
    let widths: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(column, header)| {
            table
                .rows
                .iter()
                .filter_map(|row| row.get(column))
                .map(|cell| cell.chars().count())
                .fold(header.chars().count(), usize::max)
        })
        .collect();

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_owned()
    };

    writeln!(out, "{}", line(table.headers.to_vec()))?;
    writeln!(
        out,
        "{}",
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  ")
    )?;
    for row in &table.rows {
        writeln!(out, "{}", line(row.iter().map(String::as_str).collect()))?;
    }
    Ok(())
}

/// `$2.80T`, `$1.65B`, `$12.30M`, or plain dollars below a million.
pub fn format_large_number(value: f64) -> String {
    if !value.is_finite() {
        return String::from("$0.00");
    }

    let magnitude = value.abs();
    let formatted = if magnitude >= TRILLION {
        format!("${:.2}T", magnitude / TRILLION)
    } else if magnitude >= BILLION {
        format!("${:.2}B", magnitude / BILLION)
    } else if magnitude >= MILLION {
        format!("${:.2}M", magnitude / MILLION)
    } else {
        format!("${magnitude:.0}")
    };

    if value < 0.0 {
        format!("-{formatted}")
    } else {
        formatted
    }
}
