//! Output rendering helpers for CLI surfaces.
//!
//! Text mode prints `comfy-table` grids; JSON mode pretty-prints the row
//! structs so the output can be piped into other tools.

use crate::core::error::SipataniError;
use crate::core::time;
use crate::core::tui::{self, ItemStatus};
use clap::ValueEnum;
use comfy_table::{ContentArrangement, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use serde::Serialize;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// A record that can be shown as one row of a text table.
pub trait TableRow: Serialize {
    fn headers() -> Vec<&'static str>;
    fn cells(&self) -> Vec<String>;
}

pub fn render_table<R: TableRow>(rows: &[R]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(R::headers());
    for row in rows {
        table.add_row(row.cells());
    }
    table.to_string()
}

/// Print rows in the requested format, or `empty_msg` when there are none.
pub fn print_rows<R: TableRow>(
    title: &str,
    rows: &[R],
    format: OutputFormat,
    empty_msg: &str,
) -> Result<(), SipataniError> {
    use colored::Colorize;

    match format {
        OutputFormat::Json => {
            let out = serde_json::to_string_pretty(rows)
                .map_err(|e| SipataniError::IoError(e.into()))?;
            println!("{}", out);
        }
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("{}", empty_msg.yellow());
                return Ok(());
            }
            println!("{}", title.bright_cyan().bold());
            println!("{}", render_table(rows));
            println!("{} {}", "Total:".dimmed(), rows.len());
        }
    }
    Ok(())
}

/// A deletion the operator declined: a skipped status line, or a
/// `cancelled` envelope so JSON callers still get one object on stdout.
pub fn print_cancelled(format: OutputFormat, cmd: &str, id: i64) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            time::command_envelope(cmd, "cancelled", serde_json::json!({ "id": id }))
        ),
        OutputFormat::Text => tui::print_status_line("Deletion cancelled", ItemStatus::Skipped),
    }
}

/// Group the integer part of `value` with commas, rounding to whole units.
pub fn group_thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if negative {
        format!("-{}", out)
    } else {
        out
    }
}

/// `421750.0` -> `Rp 421,750`.
pub fn format_rupiah(value: f64) -> String {
    format!("Rp {}", group_thousands(value))
}

/// Collapse newlines/extra whitespace and bound length for table cells.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}
