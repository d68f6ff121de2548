//! Boxed banners and status lines for text output.

use colored::{ColoredString, Colorize};

const BOX_MIN: usize = 36;
const BOX_MAX: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoxStyle {
    Success,
    Warning,
}

/// What happened to the record a status line talks about.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ItemStatus {
    Created,
    Updated,
    Deleted,
    Skipped,
}

impl ItemStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            ItemStatus::Created => "+",
            ItemStatus::Updated => "~",
            ItemStatus::Deleted => "-",
            ItemStatus::Skipped => "=",
        }
    }

    fn paint(&self, s: &str) -> ColoredString {
        match self {
            ItemStatus::Created => s.bright_green(),
            ItemStatus::Updated => s.bright_yellow(),
            ItemStatus::Deleted => s.bright_red(),
            ItemStatus::Skipped => s.bright_black(),
        }
    }
}

/// `COLUMNS` when set, otherwise 80, clamped to a readable box width.
pub fn box_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.parse::<usize>().ok())
        .unwrap_or(80)
        .clamp(BOX_MIN, BOX_MAX)
}

pub fn box_top(width: usize) -> String {
    format!("┌{}┐", "─".repeat(width.saturating_sub(2)))
}

pub fn box_bottom(width: usize) -> String {
    format!("└{}┘", "─".repeat(width.saturating_sub(2)))
}

/// One framed line; long content is cut to fit.
pub fn box_row(content: &str, width: usize) -> String {
    let inner = width.saturating_sub(4);
    let text: String = content.chars().take(inner).collect();
    let pad = inner - text.chars().count();
    format!("│ {}{} │", text, " ".repeat(pad))
}

pub fn render_box(title: &str, subtitle: &str, style: BoxStyle) {
    let width = box_width();
    let paint = |s: String| match style {
        BoxStyle::Success => s.bright_green(),
        BoxStyle::Warning => s.bright_yellow(),
    };

    println!("{}", paint(box_top(width)));
    println!("{}", paint(box_row(title, width)).bold());
    if !subtitle.is_empty() {
        println!("{}", paint(box_row(subtitle, width)));
    }
    println!("{}", paint(box_bottom(width)));
}

pub fn print_status_line(message: &str, status: ItemStatus) {
    println!("  {} {}", status.paint(status.icon()).bold(), message);
}

/// Aligned `label : value` lines, used for receipts after a write.
pub fn print_fields(fields: &[(&str, String)]) {
    let label_width = fields.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    for (label, value) in fields {
        println!("    {:<width$} : {}", label.dimmed(), value, width = label_width);
    }
}
