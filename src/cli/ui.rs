use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::core::dashboard::{Notice, NoticeLevel};

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Label,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn price_cell(value: f64) -> Cell {
    Cell::new(format!("{value:.2}")).set_alignment(CellAlignment::Right)
}

/// Formats an `Option<f64>` price. `None` is displayed as "N/A".
pub fn optional_price_cell(value: Option<f64>) -> Cell {
    value.map_or(
        Cell::new("N/A")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right),
        price_cell,
    )
}

/// Green for gains, red for losses.
pub fn change_cell(text: String, change: f64) -> Cell {
    let color = if change >= 0.0 {
        Color::Green
    } else {
        Color::Red
    };
    Cell::new(text).fg(color).set_alignment(CellAlignment::Right)
}

pub fn percent_change_cell(change_percent: f64) -> Cell {
    change_cell(format!("{change_percent:+.2}%"), change_percent)
}

pub fn signed_price_cell(change: f64) -> Cell {
    change_cell(format!("{change:+.2}"), change)
}

/// Marks data that did not come from the first-choice provider.
pub fn source_label(source: &str, is_fallback: bool) -> String {
    let text = format!("source: {source}");
    if is_fallback {
        style(text).yellow().to_string()
    } else {
        style_text(&text, StyleType::Subtle)
    }
}

pub fn format_notice(notice: &Notice) -> String {
    let styled = match notice.level {
        NoticeLevel::Success => style(format!("✔ {}", notice.message)).green(),
        NoticeLevel::Info => style(format!("ℹ {}", notice.message)).cyan(),
        NoticeLevel::Warning => style(format!("! {}", notice.message)).yellow(),
        NoticeLevel::Error => style(format!("✘ {}", notice.message)).red().bold(),
    };
    styled.to_string()
}

/// Creates a spinner for fetches of unknown length.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Prints a separator line matching the terminal width.
pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}
