use super::ui;
use crate::core::{HistorySeries, Interval, normalize_symbol};
use crate::providers::MarketData;
use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn history_table(series: &HistorySeries) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Open"),
        ui::header_cell("High"),
        ui::header_cell("Low"),
        ui::header_cell("Close"),
        ui::header_cell("Volume"),
    ]);

    for point in series.points() {
        table.add_row(vec![
            Cell::new(point.date),
            ui::price_cell(point.open),
            ui::price_cell(point.high),
            ui::price_cell(point.low),
            ui::price_cell(point.close),
            Cell::new(point.volume),
        ]);
    }
    table
}

/// One line summarizing the move over the whole series.
pub fn history_summary(series: &HistorySeries) -> Option<String> {
    let first = series.first()?;
    let last = series.last()?;
    let change = last.close - first.open;
    let percent = if first.open == 0.0 {
        0.0
    } else {
        change / first.open * 100.0
    };
    Some(format!(
        "{} to {}: {:.2} -> {:.2} ({:+.2}, {:+.2}%)",
        first.date, last.date, first.open, last.close, change, percent
    ))
}

pub async fn run(market: &MarketData, symbol: &str, interval: Interval) -> Result<()> {
    let symbol = normalize_symbol(symbol)?;
    let pb = ui::new_spinner(&format!("Fetching {interval} history for {symbol}"));
    let result = market.fetch_history(&symbol, interval).await;
    pb.finish_and_clear();
    let result = result?;

    println!(
        "\n{} {}  {}",
        ui::style_text(&symbol, ui::StyleType::Title),
        ui::style_text(&interval.to_string(), ui::StyleType::Label),
        ui::source_label(result.source, result.is_fallback())
    );

    if result.data.is_empty() {
        println!("No data for {symbol} on this interval ({interval}).");
        return Ok(());
    }

    println!("{}", history_table(&result.data));
    if let Some(summary) = history_summary(&result.data) {
        println!("{}", ui::style_text(&summary, ui::StyleType::Subtle));
    }
    Ok(())
}
