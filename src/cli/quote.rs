use super::ui;
use crate::core::{Quote, normalize_symbol};
use crate::providers::MarketData;
use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn quote_table(quote: &Quote) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Field"), ui::header_cell("Value")]);

    table.add_row(vec![Cell::new("Price"), ui::price_cell(quote.price)]);
    table.add_row(vec![Cell::new("Change"), ui::signed_price_cell(quote.change)]);
    table.add_row(vec![
        Cell::new("Change %"),
        ui::percent_change_cell(quote.change_percent),
    ]);
    table.add_row(vec![Cell::new("Open"), ui::price_cell(quote.open)]);
    table.add_row(vec![Cell::new("High"), ui::price_cell(quote.high)]);
    table.add_row(vec![Cell::new("Low"), ui::price_cell(quote.low)]);
    table.add_row(vec![
        Cell::new("Previous close"),
        ui::price_cell(quote.previous_close),
    ]);
    table.add_row(vec![Cell::new("Volume"), Cell::new(quote.volume)]);
    table.add_row(vec![
        Cell::new("Latest trading day"),
        Cell::new(quote.latest_trading_day),
    ]);
    table
}

pub async fn run(market: &MarketData, symbol: &str) -> Result<()> {
    let symbol = normalize_symbol(symbol)?;
    let pb = ui::new_spinner(&format!("Fetching quote for {symbol}"));
    let result = market.fetch_quote(&symbol).await;
    pb.finish_and_clear();
    let result = result?;

    println!(
        "\n{}  {}",
        ui::style_text(&result.data.symbol, ui::StyleType::Title),
        ui::source_label(result.source, result.is_fallback())
    );
    println!("{}", quote_table(&result.data));
    Ok(())
}
