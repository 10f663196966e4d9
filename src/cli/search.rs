use super::ui;
use crate::core::SymbolMatch;
use crate::providers::MarketData;
use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn search_table(matches: &[SymbolMatch]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Symbol"),
        ui::header_cell("Name"),
        ui::header_cell("Exchange"),
        ui::header_cell("Type"),
    ]);
    for m in matches {
        table.add_row(vec![
            Cell::new(&m.symbol),
            Cell::new(&m.name),
            Cell::new(m.exchange.as_deref().unwrap_or("-")),
            Cell::new(m.kind.as_deref().unwrap_or("-")),
        ]);
    }
    table
}

pub async fn run(market: &MarketData, query: &str) -> Result<()> {
    let pb = ui::new_spinner(&format!("Searching for {query}"));
    let result = market.search(query).await;
    pb.finish_and_clear();

    if result.data.is_empty() {
        println!("No symbols match '{query}'.");
        return Ok(());
    }

    println!("{}", ui::source_label(result.source, result.is_fallback()));
    println!("{}", search_table(&result.data));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_table_fills_missing_columns() {
        let mut apple = SymbolMatch::new("AAPL", "Apple Inc.");
        apple.exchange = Some("NASDAQ".to_string());
        let rendered = search_table(&[apple, SymbolMatch::new("QQQ", "QQQ Corp.")]).to_string();
        assert!(rendered.contains("NASDAQ"));
        assert!(rendered.contains("QQQ Corp."));
        assert!(rendered.contains('-'));
    }
}
