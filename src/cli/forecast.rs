use super::ui;
use crate::core::forecast::{self, Forecast, ForecastError, Trend};
use crate::core::{HistorySeries, Interval, normalize_symbol};
use crate::providers::MarketData;
use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn forecast_table(forecast: &Forecast) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Date"), ui::header_cell("Forecast")]);
    for point in &forecast.points {
        table.add_row(vec![
            Cell::new(point.date),
            ui::price_cell(point.forecast_price),
        ]);
    }
    table
}

pub fn indicator_table(forecast: &Forecast) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Indicator"), ui::header_cell("Value")]);
    table.add_row(vec![
        Cell::new("Trend"),
        ui::change_cell(
            forecast.trend.to_string(),
            if forecast.trend == Trend::Up { 1.0 } else { -1.0 },
        ),
    ]);
    table.add_row(vec![Cell::new("Last close"), ui::price_cell(forecast.last_close)]);
    table.add_row(vec![
        Cell::new("5-day average"),
        ui::price_cell(forecast.short_average),
    ]);
    table.add_row(vec![
        Cell::new("10-day average"),
        ui::optional_price_cell(forecast.long_average),
    ]);
    table.add_row(vec![
        Cell::new("Avg daily change"),
        ui::signed_price_cell(forecast.average_daily_change),
    ]);
    if let Some((change, percent)) = forecast.projected_change() {
        table.add_row(vec![Cell::new("Projected change"), ui::signed_price_cell(change)]);
        table.add_row(vec![
            Cell::new("Projected change %"),
            ui::percent_change_cell(percent),
        ]);
    }
    table
}

/// Prints the forecast, or an "insufficient data" line when the series is too short.
pub fn print_forecast(
    symbol: &str,
    series: &HistorySeries,
    rng: &mut fastrand::Rng,
) -> Result<()> {
    match forecast::forecast(series, rng) {
        Ok(result) => {
            println!(
                "\n{}",
                ui::style_text(&format!("{symbol} 7-day forecast"), ui::StyleType::Title)
            );
            println!("{}", indicator_table(&result));
            println!("{}", forecast_table(&result));
            println!(
                "{}",
                ui::style_text(
                    "Naive moving-average projection, not investment advice.",
                    ui::StyleType::Subtle
                )
            );
            Ok(())
        }
        Err(ForecastError::InsufficientData {
            available,
            required,
        }) => {
            println!(
                "{}",
                ui::style_text(
                    &format!(
                        "Insufficient data to forecast {symbol}: {available} points, need {required}."
                    ),
                    ui::StyleType::Error
                )
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn run(market: &MarketData, symbol: &str, rng: &mut fastrand::Rng) -> Result<()> {
    let symbol = normalize_symbol(symbol)?;
    let interval = Interval::default();
    let pb = ui::new_spinner(&format!("Fetching {interval} history for {symbol}"));
    let result = market.fetch_history(&symbol, interval).await;
    pb.finish_and_clear();
    let result = result?;

    println!("{}", ui::source_label(result.source, result.is_fallback()));
    print_forecast(&symbol, &result.data, rng)
}
