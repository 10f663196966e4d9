//! Alpha Vantage: GLOBAL_QUOTE snapshots and TIME_SERIES_DAILY history
//!
//! Every value arrives as a string under numbered labels such as
//! `"05. price"`. Rate-limit and key errors come back as HTTP 200 with a
//! `Note`, `Information` or `Error Message` field instead of data.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

use super::util::{self, build_url, get_text};
use crate::core::{
    DataSource, HistoryPoint, HistoryProvider, HistorySeries, Interval, Quote, QuoteProvider,
};

/// The compact daily series holds this many of the most recent days.
const COMPACT_SIZE: usize = 100;

pub struct AlphaVantageProvider {
    base_url: String,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        AlphaVantageProvider {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

impl DataSource for AlphaVantageProvider {
    fn name(&self) -> &'static str {
        "alphavantage"
    }
}

#[derive(Deserialize, Debug, Default)]
struct ApiMessages {
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

impl ApiMessages {
    fn check(&self, symbol: &str) -> Result<()> {
        if let Some(message) = &self.error_message {
            return Err(anyhow!("Alpha Vantage error for {}: {}", symbol, message));
        }
        if let Some(message) = self.note.as_ref().or(self.information.as_ref()) {
            return Err(anyhow!(
                "Alpha Vantage refused request for {}: {}",
                symbol,
                message
            ));
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<HashMap<String, String>>,
    #[serde(flatten)]
    messages: ApiMessages,
}

fn field<'a>(fields: &'a HashMap<String, String>, key: &str) -> Result<&'a str> {
    fields
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing field '{}'", key))
}

fn number(fields: &HashMap<String, String>, key: &str) -> Result<f64> {
    util::parse_number(field(fields, key)?, key)
}

fn quote_from_fields(fields: &HashMap<String, String>) -> Result<Quote> {
    Ok(Quote {
        symbol: field(fields, "01. symbol")?.trim().to_uppercase(),
        open: number(fields, "02. open")?,
        high: number(fields, "03. high")?,
        low: number(fields, "04. low")?,
        price: number(fields, "05. price")?,
        volume: util::volume(number(fields, "06. volume")?)?,
        latest_trading_day: util::parse_date(field(fields, "07. latest trading day")?)?,
        previous_close: number(fields, "08. previous close")?,
        change: number(fields, "09. change")?,
        change_percent: number(fields, "10. change percent")?,
    })
}

#[derive(Deserialize, Debug)]
struct DailySeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<BTreeMap<String, DailyBar>>,
    #[serde(flatten)]
    messages: ApiMessages,
}

#[derive(Deserialize, Debug)]
struct DailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

impl DailyBar {
    fn to_point(&self, date: &str) -> Result<HistoryPoint> {
        Ok(HistoryPoint {
            date: util::parse_date(date)?,
            open: util::parse_number(&self.open, "open")?,
            high: util::parse_number(&self.high, "high")?,
            low: util::parse_number(&self.low, "low")?,
            close: util::parse_number(&self.close, "close")?,
            volume: util::volume(util::parse_number(&self.volume, "volume")?)?,
        })
    }
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    #[instrument(name = "AlphaVantageQuoteFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<Option<Quote>> {
        let url = build_url(
            &self.base_url,
            "/query",
            &[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ],
        )?;
        let body = get_text(url, symbol).await?;
        let response: GlobalQuoteResponse = serde_json::from_str(&body)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;
        response.messages.check(symbol)?;

        match response.global_quote {
            Some(fields) if !fields.is_empty() => {
                let quote = quote_from_fields(&fields)
                    .with_context(|| format!("Malformed global quote for {symbol}"))?;
                Ok(Some(quote))
            }
            _ => {
                debug!("Empty global quote");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl HistoryProvider for AlphaVantageProvider {
    #[instrument(name = "AlphaVantageHistoryFetch", skip(self), fields(symbol = %symbol, interval = %interval))]
    async fn fetch_history(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<Option<HistorySeries>> {
        let count = interval.day_count();
        let output_size = if count > COMPACT_SIZE { "full" } else { "compact" };
        let url = build_url(
            &self.base_url,
            "/query",
            &[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("outputsize", output_size),
                ("apikey", self.api_key.as_str()),
            ],
        )?;
        let body = get_text(url, symbol).await?;
        let response: DailySeriesResponse = serde_json::from_str(&body)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;
        response.messages.check(symbol)?;

        let bars = match response.time_series {
            Some(bars) if !bars.is_empty() => bars,
            _ => return Ok(None),
        };

        // ISO dates sort chronologically as map keys.
        let mut points = bars
            .iter()
            .rev()
            .take(count)
            .map(|(date, bar)| bar.to_point(date))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Malformed daily series for {symbol}"))?;
        points.reverse();

        Ok(Some(HistorySeries::new(points)?))
    }
}
