//! Quote snapshot and symbol search abstractions

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::source::DataSource;

/// Normalized current-price snapshot for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub price: f64,
    pub previous_close: f64,
    pub volume: u64,
    pub change: f64,
    pub change_percent: f64,
    pub latest_trading_day: NaiveDate,
}

impl Quote {
    /// Checks that every numeric field is finite and the symbol is upper-cased.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.is_empty() {
            bail!("Quote has an empty symbol");
        }
        if self.symbol != self.symbol.to_uppercase() {
            bail!("Quote symbol is not upper-cased: {}", self.symbol);
        }

        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("price", self.price),
            ("previous_close", self.previous_close),
            ("change", self.change),
            ("change_percent", self.change_percent),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                bail!("Quote field '{}' is not finite for {}", name, self.symbol);
            }
        }
        Ok(())
    }
}

/// Trims and upper-cases a ticker. Blank input is rejected.
pub fn normalize_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        bail!("Symbol must not be blank");
    }
    Ok(symbol)
}

/// One hit from a symbol search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: String,
    pub exchange: Option<String>,
    pub kind: Option<String>,
}

impl SymbolMatch {
    pub fn new(symbol: &str, name: &str) -> Self {
        SymbolMatch {
            symbol: symbol.to_string(),
            name: name.to_string(),
            exchange: None,
            kind: None,
        }
    }
}

/// A source of current quotes.
///
/// `Ok(None)` means the provider answered but had nothing usable for the
/// symbol; the fallback chain treats it the same as an error.
#[async_trait]
pub trait QuoteProvider: DataSource {
    async fn fetch_quote(&self, symbol: &str) -> Result<Option<Quote>>;
}

#[async_trait]
pub trait SearchProvider: DataSource {
    async fn search(&self, query: &str) -> Result<Option<Vec<SymbolMatch>>>;
}
