//! Last-resort data when every remote provider misses
//!
//! Values are random within fixed ranges and are not tied to the symbol's
//! real market. The quote ranges overlap, so `high >= open` and
//! `low <= open` are not guaranteed.

use chrono::{Duration, Local, NaiveDate};
use std::sync::Mutex;
use tracing::debug;

use crate::core::{HistoryPoint, HistorySeries, Interval, Quote, SymbolMatch};

/// Starting prices for synthetic history; anything else starts at 100.
const SEED_PRICES: [(&str, f64); 8] = [
    ("AAPL", 170.0),
    ("MSFT", 405.0),
    ("GOOGL", 160.0),
    ("AMZN", 180.0),
    ("TSLA", 175.0),
    ("META", 480.0),
    ("NFLX", 580.0),
    ("NVDA", 890.0),
];
const DEFAULT_SEED_PRICE: f64 = 100.0;

const KNOWN_SYMBOLS: [(&str, &str); 12] = [
    ("AAPL", "Apple Inc."),
    ("MSFT", "Microsoft Corporation"),
    ("GOOGL", "Alphabet Inc."),
    ("AMZN", "Amazon.com Inc."),
    ("TSLA", "Tesla, Inc."),
    ("META", "Meta Platforms, Inc."),
    ("NFLX", "Netflix, Inc."),
    ("NVDA", "NVIDIA Corporation"),
    ("JPM", "JPMorgan Chase & Co."),
    ("V", "Visa Inc."),
    ("WMT", "Walmart Inc."),
    ("DIS", "The Walt Disney Company"),
];

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn uniform(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    low + rng.f64() * (high - low)
}

pub fn seed_price(symbol: &str) -> f64 {
    SEED_PRICES
        .iter()
        .find(|(known, _)| *known == symbol)
        .map_or(DEFAULT_SEED_PRICE, |(_, price)| *price)
}

pub fn synthetic_quote(symbol: &str, today: NaiveDate, rng: &mut fastrand::Rng) -> Quote {
    Quote {
        symbol: symbol.to_uppercase(),
        open: round2(uniform(rng, 50.0, 150.0)),
        high: round2(uniform(rng, 60.0, 160.0)),
        low: round2(uniform(rng, 40.0, 140.0)),
        price: round2(uniform(rng, 55.0, 155.0)),
        volume: rng.u64(0..10_000_000),
        previous_close: round2(uniform(rng, 50.0, 150.0)),
        change: round2(uniform(rng, -5.0, 5.0)),
        change_percent: round2(uniform(rng, -2.5, 2.5)),
        latest_trading_day: today,
    }
}

/// A driftless random walk of `interval.day_count()` days ending on `today`.
///
/// Each day opens at the previous close and moves by up to ±2%.
pub fn synthetic_history(
    symbol: &str,
    interval: Interval,
    today: NaiveDate,
    rng: &mut fastrand::Rng,
) -> HistorySeries {
    let days = interval.day_count();
    let mut price = seed_price(&symbol.to_uppercase());
    let mut points = Vec::with_capacity(days);

    for offset in (0..days).rev() {
        let change = price * uniform(rng, -0.02, 0.02);
        let open = price;
        let close = price + change;
        let high = open.max(close) + price * rng.f64() * 0.01;
        let low = open.min(close) - price * rng.f64() * 0.01;

        points.push(HistoryPoint {
            date: today - Duration::days(offset as i64),
            open,
            high,
            low,
            close,
            volume: rng.u64(1_000_000..11_000_000),
        });
        price = close;
    }

    HistorySeries::new(points).unwrap_or_default()
}

/// Offline symbol lookup over a short list of well-known tickers.
///
/// Falls back to a made-up `"{SYMBOL} Corp."` entry when the query looks like
/// a ticker itself.
pub fn local_search(query: &str) -> Vec<SymbolMatch> {
    let needle = query.trim().to_uppercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let matches: Vec<SymbolMatch> = KNOWN_SYMBOLS
        .iter()
        .filter(|(symbol, name)| symbol.contains(&needle) || name.to_uppercase().contains(&needle))
        .map(|(symbol, name)| SymbolMatch::new(symbol, name))
        .collect();
    if !matches.is_empty() {
        return matches;
    }

    if needle.len() <= 5 && needle.chars().all(|c| c.is_ascii_uppercase()) {
        return vec![SymbolMatch::new(&needle, &format!("{needle} Corp."))];
    }

    Vec::new()
}

pub struct SyntheticProvider {
    rng: Mutex<fastrand::Rng>,
}

impl SyntheticProvider {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        SyntheticProvider {
            rng: Mutex::new(rng),
        }
    }

    pub fn name(&self) -> &'static str {
        "synthetic"
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut fastrand::Rng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }

    pub fn quote(&self, symbol: &str) -> Quote {
        debug!(symbol, "Generating synthetic quote");
        let today = Local::now().date_naive();
        self.with_rng(|rng| synthetic_quote(symbol, today, rng))
    }

    pub fn history(&self, symbol: &str, interval: Interval) -> HistorySeries {
        debug!(symbol, %interval, "Generating synthetic history");
        let today = Local::now().date_naive();
        self.with_rng(|rng| synthetic_history(symbol, interval, today, rng))
    }

    pub fn search(&self, query: &str) -> Vec<SymbolMatch> {
        local_search(query)
    }
}
