//! Core domain types and pure logic

pub mod alert;
pub mod config;
pub mod dashboard;
pub mod forecast;
pub mod history;
pub mod log;
pub mod quote;
pub mod source;

// Re-export main types for cleaner imports
pub use alert::{Alert, AlertDirection, AlertError};
pub use forecast::{Forecast, ForecastError, ForecastPoint, Trend};
pub use history::{HistoryPoint, HistoryProvider, HistorySeries, Interval};
pub use quote::{Quote, QuoteProvider, SearchProvider, SymbolMatch, normalize_symbol};
pub use source::{DataSource, Outcome, Sourced};
