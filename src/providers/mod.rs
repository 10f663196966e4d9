pub mod alphavantage;
pub mod chain;
pub mod fmp;
pub mod synthetic;
pub mod util;

pub use chain::MarketData;
